#[macros::main]
fn entry(argc: u32) {}

fn main() {}
