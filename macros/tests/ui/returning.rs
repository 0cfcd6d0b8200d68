#[macros::main]
fn main() {}
