#[macros::main(foo)]
fn entry() {}

fn main() {}
