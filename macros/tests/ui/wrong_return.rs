#[macros::main]
fn entry() -> u32 {
    0
}

fn main() {}
