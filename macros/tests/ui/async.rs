#[macros::main]
async fn entry() {}

fn main() {}
