// `link.x` is put on the search path by the `f103` build script.
fn main() {
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
}
