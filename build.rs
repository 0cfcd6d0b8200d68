use std::env;
use std::fs;
use std::path::PathBuf;

// Firmware crates link with `-Tlink.x`; put the script where the linker can find it.
fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::copy("link.x", out_dir.join("link.x")).unwrap();
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=link.x");
}
