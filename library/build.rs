//! Build script for the glint launcher
//!
//! Titles are loaded with `RTLD_GLOBAL` and call host functions such as
//! `glint_resolve_resource` by name, so the launcher must export its symbols.

fn main() {
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("linux") {
        println!("cargo:rustc-link-arg-bins=-rdynamic");
    }
    println!("cargo:rerun-if-changed=build.rs");
}
