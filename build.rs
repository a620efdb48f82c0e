use std::env;

fn main() {
    // Version string shown by `--version`; CI can append a build tag
    let version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "unknown".to_string());
    let version = match env::var("SWARP_BUILD_TAG") {
        Ok(tag) if !tag.is_empty() => format!("{version}+{tag}"),
        _ => version,
    };
    println!("cargo:rustc-env=SWARP_ROUTE_VERSION={version}");

    println!("cargo:rerun-if-env-changed=SWARP_BUILD_TAG");
    println!("cargo:rerun-if-changed=src/");
    println!("cargo:rerun-if-changed=Cargo.toml");
}
