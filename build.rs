/// Build script for firebreak.
/// Embeds version metadata shown by `firebreak version`.

fn main() {
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-changed=build.rs");

    if let Ok(version) = std::env::var("CARGO_PKG_VERSION") {
        println!("cargo:rustc-env=FIREBREAK_VERSION={version}");
    }

    // Absent outside a git checkout.
    if let Ok(output) = std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
    {
        if output.status.success() {
            if let Ok(hash) = String::from_utf8(output.stdout) {
                println!("cargo:rustc-env=FIREBREAK_GIT_HASH={}", hash.trim());
            }
        }
    }
}
