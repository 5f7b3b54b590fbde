use std::path::Path;
use std::process::Command;

/// Trimmed stdout of a git command run at the workspace root, if it succeeded.
fn git(root: &Path, args: &[&str]) -> Option<String> {
    let out = Command::new("git").arg("-C").arg(root).args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let root = Path::new(&manifest_dir).join("..");

    // An explicit NESTEGG_BUILD_SHA wins, for builds outside a git checkout.
    let describe = std::env::var("NESTEGG_BUILD_SHA")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| git(&root, &["describe", "--tags", "--always", "--dirty"]))
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=NESTEGG_BUILD_SHA={}", describe);
    println!("cargo:rerun-if-env-changed=NESTEGG_BUILD_SHA");
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=../.git/refs");
}
