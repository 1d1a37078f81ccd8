//! Build script: embeds the version string and tracks packaging env vars.

use std::process::Command;

fn main() {
    // Prefer USYSCONF_VERSION env var if set (e.g., by a distribution build),
    // otherwise fall back to git describe for local development builds.
    if let Ok(version) = std::env::var("USYSCONF_VERSION") {
        println!("cargo:rustc-env=USYSCONF_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=USYSCONF_VERSION={version}");
    }

    // Packagers bake the directory layout in at build time; these are read
    // with `option_env!` so a change must trigger a rebuild.
    for var in [
        "USYSCONF_VERSION",
        "USYSCONF_USR_DIR",
        "USYSCONF_SYS_DIR",
        "USYSCONF_LEDGER",
        "USYSCONF_LOG_DIR",
    ] {
        println!("cargo:rerun-if-env-changed={var}");
    }
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
}
