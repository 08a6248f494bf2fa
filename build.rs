use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-env-changed=RUSTC");

    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let version = Command::new(rustc)
        .arg("--version")
        .output()
        .ok()
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .and_then(|stdout| stdout.split_whitespace().nth(1).map(str::to_string))
        .unwrap_or_else(|| "0.0.0".to_string());

    println!("cargo:rustc-env=FORUM_PRESTART_RUSTC_VERSION={version}");
}
