use std::process::Command;

/// Run `program args` and return trimmed stdout, or "unknown".
fn capture(program: &str, args: &[&str]) -> String {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    // Release pipelines export GIT_SHA/BUILD_DATE; local builds ask git and date.
    let git_sha =
        std::env::var("GIT_SHA").unwrap_or_else(|_| capture("git", &["rev-parse", "--short", "HEAD"]));
    println!("cargo:rustc-env=GIT_SHA={}", git_sha);

    let build_date =
        std::env::var("BUILD_DATE").unwrap_or_else(|_| capture("date", &["+%Y-%m-%d"]));
    println!("cargo:rustc-env=BUILD_DATE={}", build_date);

    println!("cargo:rerun-if-env-changed=GIT_SHA");
    println!("cargo:rerun-if-env-changed=BUILD_DATE");
}
