//! Toolchain compatibility check
//!
//! Compares the toolchain the server was built with against the supported
//! range and warns when it falls outside. Never fatal.

use colored::Colorize;
use log::warn;
use semver::{Prerelease, Version, VersionReq};

/// Toolchain version captured at build time.
pub const RUNTIME_VERSION: &str = env!("FORUM_PRESTART_RUSTC_VERSION");

/// Supported toolchain range, from the package's `rust-version`.
pub const SUPPORTED_RANGE: &str = concat!(">=", env!("CARGO_PKG_RUST_VERSION"));

const OPERATORS: [&str; 7] = ["=", ">", ">=", "<", "<=", "~", "^"];

/// Whether `version` satisfies the npm-style `range`. Comparators may be
/// separated by spaces or commas and alternatives joined with `||`.
/// Unparsable input never satisfies.
pub fn satisfies(version: &str, range: &str) -> bool {
    let Ok(mut version) = Version::parse(version.trim().trim_start_matches('v')) else {
        return false;
    };
    // Toolchain channel tags such as `-nightly` are not part of the range.
    version.pre = Prerelease::EMPTY;

    range
        .split("||")
        .filter_map(|alternative| VersionReq::parse(&normalize(alternative)).ok())
        .any(|req| req.matches(&version))
}

/// Rewrite one `||` alternative into the comma-separated form `semver`
/// expects. Bare operators are glued to the version that follows, a bare
/// version matches only itself (`1.2` is `1.2.x`), and `A - B` becomes
/// `>=A, <=B`.
fn normalize(alternative: &str) -> String {
    let tokens: Vec<&str> = alternative
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();
    let mut comparators: Vec<String> = Vec::new();

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        if OPERATORS.contains(&token) {
            if let Some(next) = tokens.get(i + 1) {
                comparators.push(format!("{}{}", token, next));
            }
            i += 2;
            continue;
        }
        if tokens.get(i + 1) == Some(&"-") {
            if let Some(upper) = tokens.get(i + 2) {
                let (lower, upper) = (partial(token), partial(upper));
                if !lower.is_empty() {
                    comparators.push(format!(">={}", lower));
                }
                if !upper.is_empty() {
                    comparators.push(format!("<={}", upper));
                }
                i += 3;
                continue;
            }
        }
        if token.starts_with(['<', '>', '=', '~', '^']) {
            comparators.push(token.to_string());
        } else {
            let version = partial(token);
            if version.is_empty() {
                comparators.push("*".to_string());
            } else {
                comparators.push(format!("={}", version));
            }
        }
        i += 1;
    }

    if comparators.is_empty() {
        "*".to_string()
    } else {
        comparators.join(", ")
    }
}

/// Leading version segments of `token`, cut at the first wildcard.
fn partial(token: &str) -> String {
    token
        .trim_start_matches('v')
        .split('.')
        .take_while(|segment| !matches!(*segment, "x" | "X" | "*" | ""))
        .collect::<Vec<_>>()
        .join(".")
}

/// The two warning lines for an incompatible `version`, or `None` when it is
/// within `range`.
pub fn incompatibility_warnings(version: &str, range: &str) -> Option<[String; 2]> {
    if satisfies(version, range) {
        return None;
    }
    Some([
        "Your version of Rust is too outdated for this server. Please update your toolchain."
            .to_string(),
        format!("Recommended {}, {} provided", range.green(), version.yellow()),
    ])
}

/// Warn when `version` is outside `range`. Returns whether it is compatible.
pub fn check_version(version: &str, range: &str) -> bool {
    match incompatibility_warnings(version, range) {
        Some(lines) => {
            for line in lines {
                warn!("{}", line);
            }
            false
        }
        None => true,
    }
}

/// Check the build toolchain against [`SUPPORTED_RANGE`].
pub fn version_check() -> bool {
    check_version(RUNTIME_VERSION, SUPPORTED_RANGE)
}
