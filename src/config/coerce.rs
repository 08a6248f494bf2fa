//! Loose value coercion
//!
//! Process launchers hand flags over as strings, so booleans are read through
//! an explicit allow-list rather than generic truthiness.

use crate::store::ConfigValue;

/// String forms accepted as `true`. The numeric `1` and boolean `true` are
/// accepted as well; see [`coerce_bool`].
pub const TRUTHY_STRINGS: [&str; 2] = ["1", "true"];

/// Membership test against the token set `{"1", 1, "true", true}`. Anything
/// else, `"yes"` and `"TRUE"` included, is `false`.
pub fn coerce_bool(value: &ConfigValue) -> bool {
    match value {
        ConfigValue::String(s) => TRUTHY_STRINGS.contains(&s.as_str()),
        ConfigValue::Int(n) => *n == 1,
        ConfigValue::Float(f) => *f == 1.0,
        ConfigValue::Bool(b) => *b,
        ConfigValue::Null | ConfigValue::Array(_) | ConfigValue::Table(_) => false,
    }
}

/// A lazily evaluated fallback candidate.
pub type Candidate<'a> = &'a dyn Fn() -> Option<ConfigValue>;

/// Evaluate `candidates` in order and return the first truthy value. `None`,
/// `false`, `0`, and the empty string are all skipped.
pub fn first_truthy(candidates: &[Candidate<'_>]) -> Option<ConfigValue> {
    candidates
        .iter()
        .filter_map(|candidate| candidate())
        .find(ConfigValue::is_truthy)
}
