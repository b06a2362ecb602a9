//! Pure helpers for store key manipulation: trailing-slash normalization,
//! escape handling, relative column resolution and wildcard compilation.

use regex::Regex;

use crate::error::QueryError;

/// Strips one trailing `/` when present. Operations addressing an exact key
/// (`get`) expect the bare key.
pub fn strip_trailing_slash(target: &str) -> &str {
    target.strip_suffix('/').unwrap_or(target)
}

/// Ensures exactly one trailing `/`. Operations listing under a prefix
/// (`keys`, `tags`, `tagsrec`) expect the prefix form.
pub fn ensure_trailing_slash(target: &str) -> String {
    if target.ends_with('/') {
        target.to_string()
    } else {
        format!("{}/", target)
    }
}

/// Replaces every literal `\.` with `.`, letting callers spell segment names
/// that contain a dot without colliding with label-separator conventions.
pub fn unescape_target(target: &str) -> String {
    target.replace("\\.", ".")
}

/// Resolves a column spec against the key of the row it belongs to.
///
/// Each leading `../` token strips the last `/`-delimited segment off the
/// base key; the remaining spec is then joined onto the reduced base.
/// Resolution clamps at the root: once the base is exhausted, further `../`
/// tokens have no effect. Only the leading run of `../` tokens is consumed;
/// later occurrences stay verbatim in the joined key.
pub fn resolve_relative_column(base_key: &str, column_spec: &str) -> String {
    let mut base = base_key;
    let mut spec = column_spec;
    while let Some(rest) = spec.strip_prefix("../") {
        base = match base.rfind('/') {
            Some(idx) => &base[..idx],
            None => "",
        };
        spec = rest;
    }
    join_key(base, spec)
}

fn join_key(base: &str, segment: &str) -> String {
    match (base.is_empty(), segment.is_empty()) {
        (true, _) => segment.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{}/{}", base, segment),
    }
}

/// Display name for a resolved column key: its last `/`-delimited segment.
pub fn last_segment(key: &str) -> &str {
    let trimmed = key.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Compiles a wildcard target into the literal prefix to list under and an
/// anchored matcher for client-side filtering.
///
/// The prefix is the literal substring before the first `*` (empty when the
/// wildcard leads, the whole target when there is none). The matcher is the
/// target with every `*` replaced by `.*`, anchored against the full key.
/// Residual regex syntax in the target is honored; invalid syntax is a
/// per-query error.
pub fn compile_wildcard(target: &str) -> Result<(String, Regex), QueryError> {
    let prefix = match target.find('*') {
        Some(idx) => &target[..idx],
        None => target,
    };
    let pattern = format!("^{}$", target.replace('*', ".*"));
    let matcher = Regex::new(&pattern).map_err(|e| QueryError::InvalidPattern {
        pattern,
        reason: e.to_string(),
    })?;
    Ok((prefix.to_string(), matcher))
}
