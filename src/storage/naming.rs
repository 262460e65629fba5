//! File name sanitization
//!
//! Cleans user-supplied names down to a safe character set and resolves
//! sibling collisions by appending numeric suffixes.

use std::path::{Path, PathBuf};

use crate::error::ProviderError;

/// Upper bound on collision-suffix probing before giving up.
const MAX_SUFFIX_ATTEMPTS: u32 = 10_000;

/// Strip every character outside `[A-Za-z0-9-_ .]`.
pub fn clean_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ' ' | '.'))
        .collect()
}

/// Split a file name into stem and extension at the last dot.
///
/// Names without a dot, and dotfiles like `.profile`, keep the whole
/// name as the stem.
pub fn split_name(name: &str) -> (String, String) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            (stem.to_string(), ext.to_string())
        }
        _ => (name.to_string(), String::new()),
    }
}

/// Find an unused path for `stem.ext` inside `dir`.
///
/// Tries the plain name first, then `stem (1).ext`, `stem (2).ext`, …
/// The returned path does not exist at the instant of checking; racing
/// writers are not defended against.
pub fn dedupe_path(dir: &Path, stem: &str, ext: &str) -> Result<PathBuf, ProviderError> {
    for attempt in 0..MAX_SUFFIX_ATTEMPTS {
        let mut name = if attempt == 0 {
            stem.to_string()
        } else {
            format!("{stem} ({attempt})")
        };
        if !ext.is_empty() {
            name.push('.');
            name.push_str(ext);
        }

        let candidate = dir.join(name);
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(ProviderError::NameExhausted(stem.to_string()))
}

/// Match a name against a glob-lite pattern (`*` any run, `?` one char).
///
/// The listing filter of the provider contract; the dispatcher passes
/// literal names through it for exact lookup.
pub fn name_matches(pattern: &str, name: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let n: Vec<char> = name.chars().collect();

    let mut pi = 0;
    let mut ni = 0;
    let mut star: Option<usize> = None;
    let mut mark = 0;

    while ni < n.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == n[ni]) {
            pi += 1;
            ni += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some(pi);
            mark = ni;
            pi += 1;
        } else if let Some(s) = star {
            pi = s + 1;
            mark += 1;
            ni = mark;
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}
