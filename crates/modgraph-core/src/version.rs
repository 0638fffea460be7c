//! Version comparison and range checking.
//!
//! The resolver only ever talks to [`VersionComparator`]. The default
//! [`SemverComparator`] understands npm-style ranges by mapping them onto
//! `semver::VersionReq`:
//!
//! - `||` separates alternatives (any may match)
//! - whitespace separates comparators that must all match (`>=1.2.0 <2`)
//! - `a - b` is an inclusive hyphen range
//! - a bare version (`1.2.3`) is an exact match, unlike Cargo's caret default
//! - `*`, `x` and the empty string match anything
//!
//! # Examples
//!
//! ```
//! use modgraph_core::version::{SemverComparator, VersionComparator};
//!
//! let cmp = SemverComparator;
//! assert!(cmp.satisfies("1.4.0", "^1.2.0"));
//! assert!(cmp.satisfies("2.0.0", ">=1.0.0 <2.0.0 || 2.0.0"));
//! assert!(!cmp.satisfies("1.0.0", "^1.1.0"));
//! ```

use std::cmp::Ordering;

/// Compares version strings and checks them against ranges.
pub trait VersionComparator {
    /// Order two version strings.
    fn compare(&self, a: &str, b: &str) -> Ordering;

    /// Whether `version` falls inside `range`.
    fn satisfies(&self, version: &str, range: &str) -> bool;
}

/// [`VersionComparator`] backed by the `semver` crate.
///
/// Unparseable versions order as `0.0.0`; unparseable versions or ranges
/// never satisfy anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemverComparator;

impl VersionComparator for SemverComparator {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        let zero = semver::Version::new(0, 0, 0);
        let a = normalize_version(a).unwrap_or_else(|_| zero.clone());
        let b = normalize_version(b).unwrap_or(zero);
        a.cmp(&b)
    }

    fn satisfies(&self, version: &str, range: &str) -> bool {
        let Ok(version) = normalize_version(version) else {
            return false;
        };
        match VersionRange::parse(range) {
            Ok(parsed) => {
                let matched = parsed.matches(&version);
                tracing::trace!("{} against '{}': {}", version, parsed, matched);
                matched
            }
            Err(reason) => {
                tracing::warn!("Ignoring unparseable version range '{}': {}", range, reason);
                false
            }
        }
    }
}

/// A parsed npm-style range: a disjunction of comparator sets.
#[derive(Debug, Clone)]
pub struct VersionRange {
    alternatives: Vec<semver::VersionReq>,
    /// The original range string for display.
    raw: String,
}

impl VersionRange {
    /// Parse an npm-style range.
    pub fn parse(range: &str) -> Result<Self, String> {
        let alternatives = range
            .split("||")
            .map(|set| {
                let translated = translate_comparator_set(set)?;
                semver::VersionReq::parse(&translated)
                    .map_err(|e| format!("invalid range '{}': {e}", set.trim()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            alternatives,
            raw: range.to_string(),
        })
    }

    /// Whether any alternative matches `version`.
    pub fn matches(&self, version: &semver::Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }
}

impl std::fmt::Display for VersionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Rewrite one whitespace-separated comparator set into `semver` syntax.
fn translate_comparator_set(set: &str) -> Result<String, String> {
    let tokens = glue_operators(set.split_whitespace());

    if let [low, dash, high] = tokens.as_slice() {
        if dash == "-" {
            return Ok(format!(
                ">={}, <={}",
                strip_prefix_v(low),
                strip_prefix_v(high)
            ));
        }
    }

    let comparators = tokens
        .iter()
        .map(|token| translate_comparator(token))
        .collect::<Result<Vec<_>, _>>()?;

    let comparators: Vec<String> = comparators.into_iter().flatten().collect();
    if comparators.is_empty() {
        Ok("*".to_string())
    } else {
        Ok(comparators.join(", "))
    }
}

/// Join operators written apart from their version (`>= 1.0.0`).
fn glue_operators<'a>(tokens: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut glued: Vec<String> = Vec::new();
    let mut pending: Option<&str> = None;

    for token in tokens {
        let is_bare_operator = !token.is_empty()
            && token != "-"
            && token.chars().all(|c| matches!(c, '<' | '>' | '=' | '^' | '~'));
        match pending.take() {
            Some(op) => glued.push(format!("{op}{token}")),
            None if is_bare_operator => pending = Some(token),
            None => glued.push(token.to_string()),
        }
    }
    if let Some(op) = pending {
        glued.push(op.to_string());
    }
    glued
}

/// Translate a single comparator; `None` means "matches anything".
fn translate_comparator(token: &str) -> Result<Option<String>, String> {
    let split = token
        .find(|c: char| !matches!(c, '<' | '>' | '=' | '^' | '~'))
        .unwrap_or(token.len());
    let (op, version) = token.split_at(split);
    // `1.x` and `1.2.*` become the partial versions `1` and `1.2`
    let version = strip_prefix_v(version)
        .split('.')
        .take_while(|part| !matches!(*part, "x" | "X" | "*"))
        .collect::<Vec<_>>()
        .join(".");

    if version.is_empty() {
        return if op.is_empty() || op == "=" {
            Ok(None)
        } else {
            Err(format!("operator '{op}' without a version"))
        };
    }

    let op = match op {
        "" => "=",
        ">=" | "<=" | ">" | "<" | "=" | "^" | "~" => op,
        other => return Err(format!("unknown operator '{other}'")),
    };
    Ok(Some(format!("{op}{version}")))
}

fn strip_prefix_v(version: &str) -> &str {
    version
        .strip_prefix('v')
        .or_else(|| version.strip_prefix('V'))
        .unwrap_or(version)
}

/// Normalize a version string to semver by appending `.0` for missing
/// components.
///
/// - `"3.12"` -> `3.12.0`
/// - `"v3"` -> `3.0.0`
pub fn normalize_version(s: &str) -> Result<semver::Version, String> {
    let s = strip_prefix_v(s.trim().trim_start_matches('='));

    if let Ok(v) = semver::Version::parse(s) {
        return Ok(v);
    }

    let core_len = s.find(['-', '+']).unwrap_or(s.len());
    let (core, suffix) = s.split_at(core_len);
    let missing = 2usize.saturating_sub(core.matches('.').count());
    let padded = format!("{core}{}{suffix}", ".0".repeat(missing));
    semver::Version::parse(&padded).map_err(|e| format!("invalid version '{s}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // --- normalize_version ---

    #[test]
    fn test_normalize_three_part() {
        let v = normalize_version("3.12.1").unwrap();
        assert_eq!(v, semver::Version::new(3, 12, 1));
    }

    #[test]
    fn test_normalize_partial() {
        assert_eq!(normalize_version("3.12").unwrap(), semver::Version::new(3, 12, 0));
        assert_eq!(normalize_version("v3").unwrap(), semver::Version::new(3, 0, 0));
    }

    #[test]
    fn test_normalize_whitespace_and_prefix() {
        let v = normalize_version("  =v3.12.0  ").unwrap();
        assert_eq!(v, semver::Version::new(3, 12, 0));
    }

    #[test]
    fn test_normalize_garbage_rejected() {
        assert!(normalize_version("not-a-version").is_err());
    }

    // --- compare ---

    #[test]
    fn test_compare_orders_numerically() {
        let cmp = SemverComparator;
        assert_eq!(cmp.compare("1.10.0", "1.9.0"), Ordering::Greater);
        assert_eq!(cmp.compare("1.0.0", "1.0"), Ordering::Equal);
        assert_eq!(cmp.compare("1.0.0-beta.1", "1.0.0"), Ordering::Less);
    }

    #[test]
    fn test_compare_garbage_is_zero() {
        let cmp = SemverComparator;
        assert_eq!(cmp.compare("garbage", "0.0.0"), Ordering::Equal);
        assert_eq!(cmp.compare("garbage", "0.0.1"), Ordering::Less);
    }

    // --- satisfies ---

    #[rstest]
    #[case("1.4.0", "^1.2.0", true)]
    #[case("2.0.0", "^1.2.0", false)]
    #[case("1.0.0", "^1.1.0", false)]
    #[case("0.2.5", "^0.2.0", true)]
    #[case("0.3.0", "^0.2.0", false)]
    #[case("1.2.9", "~1.2.0", true)]
    #[case("1.3.0", "~1.2.0", false)]
    #[case("1.2.3", "1.2.3", true)]
    #[case("1.2.4", "1.2.3", false)]
    #[case("1.5.0", ">=1.2.0 <2.0.0", true)]
    #[case("2.0.0", ">=1.2.0 <2.0.0", false)]
    #[case("1.5.0", ">= 1.2.0", true)]
    #[case("3.1.0", "^1.0.0 || ^3.0.0", true)]
    #[case("2.1.0", "^1.0.0 || ^3.0.0", false)]
    #[case("1.5.0", "1.0.0 - 2.0.0", true)]
    #[case("2.0.1", "1.0.0 - 2.0.0", false)]
    #[case("4.0.0", "*", true)]
    #[case("4.0.0", "", true)]
    #[case("1.9.0", "1.x", true)]
    #[case("2.0.0", "1.x", false)]
    #[case("1.2.0", "v1.2.0", true)]
    fn test_satisfies(#[case] version: &str, #[case] range: &str, #[case] expected: bool) {
        assert_eq!(
            SemverComparator.satisfies(version, range),
            expected,
            "{version} in {range}"
        );
    }

    #[test]
    fn test_satisfies_invalid_version_returns_false() {
        assert!(!SemverComparator.satisfies("not-a-version", ">=1.0.0"));
    }

    #[test]
    fn test_satisfies_invalid_range_returns_false() {
        assert!(!SemverComparator.satisfies("1.0.0", ">=banana"));
        assert!(!SemverComparator.satisfies("1.0.0", "=>1.0.0"));
    }

    #[test]
    fn test_range_display() {
        let range = VersionRange::parse(">=1.0.0 <2.0.0").unwrap();
        assert_eq!(format!("{range}"), ">=1.0.0 <2.0.0");
    }
}
