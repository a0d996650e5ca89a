// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host-version compatibility gate.
//!
//! Plugins declare the cli versions they support using npm range syntax
//! (`^1.0.0`, `>=1.2.0 <2.0.0`, `1.x || 2.x`). Ranges are normalised into
//! `semver::VersionReq`s before matching.

use semver::{Version, VersionReq};
use tracing::{error, warn};

use crate::manifest::PluginManifest;

/// Returns whether the running cli (`host`) satisfies the plugin's declared range.
///
/// A plugin that declares no range is assumed compatible and a warning is
/// logged. An unparsable range is a mismatch.
pub fn check_version_compatibility(manifest: &PluginManifest, host: &Version) -> bool {
    let Some(required) = manifest.required_host_range() else {
        warn!(
            plugin = %manifest.name,
            "no required cli version found in provider module, assuming compatibility"
        );
        return true;
    };

    let compatible = satisfies(host, required);
    if !compatible {
        error!(
            plugin = %manifest.name,
            plugin_version = %manifest.version,
            required,
            host = %host,
            "provider {}@{} requires cli version {} but cli version is {}",
            manifest.name,
            manifest.version,
            required,
            host
        );
    }
    compatible
}

/// Standard range satisfaction: any `||` alternative matching is enough.
pub fn satisfies(version: &Version, range: &str) -> bool {
    match parse_range(range) {
        Some(alternatives) => alternatives.iter().any(|req| req.matches(version)),
        None => {
            warn!(range, "unparsable version range");
            false
        }
    }
}

/// Parse an npm-style range into its `||` alternatives.
pub fn parse_range(range: &str) -> Option<Vec<VersionReq>> {
    range
        .split("||")
        .map(|alternative| parse_comparator_set(alternative.trim()))
        .collect()
}

/// Parse one comparator set (`>=1.0.0 <2.0.0`, `1.0.0 - 2.0.0`, `^1.2`).
fn parse_comparator_set(set: &str) -> Option<VersionReq> {
    if set.is_empty() {
        return Some(VersionReq::STAR);
    }
    if set.contains(',') {
        return VersionReq::parse(set).ok();
    }

    let tokens: Vec<&str> = set.split_whitespace().collect();

    // Hyphen range: inclusive on both ends.
    if let [low, "-", high] = tokens.as_slice() {
        return VersionReq::parse(&format!(">={low}, <={high}")).ok();
    }

    let mut comparators = Vec::new();
    let mut pending_op: Option<&str> = None;
    for token in tokens {
        if token.chars().all(|c| "<>=~^".contains(c)) {
            pending_op = Some(token);
            continue;
        }
        let comparator = match pending_op.take() {
            Some(op) => format!("{op}{token}"),
            None => plain_comparator(token),
        };
        comparators.push(comparator);
    }
    if pending_op.is_some() {
        return None;
    }

    VersionReq::parse(&comparators.join(", ")).ok()
}

/// An operator-less version: a full version is an exact match, a partial one
/// (`1`, `1.2`) is an X-range, unlike Cargo's caret default.
fn plain_comparator(token: &str) -> String {
    let bare = token.strip_prefix('v').unwrap_or(token);
    if Version::parse(bare).is_ok() {
        return format!("={bare}");
    }

    let numbers: Option<Vec<u64>> = bare.split('.').map(|part| part.parse().ok()).collect();
    let expanded = match numbers.as_deref() {
        Some([major]) => major
            .checked_add(1)
            .map(|next| format!(">={major}.0.0, <{next}.0.0")),
        Some([major, minor]) => minor
            .checked_add(1)
            .map(|next| format!(">={major}.{minor}.0, <{major}.{next}.0")),
        _ => None,
    };
    expanded.unwrap_or_else(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn caret_ranges() {
        assert!(!satisfies(&v("2.0.0"), "^1.0.0"));
        assert!(satisfies(&v("2.0.0"), "^2.0.0"));
        assert!(satisfies(&v("1.4.2"), "^1.0.0"));
    }

    #[test]
    fn whitespace_separated_comparators() {
        assert!(satisfies(&v("1.5.0"), ">=1.0.0 <2.0.0"));
        assert!(!satisfies(&v("2.0.0"), ">=1.0.0 <2.0.0"));
        assert!(satisfies(&v("1.5.0"), ">= 1.0.0 < 2.0.0"));
    }

    #[test]
    fn alternatives() {
        assert!(satisfies(&v("2.1.0"), "^1.0.0 || ^2.0.0"));
        assert!(!satisfies(&v("3.0.0"), "^1.0.0 || ^2.0.0"));
    }

    #[test]
    fn plain_version_is_exact() {
        assert!(satisfies(&v("1.2.3"), "1.2.3"));
        assert!(!satisfies(&v("1.2.4"), "1.2.3"));
    }

    #[test]
    fn partial_plain_version_is_an_x_range() {
        assert!(satisfies(&v("1.2.0"), "1.2"));
        assert!(satisfies(&v("1.2.9"), "1.2"));
        assert!(!satisfies(&v("1.5.0"), "1.2"));
        assert!(!satisfies(&v("1.1.9"), "1.2"));

        assert!(satisfies(&v("1.9.0"), "1"));
        assert!(!satisfies(&v("2.0.0"), "1"));
    }

    #[test]
    fn partial_plain_version_in_alternatives() {
        assert!(!satisfies(&v("1.9.0"), "1.2 || 2.x"));
        assert!(satisfies(&v("1.2.3"), "1.2 || 2.x"));
        assert!(satisfies(&v("2.4.0"), "1.2 || 2.x"));
        assert!(satisfies(&v("1.2.5"), ">=1.0.0 1.2"));
    }

    #[test]
    fn hyphen_range_is_inclusive() {
        assert!(satisfies(&v("2.0.0"), "1.0.0 - 2.0.0"));
        assert!(!satisfies(&v("2.0.1"), "1.0.0 - 2.0.0"));
    }

    #[test]
    fn wildcards() {
        assert!(satisfies(&v("0.9.0"), "*"));
        assert!(satisfies(&v("1.7.0"), "1.x"));
        assert!(!satisfies(&v("2.0.0"), "1.x"));
    }

    #[test]
    fn garbage_range_is_a_mismatch() {
        assert!(!satisfies(&v("1.0.0"), "not a range"));
        assert!(!satisfies(&v("1.0.0"), ">="));
    }

    #[traced_test]
    #[test]
    fn missing_range_is_compatible_with_warning() {
        let manifest = PluginManifest::new("@cloudgraph/cg-provider-aws", "0.1.0");
        assert!(check_version_compatibility(&manifest, &v("2.0.0")));
        assert!(logs_contain("assuming compatibility"));
    }

    #[traced_test]
    #[test]
    fn mismatch_logs_versions() {
        let manifest =
            PluginManifest::new("@cloudgraph/cg-provider-aws", "0.3.0").requiring_host("^1.0.0");
        assert!(!check_version_compatibility(&manifest, &v("2.0.0")));
        assert!(logs_contain(
            "provider @cloudgraph/cg-provider-aws@0.3.0 requires cli version ^1.0.0 but cli version is 2.0.0"
        ));
    }

    #[test]
    fn declared_range_that_matches_is_compatible() {
        let manifest = PluginManifest::new("p", "1.0.0").requiring_host("^2.0.0");
        assert!(check_version_compatibility(&manifest, &v("2.0.0")));
    }
}
