// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment extraction failures into miette diagnostics.
//!
//! Unknown keys are located in the TOML text they came from so the report
//! can underline them, and a close valid key is offered as a correction.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a valid key must beat to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration problem ready for rendering.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(code(cloudgraph::config::unknown_key))]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        #[help]
        help: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(cloudgraph::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(cloudgraph::config::missing_key),
        help("set `{key}` in cloudgraph.toml or the environment")
    )]
    MissingKey { key: String },

    /// A value that parsed but makes no sense for a run.
    #[error("validation error: {message}")]
    #[diagnostic(code(cloudgraph::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(cloudgraph::config::other))]
    Other(String),
}

impl ConfigError {
    fn unknown_key(
        key: &str,
        valid: &[&str],
        location: Option<(SourceSpan, NamedSource<String>)>,
    ) -> Self {
        let suggestion = suggest_key(key, valid);
        let listing = valid.join(", ");
        let help = match &suggestion {
            Some(s) => format!("did you mean `{s}`? Valid keys: {listing}"),
            None => format!("valid keys: {listing}"),
        };
        let (span, src) = location.unzip();
        ConfigError::UnknownKey {
            key: key.to_string(),
            suggestion,
            help,
            span,
            src,
        }
    }
}

/// Split a figment error into one diagnostic per underlying failure.
///
/// `toml_sources` pairs each loaded file path with its contents.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(field, expected) => {
                let location = locate(&error, field, toml_sources);
                ConfigError::unknown_key(field, expected, location)
            }
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: field.to_string(),
            },
            Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                key: error.path.join("."),
                detail: format!("found {actual}, expected {expected}"),
                expected: expected.to_string(),
            },
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

/// Pick the source the error came from and find `field` inside it.
fn locate(
    error: &figment::error::Error,
    field: &str,
    toml_sources: &[(String, String)],
) -> Option<(SourceSpan, NamedSource<String>)> {
    let file = error.metadata.as_ref().and_then(|m| match m.source.as_ref()? {
        figment::Source::File(path) => Some(path.display().to_string()),
        _ => None,
    });

    // Inline strings have no file metadata.
    let (name, content) = match file {
        Some(file) => toml_sources.iter().find(|(name, _)| *name == file)?,
        None if toml_sources.len() == 1 => &toml_sources[0],
        None => return None,
    };

    let offset = find_key_offset(content, &error.path, field)?;
    Some((
        SourceSpan::new(offset.into(), field.len()),
        NamedSource::new(name, content.clone()),
    ))
}

/// Byte offset of `field` as a key below the table named by `path`.
///
/// The full dotted header (`[providers.aws]`) is preferred. The first path
/// segment alone is the fallback. An empty path searches from the top.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let start = match path.first() {
        None => 0,
        Some(first) => [path.join("."), first.clone()]
            .iter()
            .map(|table| format!("[{table}]"))
            .find_map(|header| content.find(&header).map(|at| at + header.len()))?,
    };

    let mut line_start = start;
    for line in content[start..].split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        let is_key = line[indent..]
            .strip_prefix(field)
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c == '=' || c == ' ' || c == '\t');
        if is_key {
            return Some(line_start + indent);
        }
        line_start += line.len();
    }
    None
}

/// Closest valid key to `unknown`, if any is similar enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Print every error to stderr with miette's graphical renderer.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggest_storage_host_for_typo() {
        let valid = &["storage_host", "data_dir", "log_level"];
        assert_eq!(
            suggest_key("storge_host", valid),
            Some("storage_host".to_string())
        );
    }

    #[test]
    fn suggest_regions_for_typo() {
        let valid = &["regions", "resources"];
        assert_eq!(suggest_key("regons", valid), Some("regions".to_string()));
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["storage_host", "data_dir", "log_level"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn find_key_offset_in_nested_section() {
        let content = "[providers.gcp]\nregons = []\n[providers.aws]\nregons = [\"x\"]\n";
        let path = vec!["providers".to_string(), "aws".to_string()];
        let o = find_key_offset(content, &path, "regons").unwrap();
        assert_eq!(&content[o..o + 6], "regons");
        assert!(o > content.find("[providers.aws]").unwrap());
    }

    #[test]
    fn find_key_offset_ignores_longer_keys_and_indent() {
        let content = "[cloud_graph]\ndata_dir_x = 1\n  data_dir = \"d\"\n";
        let path = vec!["cloud_graph".to_string()];
        let o = find_key_offset(content, &path, "data_dir").unwrap();
        assert_eq!(&content[o..o + 8], "data_dir");
        assert_eq!(&content[o - 2..o], "  ");
    }

    #[test]
    fn unknown_key_help_lists_keys_and_suggestion() {
        let err = ConfigError::unknown_key("regons", &["regions", "resources"], None);
        let ConfigError::UnknownKey { suggestion, help, span, .. } = err else {
            panic!("expected UnknownKey");
        };
        assert_eq!(suggestion.as_deref(), Some("regions"));
        assert_eq!(help, "did you mean `regions`? Valid keys: regions, resources");
        assert!(span.is_none());
    }
}
