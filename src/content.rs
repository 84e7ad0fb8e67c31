//! Content loading: per-extension parsing of leaf files into field mappings.
//!
//! Recognized formats:
//!
//! - `.yml` / `.yaml` — a YAML document, loaded as a JSON object
//! - `.md` / `.markdown` — a front-matter document: YAML between `---`
//!   delimiters (the first anchored at byte 0), with the remaining body
//!   stored under `__body`
//! - anything else — the raw text as a JSON string
//!
//! A markdown file without well-formed front matter (leading whitespace,
//! missing delimiter, empty front matter or empty body) degrades to the
//! raw-text case rather than erroring. Read failures and malformed YAML
//! abort the caller's compilation; both carry the offending path.

use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Key the front-matter body is stored under.
const BODY_KEY: &str = "__body";

/// Read and parse one file according to its extension.
pub fn load(path: &Path) -> Result<Value, LoadError> {
    let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    parse(&raw, &extension).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse file contents by extension (without the leading dot).
pub fn parse(raw: &str, extension: &str) -> Result<Value, serde_yaml::Error> {
    match extension {
        "yml" | "yaml" => serde_yaml::from_str(raw),
        "md" | "markdown" => parse_front_matter_document(raw),
        _ => Ok(Value::String(raw.to_string())),
    }
}

fn parse_front_matter_document(raw: &str) -> Result<Value, serde_yaml::Error> {
    let Some((front_matter, body)) = split_front_matter(raw) else {
        return Ok(Value::String(raw.to_string()));
    };
    if front_matter.is_empty() || body.is_empty() {
        return Ok(Value::String(raw.to_string()));
    }

    let mut fields: Value = serde_yaml::from_str(front_matter)?;
    match &mut fields {
        Value::Object(map) => {
            map.insert(BODY_KEY.to_string(), Value::String(body.to_string()));
            Ok(fields)
        }
        // Front matter that isn't a mapping can't carry a body field.
        _ => Ok(Value::String(raw.to_string())),
    }
}

/// Split `---\n<front matter>\n---\n<body>`, anchored at the start of the
/// document. Returns `None` when either delimiter is missing.
fn split_front_matter(raw: &str) -> Option<(&str, &str)> {
    let rest = raw.strip_prefix("---\n")?;
    if let Some(body) = rest.strip_prefix("---\n") {
        return Some(("", body));
    }
    let end = rest.find("\n---\n")?;
    Some((&rest[..end], &rest[end + "\n---\n".len()..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const YAML: &str =
        "budget: 58000000\ntagline: Witness the beginning of a happy ending\ntitle: Deadpool";

    #[test]
    fn parses_yaml_for_both_extensions() {
        let expected = json!({
            "budget": 58000000,
            "tagline": "Witness the beginning of a happy ending",
            "title": "Deadpool",
        });
        assert_eq!(parse(YAML, "yml").unwrap(), expected);
        assert_eq!(parse(YAML, "yaml").unwrap(), expected);
    }

    #[test]
    fn parses_front_matter_document() {
        let raw = format!("---\n{YAML}\n---\nMore content with a \nnew line");
        let parsed = parse(&raw, "md").unwrap();

        assert_eq!(parsed["title"], "Deadpool");
        assert_eq!(parsed["budget"], 58000000);
        assert_eq!(parsed["__body"], "More content with a \nnew line");
    }

    #[test]
    fn markdown_extension_variants_are_equivalent() {
        let raw = format!("---\n{YAML}\n---\nBody");
        assert_eq!(parse(&raw, "md").unwrap(), parse(&raw, "markdown").unwrap());
    }

    #[test]
    fn front_matter_requires_anchored_delimiter() {
        // Leading whitespace before the opening delimiter: raw passthrough.
        let raw = format!("    ---\n{YAML}\n---\nBody");
        assert_eq!(parse(&raw, "md").unwrap(), Value::String(raw.clone()));
    }

    #[test]
    fn unterminated_front_matter_is_raw() {
        let raw = format!("---\n{YAML}\nBody without closing delimiter");
        assert_eq!(parse(&raw, "md").unwrap(), Value::String(raw.clone()));
    }

    #[test]
    fn empty_front_matter_is_raw() {
        let raw = "---\n---\nJust a body";
        assert_eq!(parse(raw, "md").unwrap(), Value::String(raw.to_string()));
    }

    #[test]
    fn unrecognized_extension_is_raw_text() {
        assert_eq!(
            parse("plain text", "txt").unwrap(),
            Value::String("plain text".to_string())
        );
        assert_eq!(
            parse("plain text", "").unwrap(),
            Value::String("plain text".to_string())
        );
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(parse("title: [unclosed", "yml").is_err());
    }

    #[test]
    fn load_reports_missing_file_with_path() {
        let err = load(Path::new("/nonexistent/file.yml")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/file.yml"));
    }

    #[test]
    fn load_parses_from_disk() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("movie.yml");
        std::fs::write(&path, "title: Arrival\nyear: 2016").unwrap();

        let fields = load(&path).unwrap();
        assert_eq!(fields, json!({"title": "Arrival", "year": 2016}));
    }
}
