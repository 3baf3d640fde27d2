//! Document loading for config files and package manifests.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Serialization format of a config document, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `.json` documents (the default format).
    Json,
    /// `.toml` documents.
    Toml,
}

impl Format {
    /// Determine the format from the extension of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedFormat`] for any extension other than
    /// `json` or `toml`.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Read and deserialize the document at `path`.
///
/// # Errors
///
/// Returns an error if the extension is unsupported, the file cannot be read,
/// or its content does not deserialize into `T`.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let format = Format::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&content, format).map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Deserialize `content` in the given `format`, returning the parser message on failure.
pub(crate) fn parse_document<T: DeserializeOwned>(
    content: &str,
    format: Format,
) -> Result<T, String> {
    match format {
        Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::path::PathBuf;

    #[derive(Debug, Deserialize, PartialEq, Eq)]
    struct Doc {
        name: String,
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            Format::from_path(Path::new("a/dotpkg.json")).unwrap(),
            Format::Json
        );
        assert_eq!(
            Format::from_path(Path::new("a/dotpkg.TOML")).unwrap(),
            Format::Toml
        );
        assert!(matches!(
            Format::from_path(Path::new("a/dotpkg.yaml")),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(Format::from_path(Path::new("a/dotpkg")).is_err());
    }

    #[test]
    fn loads_json_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, r#"{"name": "vim"}"#).unwrap();
        let doc: Doc = load_document(&path).unwrap();
        assert_eq!(doc.name, "vim");
    }

    #[test]
    fn loads_toml_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.toml");
        std::fs::write(&path, "name = \"zsh\"\n").unwrap();
        let doc: Doc = load_document(&path).unwrap();
        assert_eq!(doc.name, "zsh");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_document::<Doc>(&PathBuf::from("/nonexistent/doc.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_document_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_document::<Doc>(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
