use crate::error::FormError;
use log::debug;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Supported on-disk document formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self, FormError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            "toml" => Ok(Format::Toml),
            _ => Err(FormError::UnsupportedFormat(ext)),
        }
    }
}

/// Loads a schema, UI schema, value set or renderer mapping from disk.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, FormError> {
    let format = Format::from_path(path)?;
    let content = fs::read_to_string(path).map_err(|source| FormError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Loading {:?} as {:?}", path, format);
    parse_document(&content, format).map_err(|message| FormError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Parses in-memory document text in the given format.
pub fn parse_document<T: DeserializeOwned>(content: &str, format: Format) -> Result<T, String> {
    match format {
        Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        Format::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
    }
}
