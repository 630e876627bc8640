//! Loading user-supplied JSON documents (registry configs, container configs, key files)

use serde_json::{json, Value};
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

use crate::output::{Output, PebbleError};

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("The file {path} does not exist")]
    NotFound { path: String },

    #[error("The file {path} is not valid JSON")]
    InvalidJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("The file {path} could not be read: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigLoadError {
    fn code(&self) -> &'static str {
        match self {
            ConfigLoadError::NotFound { .. } => "FILE_NOT_FOUND",
            ConfigLoadError::InvalidJson { .. } => "INVALID_JSON",
            ConfigLoadError::Io { .. } => "READ_FAIL",
        }
    }
}

/// What `load_json_document` does when the file cannot be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    /// Report the problem and exit with status 1
    Terminate,
    /// Report the problem and hand back `None` so the caller can ask again
    ReturnNone,
}

/// Expand a leading `~` to the home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// A JSON file as written, alongside its parsed value
#[derive(Debug, Clone, PartialEq)]
pub struct JsonDocument {
    pub text: String,
    pub value: Value,
}

/// Read and parse a JSON file, keeping its text. The path is reported back as the user typed it.
pub fn read_json_file(path: &str) -> Result<JsonDocument, ConfigLoadError> {
    let resolved = expand_tilde(path);

    // Directories open fine on some platforms; treat them like a missing file
    if resolved.is_dir() {
        return Err(ConfigLoadError::NotFound { path: path.to_string() });
    }

    let text = std::fs::read_to_string(&resolved).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ConfigLoadError::NotFound { path: path.to_string() },
        _ => ConfigLoadError::Io {
            path: path.to_string(),
            source,
        },
    })?;

    let value = serde_json::from_str(&text).map_err(|source| ConfigLoadError::InvalidJson {
        path: path.to_string(),
        source,
    })?;
    Ok(JsonDocument { text, value })
}

/// Load a JSON document, applying `on_failure` when it is missing or malformed
pub fn load_json_document(path: &str, on_failure: OnFailure, out: &Output) -> Option<Value> {
    load(path, on_failure, out).map(|doc| doc.value)
}

/// Like `load_json_document`, but hands back the file's text untouched once it parses
pub fn load_json_text(path: &str, on_failure: OnFailure, out: &Output) -> Option<String> {
    load(path, on_failure, out).map(|doc| doc.text)
}

fn load(path: &str, on_failure: OnFailure, out: &Output) -> Option<JsonDocument> {
    out.log("debug", &format!("Loading JSON document from {}", path));

    match read_json_file(path) {
        Ok(doc) => Some(doc),
        Err(e) => match on_failure {
            OnFailure::Terminate => out.error(
                PebbleError::input(e.code(), &e.to_string())
                    .with_details(json!({"path": path})),
            ),
            OnFailure::ReturnNone => {
                out.log("warn", &e.to_string());
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let err = read_json_file(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigLoadError::NotFound { .. }));
        assert!(err.to_string().ends_with("does not exist"));
    }

    #[test]
    fn directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_json_file(dir.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigLoadError::NotFound { .. }));
    }

    #[test]
    fn garbage_is_invalid_json() {
        let file = write_temp("not json");
        let path = file.path().to_str().unwrap().to_string();
        let err = read_json_file(&path).unwrap_err();
        assert!(matches!(err, ConfigLoadError::InvalidJson { .. }));
        assert_eq!(err.to_string(), format!("The file {} is not valid JSON", path));
    }

    #[test]
    fn unreadable_contents_are_an_io_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe]).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let err = read_json_file(&path).unwrap_err();

        assert!(matches!(err, ConfigLoadError::Io { .. }), "got {err:?}");
        assert_eq!(err.code(), "READ_FAIL");
        assert!(err.to_string().starts_with(&format!("The file {} could not be read", path)));
    }

    #[test]
    fn text_is_kept_as_written() {
        let out = Output::new(false, false);
        let raw = "{\n  \"type\": \"service_account\",\n  \"project_id\": \"demo\"\n}\n";
        let file = write_temp(raw);

        let doc = read_json_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(doc.text, raw);
        assert_eq!(doc.value, json!({"type": "service_account", "project_id": "demo"}));

        let text = load_json_text(file.path().to_str().unwrap(), OnFailure::ReturnNone, &out);
        assert_eq!(text.as_deref(), Some(raw));
        let broken = write_temp("{ broken");
        assert!(load_json_text(broken.path().to_str().unwrap(), OnFailure::ReturnNone, &out).is_none());
    }

    #[test]
    fn auths_document_is_returned_intact() {
        let file = write_temp(
            r#"{
                "auths": {
                    "https://index.docker.io/v1/": {
                        "auth": "b64_username_password"
                    }
                }
            }"#,
        );
        let value = read_json_file(file.path().to_str().unwrap()).unwrap().value;
        assert_eq!(
            value,
            json!({"auths": {"https://index.docker.io/v1/": {"auth": "b64_username_password"}}})
        );
    }

    #[test]
    fn return_none_policy_yields_none() {
        let out = Output::new(false, false);
        let file = write_temp("{ broken");
        assert!(load_json_document(file.path().to_str().unwrap(), OnFailure::ReturnNone, &out).is_none());
    }

    #[test]
    fn return_none_policy_passes_value_through() {
        let out = Output::new(false, false);
        let file = write_temp(r#"{"type": "service_account"}"#);
        let value = load_json_document(file.path().to_str().unwrap(), OnFailure::ReturnNone, &out);
        assert_eq!(value, Some(json!({"type": "service_account"})));
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/cfg.json"), home.join("cfg.json"));
            assert_eq!(expand_tilde("~"), home);
        }
        assert_eq!(expand_tilde("/etc/x.json"), PathBuf::from("/etc/x.json"));
        assert_eq!(expand_tilde("a~b"), PathBuf::from("a~b"));
    }
}
