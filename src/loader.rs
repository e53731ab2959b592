//! JSON loading from files, strings and HTTP URLs.
//!
//! Used for declaration manifests and for payloads to validate.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::LoadError;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load and deserialize a JSON file.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::InvalidJson` if the file doesn't parse as `T`.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_json_str(&content)
}

/// Deserialize a JSON string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` if the string doesn't parse as `T`.
pub fn load_json_str<T: DeserializeOwned>(content: &str) -> Result<T, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
}

/// Fetch and deserialize JSON from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails or the body
/// doesn't parse as `T`.
#[cfg(feature = "remote")]
pub fn load_json_url<T: DeserializeOwned>(url: &str) -> Result<T, LoadError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|source| LoadError::NetworkError {
            url: url.to_string(),
            source,
        })?;

    tracing::debug!(%url, "fetching");
    let response = client
        .get(url)
        .send()
        .map_err(|source| LoadError::NetworkError {
            url: url.to_string(),
            source,
        })?;

    // Check for HTTP errors before parsing
    let response = response
        .error_for_status()
        .map_err(|source| LoadError::NetworkError {
            url: url.to_string(),
            source,
        })?;

    response.json().map_err(|source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    })
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load JSON from a file path or URL.
///
/// Automatically detects whether the source is a URL or file path.
/// URL loading requires the `remote` feature.
///
/// # Errors
///
/// Returns appropriate errors based on the source type.
pub fn load_json_auto<T: DeserializeOwned>(source: &str) -> Result<T, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_json_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_json(Path::new(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_json_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"classes": []}}"#).unwrap();

        let value: Value = load_json(file.path()).unwrap();
        assert_eq!(value["classes"], serde_json::json!([]));
    }

    #[test]
    fn load_json_file_not_found() {
        let result = load_json::<Value>(Path::new("/nonexistent/models.json"));
        assert!(matches!(result, Err(LoadError::FileNotFound { .. })));
    }

    #[test]
    fn load_json_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let result = load_json::<Value>(file.path());
        assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn load_json_str_invalid() {
        let result = load_json_str::<Value>("not json");
        assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn is_url_schemes() {
        assert!(is_url("https://example.com/models.json"));
        assert!(is_url("http://example.com/models.json"));
        assert!(!is_url("/path/to/models.json"));
        assert!(!is_url("./models.json"));
        assert!(!is_url("models.json"));
    }

    #[test]
    fn load_json_auto_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"name": "A"}}"#).unwrap();

        let value: Value = load_json_auto(file.path().to_str().unwrap()).unwrap();
        assert_eq!(value["name"], "A");
    }

    #[cfg(feature = "remote")]
    mod remote {
        use super::*;

        #[test]
        fn load_json_url_valid() {
            let mut server = mockito::Server::new();
            let mock = server
                .mock("GET", "/models.json")
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(r#"{"classes": []}"#)
                .create();

            let url = format!("{}/models.json", server.url());
            let value: Value = load_json_url(&url).unwrap();
            assert_eq!(value["classes"], serde_json::json!([]));
            mock.assert();
        }

        #[test]
        fn load_json_url_404() {
            let mut server = mockito::Server::new();
            let _mock = server.mock("GET", "/missing.json").with_status(404).create();

            let url = format!("{}/missing.json", server.url());
            let result = load_json_url::<Value>(&url);
            assert!(matches!(result, Err(LoadError::NetworkError { .. })));
        }

        #[test]
        fn load_json_auto_url() {
            let mut server = mockito::Server::new();
            let _mock = server
                .mock("GET", "/models.json")
                .with_status(200)
                .with_body(r#"{"ok": true}"#)
                .create();

            let url = format!("{}/models.json", server.url());
            let value: Value = load_json_auto(&url).unwrap();
            assert_eq!(value["ok"], true);
        }
    }
}
