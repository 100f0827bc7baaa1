//! Schema loading from files, strings and HTTP URLs.
//!
//! Also provides the built-in scheme handlers for `file`, `http` and `https`.

use std::path::Path;

use serde_json::Value;
use url::Url;

use crate::error::FetchError;
use crate::registry::SchemeHandler;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load a schema from a file path.
///
/// # Errors
///
/// Returns `FetchError::FileNotFound` if the file doesn't exist,
/// or `FetchError::InvalidJson` if the file isn't valid JSON.
pub fn load_schema(path: &Path) -> Result<Value, FetchError> {
    if !path.exists() {
        return Err(FetchError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| FetchError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_schema_str(&content)
}

/// Load a schema from a JSON string.
///
/// # Errors
///
/// Returns `FetchError::InvalidJson` if the string isn't valid JSON.
pub fn load_schema_str(content: &str) -> Result<Value, FetchError> {
    serde_json::from_str(content).map_err(|source| FetchError::InvalidJson { source })
}

/// Load a schema from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `FetchError::NetworkError` if the request fails, the server
/// answers with an error status, or the body isn't valid JSON.
#[cfg(feature = "remote")]
pub fn load_schema_url(url: &str) -> Result<Value, FetchError> {
    fetch_json(url, HTTP_TIMEOUT)
}

#[cfg(feature = "remote")]
fn fetch_json(url: &str, timeout: Duration) -> Result<Value, FetchError> {
    let network_error = |source| FetchError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(network_error)?;

    let response = client.get(url).send().map_err(network_error)?;

    // Check for HTTP errors before parsing
    let response = response.error_for_status().map_err(network_error)?;

    response.json().map_err(network_error)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a schema from a file path, `file:` URI or URL.
///
/// URL loading requires the `remote` feature.
///
/// # Errors
///
/// Returns appropriate errors based on the source type.
pub fn load_schema_auto(source: &str) -> Result<Value, FetchError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_schema_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(FetchError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else if source.starts_with("file:") {
        let url = Url::parse(source).map_err(|_| FetchError::NotALocalPath {
            uri: source.to_string(),
        })?;
        FileHandler.fetch(&url)
    } else {
        load_schema(Path::new(source))
    }
}

/// Turn a command-line schema source into the URI it should be cached under.
///
/// URLs are kept as-is; file paths become absolute `file:` URIs. Returns
/// `None` when no absolute URI can be formed.
pub fn source_uri(source: &str) -> Option<Url> {
    if is_url(source) || source.starts_with("file:") {
        return Url::parse(source).ok();
    }
    let path = Path::new(source);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(path)
    };
    Url::from_file_path(absolute).ok()
}

/// Handler for `file:` URIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileHandler;

impl SchemeHandler for FileHandler {
    fn fetch(&self, uri: &Url) -> Result<Value, FetchError> {
        let path = uri.to_file_path().map_err(|()| FetchError::NotALocalPath {
            uri: uri.to_string(),
        })?;
        load_schema(&path)
    }
}

/// Handler for `http:` and `https:` URIs.
///
/// Requests use a per-request timeout; non-success statuses are failures.
#[cfg(feature = "remote")]
#[derive(Debug, Clone)]
pub struct HttpHandler {
    timeout: Duration,
}

#[cfg(feature = "remote")]
impl HttpHandler {
    pub fn new() -> Self {
        Self {
            timeout: HTTP_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[cfg(feature = "remote")]
impl Default for HttpHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "remote")]
impl SchemeHandler for HttpHandler {
    fn fetch(&self, uri: &Url) -> Result<Value, FetchError> {
        // The fragment is never sent to the server.
        let mut target = uri.clone();
        target.set_fragment(None);
        fetch_json(target.as_str(), self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_schema_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"type": "object"}}"#).unwrap();

        let schema = load_schema(file.path()).unwrap();
        assert_eq!(schema["type"], "object");
    }

    #[test]
    fn load_schema_file_not_found() {
        let result = load_schema(Path::new("/nonexistent/path.json"));
        assert!(matches!(result, Err(FetchError::FileNotFound { .. })));
    }

    #[test]
    fn load_schema_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let result = load_schema(file.path());
        assert!(matches!(result, Err(FetchError::InvalidJson { .. })));
    }

    #[test]
    fn load_schema_str_invalid() {
        let result = load_schema_str("not json");
        assert!(matches!(result, Err(FetchError::InvalidJson { .. })));
    }

    #[test]
    fn is_url_schemes() {
        assert!(is_url("https://example.com/schema.json"));
        assert!(is_url("http://example.com/schema.json"));
        assert!(!is_url("/path/to/schema.json"));
        assert!(!is_url("file:///path/to/schema.json"));
    }

    #[test]
    fn load_schema_auto_file_and_file_uri() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"type": "string"}}"#).unwrap();

        let schema = load_schema_auto(file.path().to_str().unwrap()).unwrap();
        assert_eq!(schema["type"], "string");

        let uri = Url::from_file_path(file.path()).unwrap();
        let schema = load_schema_auto(uri.as_str()).unwrap();
        assert_eq!(schema["type"], "string");
    }

    #[test]
    fn source_uri_for_paths_and_urls() {
        let uri = source_uri("https://example.com/a.json").unwrap();
        assert_eq!(uri.as_str(), "https://example.com/a.json");

        let uri = source_uri("/tmp/schemas/a.json").unwrap();
        assert_eq!(uri.scheme(), "file");
        assert!(uri.path().ends_with("/schemas/a.json"));

        let uri = source_uri("relative/a.json").unwrap();
        assert_eq!(uri.scheme(), "file");
        assert!(uri.path().ends_with("/relative/a.json"));
    }

    #[test]
    fn file_handler_reads_file_uri() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"title": "from disk"}}"#).unwrap();

        let uri = Url::from_file_path(file.path()).unwrap();
        let schema = FileHandler.fetch(&uri).unwrap();
        assert_eq!(schema["title"], "from disk");
    }

    #[test]
    fn file_handler_rejects_remote_host() {
        let uri = Url::parse("file://remote-host/schema.json").unwrap();
        let result = FileHandler.fetch(&uri);
        assert!(matches!(result, Err(FetchError::NotALocalPath { .. })));
    }

    #[cfg(feature = "remote")]
    mod remote {
        use super::*;

        #[test]
        fn http_handler_fetches_json() {
            let mut server = mockito::Server::new();
            let mock = server
                .mock("GET", "/schemas/item.json")
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(r#"{"type": "object", "title": "item"}"#)
                .expect(1)
                .create();

            let uri = Url::parse(&format!("{}/schemas/item.json#/properties", server.url()))
                .unwrap();
            let schema = HttpHandler::new().fetch(&uri).unwrap();

            assert_eq!(schema["title"], "item");
            mock.assert();
        }

        #[test]
        fn http_handler_error_status() {
            let mut server = mockito::Server::new();
            let _mock = server.mock("GET", "/missing.json").with_status(404).create();

            let uri = Url::parse(&format!("{}/missing.json", server.url())).unwrap();
            let result = HttpHandler::new().fetch(&uri);
            assert!(matches!(result, Err(FetchError::NetworkError { .. })));
        }

        #[test]
        fn http_handler_invalid_body() {
            let mut server = mockito::Server::new();
            let _mock = server
                .mock("GET", "/broken.json")
                .with_status(200)
                .with_body("not json")
                .create();

            let result = load_schema_url(&format!("{}/broken.json", server.url()));
            assert!(matches!(result, Err(FetchError::NetworkError { .. })));
        }
    }
}
