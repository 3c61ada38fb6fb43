//! Markup acquisition from URLs, browser sessions, files, and stdin.
//!
//! Extraction itself only needs a markup string. This module supplies that
//! string from the places a caller usually has it: a plain HTTP fetch, the
//! rendered source of a browser session the caller already drives, a local
//! file, or standard input. Errors from these sources are passed through
//! unchanged; nothing here retries.

use std::fs;
use std::path::PathBuf;
#[cfg(feature = "fetch")]
use std::time::Duration;

#[cfg(feature = "fetch")]
use reqwest::Client;
#[cfg(feature = "fetch")]
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use url::Url;

use crate::{FieldprobeError, Result};

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// User-Agent string.
    pub user_agent: String,
    /// Extra request headers. A header given here replaces the default of the same name.
    pub headers: Vec<(String, String)>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            headers: Vec::new(),
        }
    }
}

/// A browser session the caller controls.
///
/// fieldprobe never opens, navigates, or closes sessions; it only asks a live
/// one for its current rendered markup.
pub trait PageSession {
    /// Whether the session can still answer `page_source`.
    fn is_live(&self) -> bool;

    /// The markup of the page as currently rendered.
    fn page_source(&self) -> Result<String>;
}

/// Where markup comes from.
pub enum MarkupSource<'a> {
    /// Plain HTTP GET of a URL.
    #[cfg(feature = "fetch")]
    StaticFetch { url: String, config: FetchConfig },
    /// Rendered source of a caller-owned browser session.
    RenderedSession(&'a dyn PageSession),
    /// A local HTML file.
    File(PathBuf),
    /// Everything on standard input.
    Stdin,
    /// Markup the caller already holds.
    Markup(String),
}

impl MarkupSource<'_> {
    /// Classifies a command-line style input: `-` is stdin, an `http(s)://`
    /// address is fetched, anything else is a file path.
    ///
    /// # Errors
    ///
    /// Returns [`FieldprobeError::InvalidArgument`] for a URL when the crate
    /// was built without the `fetch` feature.
    pub fn from_input(input: &str, config: &FetchConfig) -> Result<Self> {
        if input == "-" {
            return Ok(Self::Stdin);
        }
        if is_url_input(input) {
            #[cfg(feature = "fetch")]
            return Ok(Self::StaticFetch { url: input.to_string(), config: config.clone() });

            #[cfg(not(feature = "fetch"))]
            {
                let _ = config;
                return Err(FieldprobeError::InvalidArgument(format!(
                    "URL input requires the fetch feature: {}",
                    input
                )));
            }
        }
        Ok(Self::File(PathBuf::from(input)))
    }

    /// Short human-readable description for progress output.
    pub fn describe(&self) -> String {
        match self {
            #[cfg(feature = "fetch")]
            Self::StaticFetch { url, .. } => format!("URL {}", url),
            Self::RenderedSession(_) => "rendered browser session".to_string(),
            Self::File(path) => format!("file {}", path.display()),
            Self::Stdin => "stdin".to_string(),
            Self::Markup(_) => "inline markup".to_string(),
        }
    }
}

fn is_url_input(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Obtains the markup a source points at.
///
/// # Errors
///
/// - [`FieldprobeError::MissingCollaborator`] when a session is not live.
/// - [`FieldprobeError::InvalidUrl`], [`FieldprobeError::Timeout`],
///   [`FieldprobeError::HttpStatus`] or [`FieldprobeError::HttpError`] from a fetch.
/// - [`FieldprobeError::FileNotFound`] or [`FieldprobeError::Io`] from file or stdin reads.
pub async fn acquire(source: &MarkupSource<'_>) -> Result<String> {
    match source {
        #[cfg(feature = "fetch")]
        MarkupSource::StaticFetch { url, config } => fetch_url(url, config).await,
        MarkupSource::RenderedSession(session) => rendered_source(*session),
        MarkupSource::File(path) => fetch_file(path),
        MarkupSource::Stdin => fetch_stdin(),
        MarkupSource::Markup(markup) => Ok(markup.clone()),
    }
}

/// Reads the rendered markup of a live session.
pub fn rendered_source(session: &dyn PageSession) -> Result<String> {
    if !session.is_live() {
        return Err(FieldprobeError::MissingCollaborator(
            "rendered-session acquisition needs a live browser session".to_string(),
        ));
    }
    session.page_source()
}

/// Parses and validates an http(s) URL.
pub fn parse_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| FieldprobeError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FieldprobeError::InvalidUrl(format!(
            "unsupported scheme '{}', expected http or https",
            other
        ))),
    }
}

#[cfg(feature = "fetch")]
fn request_headers(config: &FetchConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    let user_agent = HeaderValue::from_str(&config.user_agent)
        .map_err(|e| FieldprobeError::InvalidArgument(format!("Invalid User-Agent: {}", e)))?;
    headers.insert(USER_AGENT, user_agent);

    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| FieldprobeError::InvalidArgument(format!("Invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| FieldprobeError::InvalidArgument(format!("Invalid value for header '{}': {}", name, e)))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

/// Fetches HTML content from a URL.
///
/// Follows redirects and applies the configured timeout. Any non-2xx status
/// is an error.
#[cfg(feature = "fetch")]
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<String> {
    let parsed_url = parse_url(url)?;
    let headers = request_headers(config)?;

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .default_headers(headers)
        .build()
        .map_err(FieldprobeError::HttpError)?;

    tracing::debug!(url = %parsed_url, timeout = config.timeout, "fetching page");

    let response = client.get(parsed_url).send().await.map_err(|e| {
        if e.is_timeout() {
            FieldprobeError::Timeout { timeout: config.timeout }
        } else {
            FieldprobeError::HttpError(e)
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FieldprobeError::HttpStatus { status: status.as_u16(), url: url.to_string() });
    }

    let content = response.text().await?;
    tracing::debug!(bytes = content.len(), "fetched page");

    Ok(content)
}

/// Reads HTML content from a local file.
pub fn fetch_file(path: impl Into<PathBuf>) -> Result<String> {
    let path_buf = path.into();

    if !path_buf.exists() {
        Err(FieldprobeError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(FieldprobeError::from)
    }
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct FakeSession {
        live: bool,
        markup: &'static str,
    }

    impl PageSession for FakeSession {
        fn is_live(&self) -> bool {
            self.live
        }

        fn page_source(&self) -> Result<String> {
            Ok(self.markup.to_string())
        }
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Runtime::new().unwrap().block_on(future)
    }

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, 10);
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert!(config.headers.is_empty());
    }

    #[test]
    #[cfg(feature = "fetch")]
    fn test_fetch_url_invalid() {
        let config = FetchConfig::default();
        let result = block_on(fetch_url("not-a-url", &config));
        assert!(matches!(result, Err(FieldprobeError::InvalidUrl(_))));
    }

    #[test]
    #[cfg(feature = "fetch")]
    fn test_fetch_url_rejects_other_schemes() {
        let config = FetchConfig::default();
        let result = block_on(fetch_url("ftp://example.com/book", &config));
        assert!(matches!(result, Err(FieldprobeError::InvalidUrl(ref msg)) if msg.contains("ftp")));
    }

    #[test]
    #[cfg(feature = "fetch")]
    fn test_caller_headers_override_defaults() {
        let config = FetchConfig {
            headers: vec![("Accept-Language".to_string(), "ru-RU,ru;q=0.9".to_string())],
            ..Default::default()
        };
        let headers = request_headers(&config).unwrap();

        assert_eq!(headers.get(ACCEPT_LANGUAGE).unwrap().to_str().unwrap(), "ru-RU,ru;q=0.9");
        assert!(headers.get(ACCEPT).is_some());
        assert!(headers.get(USER_AGENT).is_some());
    }

    #[test]
    #[cfg(feature = "fetch")]
    fn test_invalid_header_name() {
        let config = FetchConfig { headers: vec![("bad header".to_string(), "x".to_string())], ..Default::default() };
        assert!(matches!(request_headers(&config), Err(FieldprobeError::InvalidArgument(_))));
    }

    #[test]
    fn test_fetch_file_not_found() {
        let result = fetch_file("/nonexistent/path/file.html");
        assert!(matches!(result, Err(FieldprobeError::FileNotFound(_))));
    }

    #[test]
    fn test_fetch_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<p>2020</p>").unwrap();

        assert_eq!(fetch_file(file.path()).unwrap(), "<p>2020</p>");
    }

    #[test]
    fn test_dead_session_is_missing_collaborator() {
        let session = FakeSession { live: false, markup: "<p>x</p>" };
        let result = block_on(acquire(&MarkupSource::RenderedSession(&session)));
        assert!(matches!(result, Err(FieldprobeError::MissingCollaborator(_))));
    }

    #[test]
    fn test_live_session() {
        let session = FakeSession { live: true, markup: "<p>rendered</p>" };
        let result = block_on(acquire(&MarkupSource::RenderedSession(&session)));
        assert_eq!(result.unwrap(), "<p>rendered</p>");
    }

    #[test]
    #[cfg(feature = "fetch")]
    fn test_from_input() {
        let config = FetchConfig::default();

        assert!(matches!(MarkupSource::from_input("-", &config), Ok(MarkupSource::Stdin)));
        assert!(matches!(
            MarkupSource::from_input("https://example.com/book", &config),
            Ok(MarkupSource::StaticFetch { .. })
        ));
        assert!(matches!(MarkupSource::from_input("page.html", &config), Ok(MarkupSource::File(_))));
        assert_eq!(MarkupSource::from_input("page.html", &config).unwrap().describe(), "file page.html");
    }

    #[test]
    #[cfg(not(feature = "fetch"))]
    fn test_url_input_without_fetch_feature() {
        let config = FetchConfig::default();

        let result = MarkupSource::from_input("https://example.com/book", &config);
        assert!(matches!(result, Err(FieldprobeError::InvalidArgument(ref msg)) if msg.contains("fetch feature")));
        assert!(matches!(MarkupSource::from_input("page.html", &config), Ok(MarkupSource::File(_))));
    }

    #[test]
    fn test_url_input_detection() {
        assert!(is_url_input("http://example.com"));
        assert!(is_url_input("https://example.com/book"));
        assert!(!is_url_input("ftp://example.com"));
        assert!(!is_url_input("books/https.html"));
    }
}
