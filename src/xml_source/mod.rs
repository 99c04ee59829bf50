use reqwest::Client;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::error::FetchError;

// Constants for fetch configuration
const REQUEST_TIMEOUT: u64 = 30; // seconds
const CONNECT_TIMEOUT: u64 = 10; // seconds
const DEFAULT_USER_AGENT: &str = "SitemapLinks/0.1";

/// Configuration for loading remote XML sources
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl FetchConfig {
    /// Creates a new fetch configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the user agent string
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the request timeout duration
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the connection timeout for establishing new connections
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT),
        }
    }
}

/// Where an XML document comes from.
///
/// Remote sources double as the base for relative-link resolution; local
/// files carry no base.
#[derive(Debug, Clone)]
pub enum XmlSource {
    Remote(Url),
    Local(PathBuf),
}

/// XML content together with the URL it was fetched from, if any
#[derive(Debug)]
pub struct LoadedXml {
    pub content: String,
    pub base: Option<Url>,
}

impl XmlSource {
    /// Classifies a raw argument as a remote URL or a local file path
    ///
    /// Anything starting with `http://` or `https://` must parse as a URL;
    /// everything else is taken as a file path.
    pub fn from_arg(arg: &str) -> Result<Self, FetchError> {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            let url = Url::parse(arg).map_err(|source| FetchError::InvalidUrl {
                url: arg.to_string(),
                source,
            })?;
            Ok(XmlSource::Remote(url))
        } else {
            Ok(XmlSource::Local(PathBuf::from(arg)))
        }
    }

    /// Loads the XML content of this source
    ///
    /// Remote sources are fetched with the configured client settings; any
    /// non-success status is an error. Local sources are read as UTF-8.
    ///
    /// # Arguments
    /// * `config` - HTTP client settings used for remote sources
    ///
    /// # Returns
    /// * `Result<LoadedXml, FetchError>` - The document text plus resolution
    ///   base, or the access failure
    pub async fn load(&self, config: &FetchConfig) -> Result<LoadedXml, FetchError> {
        match self {
            XmlSource::Remote(url) => {
                let http_err = |source| FetchError::Http {
                    url: url.to_string(),
                    source,
                };

                let client = Client::builder()
                    .user_agent(config.user_agent.as_str())
                    .timeout(config.request_timeout)
                    .connect_timeout(config.connect_timeout)
                    .build()
                    .map_err(http_err)?;

                debug!(url = %url, "fetching XML");
                let response = client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(http_err)?
                    .error_for_status()
                    .map_err(http_err)?;

                let content = response.text().await.map_err(http_err)?;
                info!(url = %url, bytes = content.len(), "fetched XML document");

                Ok(LoadedXml {
                    content,
                    base: Some(url.clone()),
                })
            }
            XmlSource::Local(path) => {
                debug!(path = %path.display(), "reading XML file");
                let content = fs::read_to_string(path).map_err(|source| FetchError::File {
                    path: path.clone(),
                    source,
                })?;

                Ok(LoadedXml {
                    content,
                    base: None,
                })
            }
        }
    }
}

impl fmt::Display for XmlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlSource::Remote(url) => write!(f, "{}", url),
            XmlSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link_extractor::{extract_links, try_extract_links, ExtractorConfig};

    #[test]
    fn config_builder() {
        let config = FetchConfig::new()
            .with_user_agent("Test/1.0")
            .with_request_timeout(Duration::from_secs(5))
            .with_connect_timeout(Duration::from_secs(2));

        assert_eq!(config.user_agent, "Test/1.0");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
    }

    #[test]
    fn classifies_remote_and_local_sources() {
        assert!(matches!(
            XmlSource::from_arg("https://example.com/sitemap.xml"),
            Ok(XmlSource::Remote(_))
        ));
        assert!(matches!(
            XmlSource::from_arg("fixtures/sitemap.xml"),
            Ok(XmlSource::Local(_))
        ));
        assert!(matches!(
            XmlSource::from_arg("http://"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn loads_remote_content_with_base() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/sitemap.xml")
            .with_status(200)
            .with_header("content-type", "application/xml")
            .with_body("<urlset/>")
            .create_async()
            .await;

        let source = XmlSource::from_arg(&format!("{}/sitemap.xml", server.url())).unwrap();
        let loaded = source.load(&FetchConfig::default()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(loaded.content, "<urlset/>");
        assert_eq!(
            loaded.base.unwrap().as_str(),
            format!("{}/sitemap.xml", server.url())
        );
    }

    #[tokio::test]
    async fn http_failure_is_a_fetch_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/missing.xml")
            .with_status(404)
            .create_async()
            .await;

        let source = XmlSource::from_arg(&format!("{}/missing.xml", server.url())).unwrap();
        let result = source.load(&FetchConfig::default()).await;
        assert!(matches!(result, Err(FetchError::Http { .. })));

        // The boundary adapter swallows the same failure
        let links = extract_links(&source, &ExtractorConfig::new(), &FetchConfig::default()).await;
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_a_fetch_error() {
        let source = XmlSource::Local(PathBuf::from("does/not/exist.xml"));

        let result = try_extract_links(
            &source,
            &ExtractorConfig::new(),
            &FetchConfig::default(),
        )
        .await;
        assert!(matches!(
            result,
            Err(crate::error::ExtractError::Fetch(FetchError::File { .. }))
        ));

        let links = extract_links(&source, &ExtractorConfig::new(), &FetchConfig::default()).await;
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn remote_sitemap_end_to_end() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
    <url><loc>https://example.com/article-1</loc></url>
    <url><loc>https://example.com/article-2</loc></url>
</urlset>"#;

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/sitemap.xml")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let source = XmlSource::from_arg(&format!("{}/sitemap.xml", server.url())).unwrap();
        let links = try_extract_links(&source, &ExtractorConfig::new(), &FetchConfig::default())
            .await
            .unwrap();

        assert_eq!(
            links,
            vec![
                "https://example.com/article-1".to_string(),
                "https://example.com/article-2".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn relative_attribute_links_resolve_against_fetch_url() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/feeds/index.xml")
            .with_status(200)
            .with_body(r#"<doc><a href="/page"/></doc>"#)
            .create_async()
            .await;

        let source = XmlSource::from_arg(&format!("{}/feeds/index.xml", server.url())).unwrap();
        let links = try_extract_links(&source, &ExtractorConfig::new(), &FetchConfig::default())
            .await
            .unwrap();

        assert_eq!(links, vec![format!("{}/page", server.url())]);
    }
}
