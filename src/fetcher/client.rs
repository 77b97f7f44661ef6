use crate::config::FetchConfig;
use crate::fetcher::{
    errors::{FetchError, is_retriable_status},
    pipeline::process_response,
    types::{PageSource, RawDocument},
};
use async_trait::async_trait;
use bytes::BytesMut;
use reqwest::{
    Client, ClientBuilder,
    header::{self, HeaderMap, HeaderValue},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use url::Url;

const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const ACCEPT_ENCODING: &str = "gzip, deflate, br";

/// HTTP client that presents itself as a desktop browser.
///
/// Holds a single `reqwest::Client`; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_body_bytes: u64,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .map_err(|e| FetchError::Unknown(format!("invalid accept-language: {e}")))?,
        );
        headers.insert(
            header::ACCEPT_ENCODING,
            HeaderValue::from_static(ACCEPT_ENCODING),
        );
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));

        let client = ClientBuilder::new()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(10))
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Unknown(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// Fetch `url` without a caller-supplied cancellation token.
    pub async fn fetch(&self, url: &str) -> Result<RawDocument, FetchError> {
        let parsed = parse_url(url)?;
        self.fetch_url(&parsed, &CancellationToken::new()).await
    }

    /// Fetch `url`, abandoning the request as soon as `cancel` fires.
    pub async fn fetch_cancellable(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<RawDocument, FetchError> {
        let parsed = parse_url(url)?;
        self.fetch_url(&parsed, cancel).await
    }

    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch_url(
        &self,
        url: &Url,
        cancel: &CancellationToken,
    ) -> Result<RawDocument, FetchError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("fetch cancelled by caller");
                Err(FetchError::Cancelled)
            }
            result = self.get(url) => result,
        }
    }

    async fn get(&self, url: &Url) -> Result<RawDocument, FetchError> {
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        let final_url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();

        if !status.is_success() {
            return Err(FetchError::Http {
                status,
                retriable: is_retriable_status(status),
            });
        }

        // Check content length before downloading
        if let Some(content_length) = response.content_length()
            && content_length > self.max_body_bytes
        {
            return Err(FetchError::BodyTooLarge(content_length));
        }

        // A missing content type is common on misconfigured servers; assume HTML.
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        if !is_html(&content_type) {
            return Err(FetchError::UnsupportedContentType(content_type));
        }

        // Content-Length may be absent (chunked) or describe the compressed
        // body, so the limit is enforced while streaming.
        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(FetchError::from_reqwest_error)?
        {
            let received = (body.len() + chunk.len()) as u64;
            if received > self.max_body_bytes {
                return Err(FetchError::BodyTooLarge(received));
            }
            body.extend_from_slice(&chunk);
        }
        let body_bytes = body.freeze();

        debug!(
            status = status.as_u16(),
            final_url = %final_url,
            bytes = body_bytes.len(),
            "fetched page"
        );

        Ok(process_response(
            final_url,
            status,
            headers,
            body_bytes,
            &content_type,
        ))
    }
}

#[async_trait]
impl PageSource for Fetcher {
    async fn fetch(
        &self,
        url: &Url,
        cancel: &CancellationToken,
    ) -> Result<RawDocument, FetchError> {
        self.fetch_url(url, cancel).await
    }
}

/// Parse and validate an absolute http(s) URL.
pub fn parse_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url.trim())?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::UnsupportedScheme(other.to_string())),
    }
}

fn is_html(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.contains("text/html") || content_type.contains("application/xhtml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_rejects_relative() {
        assert!(matches!(
            parse_url("/just/a/path"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_parse_url_rejects_non_http_scheme() {
        match parse_url("ftp://example.com/file") {
            Err(FetchError::UnsupportedScheme(scheme)) => assert_eq!(scheme, "ftp"),
            other => panic!("expected UnsupportedScheme, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_url_trims_whitespace() {
        let url = parse_url("  https://example.com/a  ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a");
    }

    #[test]
    fn test_is_html() {
        assert!(is_html("text/html; charset=utf-8"));
        assert!(is_html("application/xhtml+xml"));
        assert!(is_html("TEXT/HTML"));
        assert!(!is_html("application/pdf"));
    }
}
