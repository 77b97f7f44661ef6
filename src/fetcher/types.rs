use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{StatusCode, header::HeaderMap};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::fetcher::errors::FetchError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Charset {
    Utf8,
    Windows1252,
    ShiftJis,
    Gb2312,
    Big5,
    Other(String),
}

impl Charset {
    pub fn from_encoding(encoding: &'static encoding_rs::Encoding) -> Self {
        use std::ptr;

        if ptr::eq(encoding, encoding_rs::UTF_8) {
            Self::Utf8
        } else if ptr::eq(encoding, encoding_rs::WINDOWS_1252) {
            Self::Windows1252
        } else if ptr::eq(encoding, encoding_rs::SHIFT_JIS) {
            Self::ShiftJis
        } else if ptr::eq(encoding, encoding_rs::GBK) || ptr::eq(encoding, encoding_rs::GB18030) {
            Self::Gb2312
        } else if ptr::eq(encoding, encoding_rs::BIG5) {
            Self::Big5
        } else {
            Self::Other(encoding.name().to_string())
        }
    }

    pub fn encoding(&self) -> &'static encoding_rs::Encoding {
        match self {
            Charset::Utf8 => encoding_rs::UTF_8,
            Charset::Windows1252 => encoding_rs::WINDOWS_1252,
            Charset::ShiftJis => encoding_rs::SHIFT_JIS,
            Charset::Gb2312 => encoding_rs::GBK,
            Charset::Big5 => encoding_rs::BIG5,
            Charset::Other(name) => {
                encoding_rs::Encoding::for_label(name.as_bytes()).unwrap_or(encoding_rs::UTF_8)
            }
        }
    }
}

/// A fetched HTML page, owned by the single extraction that requested it.
///
/// `url_final` is the URL after redirects and serves as the base URL for
/// resolving relative links found in the markup.
#[derive(Debug)]
pub struct RawDocument {
    pub url_final: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub html: String,
    pub charset: Charset,
    pub fetched_at: DateTime<Utc>,
}

impl RawDocument {
    /// Wrap already-decoded HTML, e.g. from a file or a test fixture.
    pub fn from_html(url: Url, html: impl Into<String>) -> Self {
        Self {
            url_final: url,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            html: html.into(),
            charset: Charset::Utf8,
            fetched_at: Utc::now(),
        }
    }
}

/// Something that can turn a URL into a [`RawDocument`].
///
/// [`crate::fetcher::Fetcher`] is the production implementation; tests plug
/// in canned sources to drive the pipeline without a network.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &Url, cancel: &CancellationToken)
    -> Result<RawDocument, FetchError>;
}
