use flate2::read::GzDecoder;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid sitemap URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request to {url} failed: {source}")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("error downloading the sitemap from {url}: HTTP {status}")]
    Status {
        url: Url,
        status: reqwest::StatusCode,
    },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where the sitemap comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapSource {
    Remote(Url),
    Local(PathBuf),
}

impl SitemapSource {
    pub fn parse(location: &str) -> Result<Self, FetchError> {
        let location = location.trim();
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(location).map_err(|source| FetchError::InvalidUrl {
                url: location.to_string(),
                source,
            })?;
            Ok(Self::Remote(url))
        } else {
            Ok(Self::Local(PathBuf::from(location)))
        }
    }
}

impl std::fmt::Display for SitemapSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{url}"),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Fetch the raw sitemap, undoing a gzip wrapper when there is one.
pub fn fetch_sitemap(source: &SitemapSource, timeout: Duration) -> Result<Vec<u8>, FetchError> {
    let start_time = Instant::now();
    info!(action = "start", component = "sitemap_fetch", source = %source, "Downloading sitemap");

    let raw = match source {
        SitemapSource::Remote(url) => download(url, timeout)?,
        SitemapSource::Local(path) => fs::read(path).map_err(|source| FetchError::Read {
            path: path.clone(),
            source,
        })?,
    };

    let content = decompress_if_gzipped(raw);
    info!(
        action = "complete",
        component = "sitemap_fetch",
        byte_count = content.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Sitemap fetched"
    );
    Ok(content)
}

fn download(url: &Url, timeout: Duration) -> Result<Vec<u8>, FetchError> {
    let request_error = |source| FetchError::Request {
        url: url.clone(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(request_error)?;

    let response = client.get(url.clone()).send().map_err(request_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.clone(),
            status,
        });
    }

    let body = response.bytes().map_err(request_error)?;
    Ok(body.to_vec())
}

/// Returns the gunzipped payload, or the input unchanged when it is not
/// gzip or does not decode cleanly.
pub fn decompress_if_gzipped(raw: Vec<u8>) -> Vec<u8> {
    if !raw.starts_with(&GZIP_MAGIC) {
        info!(action = "decompress", component = "sitemap_fetch", compressed = false, "Content is not gzip, using it as-is");
        return raw;
    }

    let mut decoded = Vec::with_capacity(raw.len() * 4);
    match GzDecoder::new(raw.as_slice()).read_to_end(&mut decoded) {
        Ok(_) => {
            info!(
                action = "decompress",
                component = "sitemap_fetch",
                compressed = true,
                compressed_bytes = raw.len(),
                decompressed_bytes = decoded.len(),
                "Gzip content decompressed"
            );
            decoded
        }
        Err(e) => {
            warn!(action = "decompress", component = "sitemap_fetch", error = %e, "Gzip magic present but decoding failed, using raw content");
            raw
        }
    }
}
