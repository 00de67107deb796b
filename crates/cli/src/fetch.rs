//! Reference page retrieval.
//!
//! `PageFetcher` is the seam between the pipeline and the network so runs
//! can be driven from canned pages in tests.

use std::fmt;
use std::io::Read;
use std::time::Duration;

pub const USER_AGENT: &str = concat!("skucheck/", env!("CARGO_PKG_VERSION"));

const MAX_RESPONSE_BYTES: u64 = 20 * 1024 * 1024; // 20 MB

#[derive(Debug)]
pub enum FetchError {
    /// Client could not be constructed.
    Client(String),
    /// Connection refused, DNS failure, timeout, broken body.
    Transport { url: String, message: String },
    /// Server answered with a non-2xx status.
    Status { url: String, status: u16 },
    /// Body exceeded the size cap.
    TooLarge { url: String, limit: u64 },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client(msg) => write!(f, "cannot build HTTP client: {msg}"),
            Self::Transport { url, message } => write!(f, "request to {url} failed: {message}"),
            Self::Status { url, status } => write!(f, "{url} returned HTTP {status}"),
            Self::TooLarge { url, limit } => {
                write!(f, "response from {url} exceeds {limit} bytes")
            }
        }
    }
}

impl std::error::Error for FetchError {}

pub trait PageFetcher {
    /// Fetch `url` and return the body as text.
    fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

/// Plain GET over `reqwest::blocking`, no auth, bounded timeout.
pub struct HttpFetcher {
    http: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { http })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let resp = self.http.get(url).send().map_err(|e| transport(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if resp.content_length().is_some_and(|len| len > MAX_RESPONSE_BYTES) {
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                limit: MAX_RESPONSE_BYTES,
            });
        }

        // Read one byte past the cap so an oversized chunked body is detected
        let mut bytes = Vec::new();
        resp.take(MAX_RESPONSE_BYTES + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| transport(url, e))?;
        if bytes.len() as u64 > MAX_RESPONSE_BYTES {
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                limit: MAX_RESPONSE_BYTES,
            });
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn transport(url: &str, e: impl fmt::Display) -> FetchError {
    FetchError::Transport {
        url: url.to_string(),
        message: e.to_string(),
    }
}
