//! Collaborators the pipeline consumes from its host: an HTTP client, a file
//! reader and a logger. Each comes with a default implementation.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use crate::error::FetchError;

const USER_AGENT: &str = concat!("pic-convert/", env!("CARGO_PKG_VERSION"));

/// Response to a GET, with the body read as raw bytes.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

pub trait HttpClient {
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse, FetchError>> + Send;
}

pub trait FileReader {
    fn read(&self, path: &Path) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// Host log sink. Every call takes one preformatted line.
pub trait HostLogger {
    fn info(&self, msg: &str);
    fn success(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse, FetchError>> + Send {
        let request = self.client.get(url);
        let url = url.to_string();
        async move {
            let response = request.send().await.map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response
                .bytes()
                .await
                .map_err(|source| FetchError::Request { url, source })?;
            Ok(HttpResponse {
                status,
                headers,
                body: body.to_vec(),
            })
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

impl FileReader for TokioFs {
    fn read(&self, path: &Path) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send {
        let path: PathBuf = path.to_path_buf();
        async move {
            tokio::fs::read(&path)
                .await
                .map_err(|source| FetchError::ReadFile { path, source })
        }
    }
}

/// Forwards host log calls to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLogger;

impl HostLogger for LogLogger {
    fn info(&self, msg: &str) {
        log::info!("{}", msg);
    }

    fn success(&self, msg: &str) {
        log::info!("✔ {}", msg);
    }

    fn warn(&self, msg: &str) {
        log::warn!("{}", msg);
    }

    fn error(&self, msg: &str) {
        log::error!("{}", msg);
    }
}
