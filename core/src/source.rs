use std::path::Path;

use reqwest::header::{HeaderMap, CONTENT_TYPE};

use crate::error::{FetchError, NotAnImageError, ProcessingError};
use crate::host::{FileReader, HostLogger, HttpClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Remote,
    Local,
}

impl SourceKind {
    /// `http://` or `https://` at the very start means remote; the prefix
    /// match is case-sensitive.
    pub fn classify(item: &str) -> Self {
        if item.starts_with("http://") || item.starts_with("https://") {
            SourceKind::Remote
        } else {
            SourceKind::Local
        }
    }
}

/// Reject responses whose content type does not mention `image`. A missing
/// header is rejected too.
pub fn assert_image(url: &str, headers: &HeaderMap) -> Result<(), NotAnImageError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

    match content_type {
        Some(ct) if ct.contains("image") => Ok(()),
        content_type => Err(NotAnImageError {
            url: url.to_string(),
            content_type,
        }),
    }
}

/// Obtain the raw bytes behind `item`.
pub async fn resolve<H, F, L>(item: &str, http: &H, fs: &F, log: &L) -> Result<Vec<u8>, ProcessingError>
where
    H: HttpClient,
    F: FileReader,
    L: HostLogger,
{
    match SourceKind::classify(item) {
        SourceKind::Local => Ok(fs.read(Path::new(item)).await?),
        SourceKind::Remote => {
            let response = http.get(item).await?;
            if !response.status.is_success() {
                return Err(FetchError::Status {
                    url: item.to_string(),
                    status: response.status,
                }
                .into());
            }
            if let Err(err) = assert_image(item, &response.headers) {
                log.error(&format!(
                    "ContentType header of request from url: {} is {}, is not an image contentType.",
                    item,
                    err.content_type.as_deref().unwrap_or("<missing>")
                ));
                return Err(err.into());
            }
            Ok(response.body)
        }
    }
}
