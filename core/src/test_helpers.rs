//! Fakes and fixtures shared by the unit tests.
//!
//! Images are generated in memory, collaborators are backed by maps, and the
//! logger records every line so tests can assert on warnings.

use std::collections::HashMap;
use std::future::{ready, Future};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use image::{ImageFormat, Rgb, RgbImage};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;

use crate::error::FetchError;
use crate::host::{FileReader, HostLogger, HttpClient, HttpResponse};

/// Gradient image encoded as `format`.
pub fn image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), format).unwrap();
    out
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    image_bytes(width, height, ImageFormat::Png)
}

pub fn response(status: StatusCode, content_type: Option<&'static str>, body: Vec<u8>) -> HttpResponse {
    let mut headers = HeaderMap::new();
    if let Some(ct) = content_type {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(ct));
    }
    HttpResponse {
        status,
        headers,
        body,
    }
}

/// Serves canned responses; unknown URLs get a 404.
#[derive(Default)]
pub struct FakeHttp {
    responses: HashMap<String, HttpResponse>,
    pub requested: Mutex<Vec<String>>,
}

impl FakeHttp {
    pub fn with(mut self, url: &str, response: HttpResponse) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl HttpClient for FakeHttp {
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse, FetchError>> + Send {
        self.requested.lock().unwrap().push(url.to_string());
        let result = self.responses.get(url).cloned().ok_or(FetchError::Status {
            url: url.to_string(),
            status: StatusCode::NOT_FOUND,
        });
        ready(result)
    }
}

#[derive(Default)]
pub struct FakeFs {
    files: HashMap<PathBuf, Vec<u8>>,
    pub requested: Mutex<Vec<PathBuf>>,
}

impl FakeFs {
    pub fn with(mut self, path: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(PathBuf::from(path), bytes);
        self
    }

    pub fn requested(&self) -> Vec<PathBuf> {
        self.requested.lock().unwrap().clone()
    }
}

impl FileReader for FakeFs {
    fn read(&self, path: &Path) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send {
        self.requested.lock().unwrap().push(path.to_path_buf());
        let result = self.files.get(path).cloned().ok_or_else(|| FetchError::ReadFile {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
        ready(result)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warn,
    Error,
}

#[derive(Default)]
pub struct RecordingLogger {
    lines: Mutex<Vec<(Level, String)>>,
}

impl RecordingLogger {
    pub fn lines(&self, level: Level) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, level: Level, msg: &str) {
        self.lines.lock().unwrap().push((level, msg.to_string()));
    }
}

impl HostLogger for RecordingLogger {
    fn info(&self, msg: &str) {
        self.push(Level::Info, msg);
    }

    fn success(&self, msg: &str) {
        self.push(Level::Success, msg);
    }

    fn warn(&self, msg: &str) {
        self.push(Level::Warn, msg);
    }

    fn error(&self, msg: &str) {
        self.push(Level::Error, msg);
    }
}
