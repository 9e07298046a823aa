use std::path::Path;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use crate::error::{CodecError, ProcessingError};
use crate::format::OutputFormat;
use crate::host::HostLogger;
use crate::processor::measure_dimensions;

/// One converted image handed back to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    #[serde(skip)]
    pub buffer: Vec<u8>,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub extname: String,
}

/// Per-run, append-only collection of records.
#[derive(Debug, Default)]
pub struct Output {
    records: Mutex<Vec<OutputRecord>>,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, record: OutputRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_records(self) -> Vec<OutputRecord> {
        self.records.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

/// File name of `item` without query string or extension.
///
/// `https://site/a/photo.JPG?x=1` gives `photo`.
pub fn real_base_name(item: &str) -> String {
    let without_query = item.split('?').next().unwrap_or(item);
    Path::new(without_query)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Keep the original when the re-encode came out larger.
pub fn choose_buffer<L: HostLogger>(raw: Vec<u8>, transformed: Vec<u8>, log: &L) -> Vec<u8> {
    if raw.len() < transformed.len() {
        log.warn(&format!(
            "transformed pic is larger than original ({} > {} bytes), keeping original",
            transformed.len(),
            raw.len()
        ));
        raw
    } else {
        transformed
    }
}

/// Build the record for `item`. Dimensions always come from `raw`.
pub fn select<L: HostLogger>(
    item: &str,
    format: OutputFormat,
    raw: Vec<u8>,
    transformed: Vec<u8>,
    log: &L,
) -> Result<OutputRecord, ProcessingError> {
    let extname = format.extname();
    let file_name = format!("{}{}", real_base_name(item), extname);
    let (width, height) = measure_dimensions(&raw).map_err(|source: CodecError| ProcessingError::Measure {
        item: item.to_string(),
        source,
    })?;

    Ok(OutputRecord {
        buffer: choose_buffer(raw, transformed, log),
        file_name,
        width,
        height,
        extname,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{png_bytes, Level, RecordingLogger};

    #[test]
    fn base_name_strips_query_and_extension() {
        assert_eq!(real_base_name("https://site/a/photo.JPG?x=1"), "photo");
        assert_eq!(real_base_name("/home/me/pics/cat.png"), "cat");
        assert_eq!(real_base_name("relative/archive.tar.gz"), "archive.tar");
        assert_eq!(real_base_name("noext"), "noext");
        assert_eq!(real_base_name("https://site/img?a=1?b=2"), "img");
    }

    #[test]
    fn larger_transform_keeps_original_and_warns() {
        let log = RecordingLogger::default();
        let raw = vec![1u8; 1000];
        let transformed = vec![2u8; 1200];

        let chosen = choose_buffer(raw.clone(), transformed, &log);

        assert_eq!(chosen, raw);
        assert_eq!(log.lines(Level::Warn).len(), 1);
    }

    #[test]
    fn smaller_transform_is_emitted_silently() {
        let log = RecordingLogger::default();
        let transformed = vec![2u8; 800];

        let chosen = choose_buffer(vec![1u8; 1000], transformed.clone(), &log);

        assert_eq!(chosen, transformed);
        assert!(log.lines(Level::Warn).is_empty());
    }

    #[test]
    fn equal_sizes_emit_transformed() {
        let log = RecordingLogger::default();
        let chosen = choose_buffer(vec![1u8; 10], vec![2u8; 10], &log);
        assert_eq!(chosen, vec![2u8; 10]);
    }

    #[test]
    fn record_uses_original_dimensions_and_target_extension() {
        let log = RecordingLogger::default();
        let raw = png_bytes(30, 20);
        // Transformed bytes are never measured.
        let transformed = vec![0u8; 4];

        let record = select("https://site/a/photo.JPG?x=1", OutputFormat::Webp, raw, transformed.clone(), &log)
            .unwrap();

        assert_eq!(record.file_name, "photo.webp");
        assert_eq!(record.extname, ".webp");
        assert_eq!((record.width, record.height), (30, 20));
        assert_eq!(record.buffer, transformed);
    }

    #[test]
    fn guarded_record_keeps_target_name() {
        let log = RecordingLogger::default();
        let raw = png_bytes(4, 4);
        let transformed = vec![0u8; raw.len() + 1];

        let record = select("small.png", OutputFormat::Avif, raw.clone(), transformed, &log).unwrap();

        assert_eq!(record.buffer, raw);
        assert_eq!(record.file_name, "small.avif");
        assert_eq!(log.lines(Level::Warn).len(), 1);
    }

    #[test]
    fn unmeasurable_original_is_a_measure_error() {
        let log = RecordingLogger::default();
        let err = select("x.png", OutputFormat::Png, vec![0u8; 3], vec![0u8; 2], &log).unwrap_err();
        assert_eq!(err.stage(), "measure");
    }
}
