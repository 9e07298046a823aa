use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use pic_convert_core::source::SourceKind;
use pic_convert_core::OutputRecord;

use crate::error::CliError;

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "bmp", "tif", "tiff", "avif", "heic", "heif",
];

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Expand the command-line inputs into pipeline items.
/// URLs and plain paths pass through untouched; directories are replaced by
/// the image files inside them (one level unless `recursive`).
pub fn collect_inputs(inputs: &[String], recursive: bool) -> Result<Vec<String>, CliError> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut items = Vec::new();

    for input in inputs {
        let path = Path::new(input);
        if SourceKind::classify(input) == SourceKind::Remote || !path.is_dir() {
            items.push(input.clone());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(path).max_depth(max_depth) {
            let entry = entry?;
            if entry.file_type().is_file() && is_image_path(entry.path()) {
                found.push(entry.path().to_string_lossy().into_owned());
            }
        }
        found.sort();
        items.extend(found);
    }

    Ok(items)
}

/// Write every record as `out_dir/<fileName>`, creating the directory.
pub fn write_records(out_dir: &Path, records: &[OutputRecord]) -> Result<Vec<PathBuf>, CliError> {
    records
        .iter()
        .map(|record| {
            let path = out_dir.join(&record.file_name);
            write_file(&path, &record.buffer)?;
            Ok(path)
        })
        .collect()
}

/// Write file contents, creating parent directories as needed.
pub fn write_file(path: &Path, data: &[u8]) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CliError::WriteFile {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(path, data).map_err(|e| CliError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}
