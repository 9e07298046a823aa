use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

use crate::error::CodecError;
use crate::format::OutputFormat;
use crate::options::{InputOptions, JpegOptions, OutputOptions};
use crate::processor::{load, ImageProcessor};

pub struct JpegProcessor;

impl ImageProcessor for JpegProcessor {
    fn format(&self) -> OutputFormat {
        OutputFormat::Jpeg
    }

    fn process(
        &self,
        input: &[u8],
        output: Option<&OutputOptions>,
        input_options: Option<&InputOptions>,
    ) -> Result<Vec<u8>, CodecError> {
        let options = match output {
            Some(OutputOptions::Jpeg(o)) => o.clone(),
            _ => JpegOptions::default(),
        };
        let img = load(input, input_options)?;

        // JPEG has no alpha channel
        let rgb = img.to_rgb8();
        let quality = options.quality.clamp(1, 100) as u8;

        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, quality)
            .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
            .map_err(|e| CodecError::Encode(format!("failed to encode JPEG: {}", e)))?;

        log::debug!("jpeg: {} bytes at quality {}", out.len(), quality);
        Ok(out)
    }
}
