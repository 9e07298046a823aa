use image::codecs::avif::AvifEncoder;
use image::DynamicImage;

use crate::error::CodecError;
use crate::format::OutputFormat;
use crate::options::{AvifOptions, InputOptions, OutputOptions};
use crate::processor::{load, ImageProcessor};

pub struct AvifProcessor;

impl ImageProcessor for AvifProcessor {
    fn format(&self) -> OutputFormat {
        OutputFormat::Avif
    }

    fn process(
        &self,
        input: &[u8],
        output: Option<&OutputOptions>,
        input_options: Option<&InputOptions>,
    ) -> Result<Vec<u8>, CodecError> {
        let options = match output {
            Some(OutputOptions::Avif(o)) => o.clone(),
            _ => AvifOptions::default(),
        };
        let img = load(input, input_options)?;

        // Encoder accepts 8-bit RGB(A) only
        let img = if img.color().has_alpha() {
            DynamicImage::ImageRgba8(img.to_rgba8())
        } else {
            DynamicImage::ImageRgb8(img.to_rgb8())
        };

        let mut out = Vec::new();
        let encoder = AvifEncoder::new_with_speed_quality(
            &mut out,
            options.speed.clamp(1, 10) as u8,
            options.quality.clamp(1, 100) as u8,
        );
        img.write_with_encoder(encoder)
            .map_err(|e| CodecError::Encode(format!("failed to encode AVIF: {}", e)))?;

        Ok(out)
    }
}
