use crate::error::CodecError;
use crate::format::OutputFormat;
use crate::options::{InputOptions, OutputOptions, WebpOptions};
use crate::processor::{load, ImageProcessor};

pub struct WebpProcessor;

impl ImageProcessor for WebpProcessor {
    fn format(&self) -> OutputFormat {
        OutputFormat::Webp
    }

    fn process(
        &self,
        input: &[u8],
        output: Option<&OutputOptions>,
        input_options: Option<&InputOptions>,
    ) -> Result<Vec<u8>, CodecError> {
        let options = match output {
            Some(OutputOptions::Webp(o)) => o.clone(),
            _ => WebpOptions::default(),
        };
        let img = load(input, input_options)?;
        let (width, height) = (img.width(), img.height());

        let quality = options.quality.clamp(0.0, 100.0);
        let encoded = if img.color().has_alpha() {
            let rgba = img.to_rgba8();
            webp::Encoder::from_rgba(rgba.as_raw(), width, height).encode_simple(options.lossless, quality)
        } else {
            let rgb = img.to_rgb8();
            webp::Encoder::from_rgb(rgb.as_raw(), width, height).encode_simple(options.lossless, quality)
        };
        let encoded = encoded.map_err(|e| CodecError::Encode(format!("failed to encode WebP: {:?}", e)))?;

        Ok(encoded.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::png_bytes;

    fn riff_fourcc(out: &[u8]) -> &[u8] {
        &out[12..16]
    }

    #[test]
    fn lossy_by_default() {
        let out = WebpProcessor.process(&png_bytes(32, 32), None, None).unwrap();
        assert_eq!(&out[..4], b"RIFF");
        assert_eq!(&out[8..12], b"WEBP");
        assert_eq!(riff_fourcc(&out), b"VP8 ");
    }

    #[test]
    fn lossless_option_selects_vp8l() {
        let options = OutputOptions::Webp(WebpOptions {
            quality: 80.0,
            lossless: true,
        });
        let out = WebpProcessor
            .process(&png_bytes(32, 32), Some(&options), None)
            .unwrap();
        assert_eq!(riff_fourcc(&out), b"VP8L");
    }
}
