use image::codecs::gif::GifEncoder;
use image::Frame;

use crate::error::CodecError;
use crate::format::OutputFormat;
use crate::options::{GifOptions, InputOptions, OutputOptions};
use crate::processor::{load, ImageProcessor};

pub struct GifProcessor;

impl ImageProcessor for GifProcessor {
    fn format(&self) -> OutputFormat {
        OutputFormat::Gif
    }

    fn process(
        &self,
        input: &[u8],
        output: Option<&OutputOptions>,
        input_options: Option<&InputOptions>,
    ) -> Result<Vec<u8>, CodecError> {
        let options = match output {
            Some(OutputOptions::Gif(o)) => o.clone(),
            _ => GifOptions::default(),
        };
        let img = load(input, input_options)?;

        let mut out = Vec::new();
        {
            // The trailer is written when the encoder drops.
            let mut encoder = GifEncoder::new_with_speed(&mut out, options.speed.clamp(1, 30) as i32);
            encoder
                .encode_frame(Frame::new(img.to_rgba8()))
                .map_err(|e| CodecError::Encode(format!("failed to encode GIF: {}", e)))?;
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::png_bytes;

    #[test]
    fn writes_complete_gif() {
        let out = GifProcessor
            .process(&png_bytes(10, 6), Some(&OutputOptions::Gif(GifOptions { speed: 30 })), None)
            .unwrap();
        assert_eq!(&out[..6], b"GIF89a");
        assert_eq!(out.last(), Some(&0x3B));
    }
}
