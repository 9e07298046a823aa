use libheif_rs::{Channel, ColorSpace, CompressionFormat, EncoderQuality, HeifContext, Image, LibHeif, RgbChroma};

use crate::error::CodecError;
use crate::format::OutputFormat;
use crate::options::{HeifOptions, InputOptions, OutputOptions};
use crate::processor::{load, ImageProcessor};

pub struct HeifProcessor;

impl ImageProcessor for HeifProcessor {
    fn format(&self) -> OutputFormat {
        OutputFormat::Heif
    }

    fn process(
        &self,
        input: &[u8],
        output: Option<&OutputOptions>,
        input_options: Option<&InputOptions>,
    ) -> Result<Vec<u8>, CodecError> {
        let options = match output {
            Some(OutputOptions::Heif(o)) => o.clone(),
            _ => HeifOptions::default(),
        };
        let img = load(input, input_options)?;
        let (width, height) = (img.width(), img.height());

        let (chroma, channels, pixels) = if img.color().has_alpha() {
            (RgbChroma::Rgba, 4, img.to_rgba8().into_raw())
        } else {
            (RgbChroma::Rgb, 3, img.to_rgb8().into_raw())
        };

        let heif_err = |e: libheif_rs::HeifError| CodecError::Encode(format!("failed to encode HEIF: {}", e));

        let mut image = Image::new(width, height, ColorSpace::Rgb(chroma)).map_err(heif_err)?;
        image
            .create_plane(Channel::Interleaved, width, height, 8)
            .map_err(heif_err)?;
        {
            let planes = image.planes_mut();
            let plane = planes
                .interleaved
                .ok_or_else(|| CodecError::Encode("interleaved plane not allocated".into()))?;
            let row_len = width as usize * channels;
            for (dst, src) in plane.data.chunks_mut(plane.stride).zip(pixels.chunks(row_len)) {
                dst[..row_len].copy_from_slice(src);
            }
        }

        let lib_heif = LibHeif::new_checked().map_err(heif_err)?;
        let mut encoder = lib_heif
            .encoder_for_format(CompressionFormat::Hevc)
            .map_err(heif_err)?;
        let quality = if options.lossless {
            EncoderQuality::LossLess
        } else {
            EncoderQuality::Lossy(options.quality.clamp(1, 100) as u8)
        };
        encoder.set_quality(quality).map_err(heif_err)?;

        let mut context = HeifContext::new().map_err(heif_err)?;
        context
            .encode_image(&image, &mut encoder, None)
            .map_err(heif_err)?;
        context.write_to_bytes().map_err(heif_err)
    }
}
