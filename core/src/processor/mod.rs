//! Format dispatch. Every [`OutputFormat`] maps to exactly one processor,
//! fixed at compile time.

pub mod avif;
pub mod decode;
pub mod gif;
pub mod heif;
pub mod jpeg;
pub mod png;
pub mod webp;

use crate::error::CodecError;
use crate::format::OutputFormat;
use crate::options::{InputOptions, OutputOptions};

pub use decode::measure_dimensions;

pub trait ImageProcessor: Send + Sync {
    fn format(&self) -> OutputFormat;

    /// Re-encode `input` into this processor's format. `None` options mean
    /// codec defaults.
    fn process(
        &self,
        input: &[u8],
        output: Option<&OutputOptions>,
        input_options: Option<&InputOptions>,
    ) -> Result<Vec<u8>, CodecError>;
}

pub fn dispatch(format: OutputFormat) -> &'static dyn ImageProcessor {
    match format {
        OutputFormat::Jpeg => &jpeg::JpegProcessor,
        OutputFormat::Png => &png::PngProcessor,
        OutputFormat::Gif => &gif::GifProcessor,
        OutputFormat::Webp => &webp::WebpProcessor,
        OutputFormat::Avif => &avif::AvifProcessor,
        OutputFormat::Heif => &heif::HeifProcessor,
    }
}

/// Decode with the given input options, or the defaults.
pub(crate) fn load(
    input: &[u8],
    input_options: Option<&InputOptions>,
) -> Result<image::DynamicImage, CodecError> {
    match input_options {
        Some(options) => decode::decode(input, options),
        None => decode::decode(input, &InputOptions::default()),
    }
}
