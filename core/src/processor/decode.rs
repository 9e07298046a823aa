use std::io::Cursor;

use image::{DynamicImage, ImageReader, RgbaImage};
use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

use crate::error::CodecError;
use crate::options::InputOptions;

/// HEIF-family inputs (HEIC, HEIF, AVIF) go through libheif; the image
/// crate handles everything else.
fn is_heif_family(raw: &[u8]) -> bool {
    matches!(
        infer::get(raw).map(|kind| kind.mime_type()),
        Some("image/heif" | "image/heif-sequence" | "image/heic" | "image/avif")
    )
}

/// Width and height read from the header, without a full decode.
pub fn measure_dimensions(raw: &[u8]) -> Result<(u32, u32), CodecError> {
    if is_heif_family(raw) {
        let ctx = HeifContext::read_from_bytes(raw).map_err(|e| CodecError::Decode(e.to_string()))?;
        let handle = ctx
            .primary_image_handle()
            .map_err(|e| CodecError::Decode(e.to_string()))?;
        return Ok((handle.width(), handle.height()));
    }

    ImageReader::new(Cursor::new(raw))
        .with_guessed_format()
        .map_err(|e| CodecError::Decode(format!("unrecognized image format: {}", e)))?
        .into_dimensions()
        .map_err(|e| CodecError::Decode(format!("unreadable image header: {}", e)))
}

fn check_pixel_limit(width: u32, height: u32, options: &InputOptions) -> Result<(), CodecError> {
    if options.limit_input_pixels == 0 {
        return Ok(());
    }
    let pixels = u64::from(width) * u64::from(height);
    if pixels > options.limit_input_pixels {
        return Err(CodecError::Limits(format!(
            "{}x{} = {} pixels (limit: {})",
            width, height, pixels, options.limit_input_pixels
        )));
    }
    Ok(())
}

/// Decode `raw` honouring the input options. Header dimensions are checked
/// against the pixel limit before any pixel data is decoded.
pub fn decode(raw: &[u8], options: &InputOptions) -> Result<DynamicImage, CodecError> {
    let (width, height) = measure_dimensions(raw)?;
    check_pixel_limit(width, height, options)?;

    let img = if is_heif_family(raw) {
        decode_heif(raw)?
    } else {
        let mut reader = ImageReader::new(Cursor::new(raw))
            .with_guessed_format()
            .map_err(|e| CodecError::Decode(e.to_string()))?;
        if options.unlimited {
            reader.no_limits();
        }
        reader
            .decode()
            .map_err(|e| CodecError::Decode(e.to_string()))?
    };

    log::debug!("decoded input: {}x{} {:?}", img.width(), img.height(), img.color());
    Ok(img)
}

fn decode_heif(raw: &[u8]) -> Result<DynamicImage, CodecError> {
    let lib_heif = LibHeif::new_checked().map_err(|e| CodecError::Decode(format!("failed to init libheif: {}", e)))?;
    let ctx = HeifContext::read_from_bytes(raw).map_err(|e| CodecError::Decode(e.to_string()))?;
    let handle = ctx
        .primary_image_handle()
        .map_err(|e| CodecError::Decode(e.to_string()))?;

    let image = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgba), None)
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    let planes = image.planes();
    let plane = planes
        .interleaved
        .ok_or_else(|| CodecError::Decode("interleaved plane not found in heif image".into()))?;

    // Rows may be padded beyond width * 4.
    let row_len = plane.width as usize * 4;
    let mut pixels = Vec::with_capacity(row_len * plane.height as usize);
    for row in plane.data.chunks(plane.stride).take(plane.height as usize) {
        let row = row
            .get(..row_len)
            .ok_or_else(|| CodecError::Decode("truncated heif plane".into()))?;
        pixels.extend_from_slice(row);
    }

    RgbaImage::from_raw(plane.width, plane.height, pixels)
        .map(DynamicImage::ImageRgba8)
        .ok_or_else(|| CodecError::Decode("heif plane size mismatch".into()))
}
