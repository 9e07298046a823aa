use std::io::Cursor;

use image::DynamicImage;

use crate::error::CodecError;
use crate::format::OutputFormat;
use crate::options::{InputOptions, OutputOptions, PngOptions};
use crate::processor::{load, ImageProcessor};

pub struct PngProcessor;

impl ImageProcessor for PngProcessor {
    fn format(&self) -> OutputFormat {
        OutputFormat::Png
    }

    fn process(
        &self,
        input: &[u8],
        output: Option<&OutputOptions>,
        input_options: Option<&InputOptions>,
    ) -> Result<Vec<u8>, CodecError> {
        let options = match output {
            Some(OutputOptions::Png(o)) => o.clone(),
            _ => PngOptions::default(),
        };
        let img = load(input, input_options)?;

        let png = if options.palette {
            quantize_png(&img, &options)?
        } else {
            encode_truecolor(&img)?
        };
        optimize_lossless(&png, options.compression_level.clamp(0, 6) as u8)
    }
}

fn encode_truecolor(img: &DynamicImage) -> Result<Vec<u8>, CodecError> {
    let mut output = Vec::new();
    img.write_to(&mut Cursor::new(&mut output), image::ImageFormat::Png)
        .map_err(|e| CodecError::Encode(format!("failed to encode PNG: {}", e)))?;
    Ok(output)
}

/// Quantize colors, then encode as an indexed palette PNG
fn quantize_png(img: &DynamicImage, options: &PngOptions) -> Result<Vec<u8>, CodecError> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels: Vec<imagequant::RGBA> = rgba
        .pixels()
        .map(|p| imagequant::RGBA::new(p[0], p[1], p[2], p[3]))
        .collect();

    let mut attr = imagequant::new();
    attr.set_quality(0, options.quality.clamp(0, 100) as u8)
        .map_err(|e| CodecError::Quantize(e.to_string()))?;
    attr.set_speed(options.effort.clamp(1, 10) as i32)
        .map_err(|e| CodecError::Quantize(e.to_string()))?;

    let mut image = attr
        .new_image_borrowed(&pixels, width as usize, height as usize, 0.0)
        .map_err(|e| CodecError::Quantize(e.to_string()))?;
    let mut quantization = attr
        .quantize(&mut image)
        .map_err(|e| CodecError::Quantize(e.to_string()))?;
    let (palette, indices) = quantization
        .remapped(&mut image)
        .map_err(|e| CodecError::Quantize(e.to_string()))?;

    let lodepng_palette: Vec<lodepng::RGBA> = palette
        .iter()
        .map(|c| lodepng::RGBA {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        })
        .collect();

    let mut encoder = lodepng::Encoder::new();
    encoder.set_auto_convert(false);
    encoder
        .set_palette(&lodepng_palette)
        .map_err(|e| CodecError::Encode(e.to_string()))?;
    {
        let raw = encoder.info_raw_mut();
        raw.set_colortype(lodepng::ColorType::PALETTE);
        raw.set_bitdepth(8);
        raw.palette_clear();
        for &color in &lodepng_palette {
            raw.palette_add(color)
                .map_err(|e| CodecError::Encode(e.to_string()))?;
        }
    }

    log::debug!("png: quantized to {} colors", lodepng_palette.len());
    encoder
        .encode(&indices, width as usize, height as usize)
        .map_err(|e| CodecError::Encode(e.to_string()))
}

/// Lossless DEFLATE re-compression via oxipng; safe-to-strip chunks are dropped.
fn optimize_lossless(png_data: &[u8], level: u8) -> Result<Vec<u8>, CodecError> {
    let mut opts = oxipng::Options::from_preset(level);
    opts.strip = oxipng::StripChunks::Safe;

    oxipng::optimize_from_memory(png_data, &opts).map_err(|e| CodecError::Optimize(e.to_string()))
}
