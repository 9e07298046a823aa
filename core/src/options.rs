//! Per-format option bags read from the codec namespace of the configuration.
//!
//! `InputOptions` shapes decoding and is shared by every format. Output
//! options are format specific; `OutputOptionsMap` holds at most one bag per
//! format and `OutputOptions` is the bag selected for a run. Missing fields
//! fall back to the defaults documented on each struct.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::format::OutputFormat;

/// Default pixel ceiling for decoded inputs (0x3FFF x 0x3FFF).
pub const DEFAULT_LIMIT_INPUT_PIXELS: u64 = 0x3FFF * 0x3FFF;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputOptions {
    /// Reject inputs whose width x height exceeds this. `0` disables the check.
    pub limit_input_pixels: u64,
    /// Lift the decoder's allocation limits.
    pub unlimited: bool,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            limit_input_pixels: DEFAULT_LIMIT_INPUT_PIXELS,
            unlimited: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JpegOptions {
    /// 1-100
    pub quality: i64,
}

impl Default for JpegOptions {
    fn default() -> Self {
        Self { quality: 80 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PngOptions {
    /// oxipng preset 0-6 (higher = slower, smaller)
    pub compression_level: i64,
    /// Quantize to an indexed palette before optimizing
    pub palette: bool,
    /// Palette quantization quality 0-100
    pub quality: i64,
    /// Palette quantization effort 1-10 (1 = slowest/best)
    pub effort: i64,
}

impl Default for PngOptions {
    fn default() -> Self {
        Self {
            compression_level: 2,
            palette: false,
            quality: 100,
            effort: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GifOptions {
    /// NeuQuant speed 1-30 (1 = best palette)
    pub speed: i64,
}

impl Default for GifOptions {
    fn default() -> Self {
        Self { speed: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebpOptions {
    /// 0-100, ignored when lossless
    pub quality: f32,
    pub lossless: bool,
}

impl Default for WebpOptions {
    fn default() -> Self {
        Self {
            quality: 80.0,
            lossless: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AvifOptions {
    /// 1-100
    pub quality: i64,
    /// 1-10 (1 = slowest/best)
    pub speed: i64,
}

impl Default for AvifOptions {
    fn default() -> Self {
        Self {
            quality: 50,
            speed: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeifOptions {
    /// 1-100, ignored when lossless
    pub quality: i64,
    pub lossless: bool,
}

impl Default for HeifOptions {
    fn default() -> Self {
        Self {
            quality: 50,
            lossless: false,
        }
    }
}

/// Output option bag for one format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutputOptions {
    Jpeg(JpegOptions),
    Png(PngOptions),
    Gif(GifOptions),
    Webp(WebpOptions),
    Avif(AvifOptions),
    Heif(HeifOptions),
}

impl OutputOptions {
    /// Deserialize the bag stored for `format`.
    pub fn from_value(format: OutputFormat, value: Value) -> serde_json::Result<Self> {
        Ok(match format {
            OutputFormat::Jpeg => OutputOptions::Jpeg(serde_json::from_value(value)?),
            OutputFormat::Png => OutputOptions::Png(serde_json::from_value(value)?),
            OutputFormat::Gif => OutputOptions::Gif(serde_json::from_value(value)?),
            OutputFormat::Webp => OutputOptions::Webp(serde_json::from_value(value)?),
            OutputFormat::Avif => OutputOptions::Avif(serde_json::from_value(value)?),
            OutputFormat::Heif => OutputOptions::Heif(serde_json::from_value(value)?),
        })
    }

    pub fn format(&self) -> OutputFormat {
        match self {
            OutputOptions::Jpeg(_) => OutputFormat::Jpeg,
            OutputOptions::Png(_) => OutputFormat::Png,
            OutputOptions::Gif(_) => OutputFormat::Gif,
            OutputOptions::Webp(_) => OutputFormat::Webp,
            OutputOptions::Avif(_) => OutputFormat::Avif,
            OutputOptions::Heif(_) => OutputFormat::Heif,
        }
    }
}

/// `outputOptions` of the codec namespace, one optional bag per format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptionsMap {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jpeg: Option<JpegOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub png: Option<PngOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gif: Option<GifOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webp: Option<WebpOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avif: Option<AvifOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heif: Option<HeifOptions>,
}

impl OutputOptionsMap {
    pub fn get(&self, format: OutputFormat) -> Option<OutputOptions> {
        match format {
            OutputFormat::Jpeg => self.jpeg.clone().map(OutputOptions::Jpeg),
            OutputFormat::Png => self.png.clone().map(OutputOptions::Png),
            OutputFormat::Gif => self.gif.clone().map(OutputOptions::Gif),
            OutputFormat::Webp => self.webp.clone().map(OutputOptions::Webp),
            OutputFormat::Avif => self.avif.clone().map(OutputOptions::Avif),
            OutputFormat::Heif => self.heif.clone().map(OutputOptions::Heif),
        }
    }
}
