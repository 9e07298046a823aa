//! Fetch images from paths or URLs and re-encode them into one target format.
//!
//! [`Pipeline::run`] drives one batch: each item is resolved, guarded,
//! converted and turned into an [`OutputRecord`] independently of the others.

pub mod config;
pub mod convert;
pub mod error;
pub mod format;
pub mod host;
pub mod options;
pub mod output;
pub mod pipeline;
pub mod processor;
pub mod source;

#[cfg(test)]
mod test_helpers;

pub use config::{BatchSettings, ConfigStore, JsonFileConfigStore, MemoryConfigStore};
pub use error::{CodecError, ConfigError, EncodeError, FetchError, NotAnImageError, ProcessingError};
pub use format::OutputFormat;
pub use host::{FileReader, HostLogger, HttpClient, HttpResponse, LogLogger, ReqwestClient, TokioFs};
pub use output::{Output, OutputRecord};
pub use pipeline::Pipeline;
