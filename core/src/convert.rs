use std::sync::Arc;

use crate::error::{CodecError, EncodeError};
use crate::host::HostLogger;
use crate::options::{InputOptions, OutputOptions};
use crate::processor::ImageProcessor;

/// Run one encode for `item` on the blocking pool. Codec failures and panics
/// are logged and returned as [`EncodeError`]; they never escape this call.
pub async fn encode<L: HostLogger>(
    item: &str,
    raw: Arc<[u8]>,
    processor: &'static dyn ImageProcessor,
    output: Option<OutputOptions>,
    input: Option<InputOptions>,
    log: &L,
) -> Result<Vec<u8>, EncodeError> {
    let format = processor.format();
    let result = tokio::task::spawn_blocking(move || {
        processor.process(&raw, output.as_ref(), input.as_ref())
    })
    .await
    .map_err(|e| CodecError::Task(e.to_string()))
    .and_then(|r| r);

    match result {
        Ok(buffer) => {
            log.success(&format!("{} convert to {} successful", item, format));
            log::debug!("{}: {} bytes as {}", item, buffer.len(), format);
            Ok(buffer)
        }
        Err(source) => {
            log.error(&format!("can't convert file {}", item));
            Err(EncodeError {
                item: item.to_string(),
                format,
                source,
            })
        }
    }
}
