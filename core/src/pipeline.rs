use std::sync::Arc;

use futures_util::future::join_all;

use crate::config::{BatchSettings, ConfigStore};
use crate::convert;
use crate::error::ProcessingError;
use crate::host::{FileReader, HostLogger, HttpClient};
use crate::output::{self, Output, OutputRecord};
use crate::processor::{self, ImageProcessor};
use crate::source;

/// Batch orchestrator over the host's collaborators.
pub struct Pipeline<H, F, L> {
    http: H,
    fs: F,
    log: L,
}

impl<H, F, L> Pipeline<H, F, L>
where
    H: HttpClient,
    F: FileReader,
    L: HostLogger,
{
    pub fn new(http: H, fs: F, log: L) -> Self {
        Self { http, fs, log }
    }

    pub fn logger(&self) -> &L {
        &self.log
    }

    /// Convert every item concurrently. Items that fail are logged and left
    /// out of the returned collection; the batch itself never fails.
    pub async fn run<S: ConfigStore + ?Sized>(&self, store: &S, items: &[String]) -> Output {
        let output = Output::new();

        let settings = match BatchSettings::load(store) {
            Ok(settings) => settings,
            Err(e) => {
                self.log.error(&format!("can't read configuration: {}", e));
                return output;
            }
        };
        self.log_settings(&settings);

        let processor = processor::dispatch(settings.format);
        join_all(
            items
                .iter()
                .map(|item| self.run_item(item, &settings, processor, &output)),
        )
        .await;

        output
    }

    fn log_settings(&self, settings: &BatchSettings) {
        let to_json = |v: Option<String>| v.unwrap_or_else(|| "undefined".to_string());
        self.log.info(&format!("use outputType: {}", settings.format));
        self.log.info(&format!(
            "use inputOptions: {}",
            to_json(settings.input_options.as_ref().and_then(|o| serde_json::to_string(o).ok()))
        ));
        self.log.info(&format!(
            "use outputOptions: {}",
            to_json(settings.output_options.as_ref().and_then(|o| serde_json::to_string(o).ok()))
        ));
    }

    /// Task boundary: every failure of one item stops here.
    async fn run_item(
        &self,
        item: &str,
        settings: &BatchSettings,
        processor: &'static dyn ImageProcessor,
        output: &Output,
    ) {
        match self.process_item(item, settings, processor).await {
            Ok(record) => output.push(record),
            Err(e) => self.log.error(&format!("[{}] {}", e.stage(), e)),
        }
    }

    /// Stages run strictly in order: resolve, guard, encode, select.
    pub async fn process_item(
        &self,
        item: &str,
        settings: &BatchSettings,
        processor: &'static dyn ImageProcessor,
    ) -> Result<OutputRecord, ProcessingError> {
        let raw: Arc<[u8]> = source::resolve(item, &self.http, &self.fs, &self.log).await?.into();

        let transformed = convert::encode(
            item,
            Arc::clone(&raw),
            processor,
            settings.output_options.clone(),
            settings.input_options.clone(),
            &self.log,
        )
        .await?;

        output::select(item, settings.format, raw.to_vec(), transformed, &self.log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MemoryConfigStore, CODEC_NAMESPACE, PLUGIN_NAME};
    use crate::format::OutputFormat;
    use crate::test_helpers::{image_bytes, png_bytes, response, FakeFs, FakeHttp, Level, RecordingLogger};
    use image::ImageFormat;
    use reqwest::StatusCode;
    use serde_json::json;

    fn store(format: &str) -> MemoryConfigStore {
        MemoryConfigStore::new().with(PLUGIN_NAME, json!({ "outputType": format }))
    }

    fn names(records: &[OutputRecord]) -> Vec<String> {
        let mut names: Vec<String> = records.iter().map(|r| r.file_name.clone()).collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn one_bad_item_does_not_affect_the_rest() {
        let fs = FakeFs::default()
            .with("in/first.png", png_bytes(10, 10))
            .with("in/broken.png", b"not really a png".to_vec())
            .with("in/third.jpg", image_bytes(12, 8, ImageFormat::Jpeg));
        let pipeline = Pipeline::new(FakeHttp::default(), fs, RecordingLogger::default());
        let items = vec![
            "in/first.png".to_string(),
            "in/broken.png".to_string(),
            "in/third.jpg".to_string(),
        ];

        let records = pipeline.run(&store("png"), &items).await.into_records();

        assert_eq!(records.len(), 2);
        assert_eq!(names(&records), vec!["first.png", "third.png"]);
        let third = records.iter().find(|r| r.file_name == "third.png").unwrap();
        assert_eq!((third.width, third.height), (12, 8));
        assert!(pipeline
            .logger()
            .lines(Level::Error)
            .iter()
            .any(|l| l.contains("in/broken.png")));
    }

    #[tokio::test]
    async fn mixed_sources_and_guard_rejection() {
        let good = "https://cdn.example.com/p/cat.png?w=100";
        let html = "https://example.com/not-an-image.png";
        let http = FakeHttp::default()
            .with(good, response(StatusCode::OK, Some("image/png"), png_bytes(16, 9)))
            .with(html, response(StatusCode::OK, Some("text/html"), png_bytes(16, 9)));
        let fs = FakeFs::default().with("local/dog.png", png_bytes(5, 5));
        let pipeline = Pipeline::new(http, fs, RecordingLogger::default());
        let items = vec![good.to_string(), html.to_string(), "local/dog.png".to_string()];

        let records = pipeline.run(&store("jpeg"), &items).await.into_records();

        assert_eq!(names(&records), vec!["cat.jpeg", "dog.jpeg"]);
        // the rejected item never reached the codec
        let successes = pipeline.logger().lines(Level::Success);
        assert_eq!(successes.len(), 2);
        assert!(successes.iter().all(|l| !l.contains(html)));
    }

    #[tokio::test]
    async fn missing_config_uses_webp() {
        let fs = FakeFs::default().with("a.png", png_bytes(8, 8));
        let pipeline = Pipeline::new(FakeHttp::default(), fs, RecordingLogger::default());

        let records = pipeline
            .run(&MemoryConfigStore::new(), &["a.png".to_string()])
            .await
            .into_records();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].extname, ".webp");
        let info = pipeline.logger().lines(Level::Info);
        assert_eq!(info[0], "use outputType: webp");
        assert_eq!(info[1], "use inputOptions: undefined");
    }

    #[tokio::test]
    async fn invalid_config_produces_no_records() {
        let fs = FakeFs::default().with("a.png", png_bytes(8, 8));
        let pipeline = Pipeline::new(FakeHttp::default(), fs, RecordingLogger::default());

        let output = pipeline.run(&store("bmp"), &["a.png".to_string()]).await;

        assert!(output.is_empty());
        assert_eq!(pipeline.logger().lines(Level::Error).len(), 1);
    }

    #[tokio::test]
    async fn broken_bag_for_unused_format_does_not_stop_the_batch() {
        let fs = FakeFs::default().with("a.png", png_bytes(8, 8));
        let pipeline = Pipeline::new(FakeHttp::default(), fs, RecordingLogger::default());
        let store = store("jpeg").with(
            CODEC_NAMESPACE,
            json!({
                "outputOptions": {
                    "avif": { "quality": -1, "speed": "fast" },
                    "jpeg": { "quality": 300 }
                }
            }),
        );

        let records = pipeline.run(&store, &["a.png".to_string()]).await.into_records();

        assert_eq!(names(&records), vec!["a.jpeg"]);
        assert!(pipeline.logger().lines(Level::Error).is_empty());
    }

    #[tokio::test]
    async fn input_options_reach_the_decoder() {
        let fs = FakeFs::default().with("big.png", png_bytes(50, 50));
        let pipeline = Pipeline::new(FakeHttp::default(), fs, RecordingLogger::default());
        let store = store("png").with(
            CODEC_NAMESPACE,
            json!({ "inputOptions": { "png": { "limitInputPixels": 100 } } }),
        );

        let output = pipeline.run(&store, &["big.png".to_string()]).await;

        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn repeated_runs_agree_on_metadata() {
        let fs = FakeFs::default().with("shots/img.png", png_bytes(21, 13));
        let pipeline = Pipeline::new(FakeHttp::default(), fs, RecordingLogger::default());
        let items = vec!["shots/img.png".to_string()];
        let store = store("gif");

        let first = pipeline.run(&store, &items).await.into_records();
        let second = pipeline.run(&store, &items).await.into_records();

        let meta = |r: &OutputRecord| (r.file_name.clone(), r.width, r.height, r.extname.clone());
        assert_eq!(first.len(), 1);
        assert_eq!(meta(&first[0]), meta(&second[0]));
        assert_eq!(meta(&first[0]), ("img.gif".to_string(), 21, 13, ".gif".to_string()));
    }

    #[tokio::test]
    async fn process_item_reports_stage() {
        let pipeline = Pipeline::new(FakeHttp::default(), FakeFs::default(), RecordingLogger::default());
        let settings = BatchSettings {
            format: OutputFormat::Jpeg,
            output_options: None,
            input_options: None,
        };

        let err = pipeline
            .process_item("https://missing.example/x.png", &settings, processor::dispatch(OutputFormat::Jpeg))
            .await
            .unwrap_err();

        assert_eq!(err.stage(), "fetch");
    }
}
