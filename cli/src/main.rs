use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use pic_convert::cli::{Cli, Command, ConfigAction};
use pic_convert::io::{collect_inputs, write_records};
use pic_convert_core::config::{
    config_schema, set_config, PluginConfig, CODEC_NAMESPACE, PLUGIN_NAME,
};
use pic_convert_core::{
    ConfigStore, JsonFileConfigStore, LogLogger, MemoryConfigStore, OutputFormat, Pipeline,
    ReqwestClient, TokioFs,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Init logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Command::Convert {
            inputs,
            out_dir,
            config,
            to,
            recursive,
        } => handle_convert(&inputs, &out_dir, config.as_deref(), to, recursive).await,
        Command::Config { action } => match action {
            ConfigAction::Schema { config } => handle_schema(config.as_deref()),
            ConfigAction::SetFormat { format, config } => handle_set_format(format, &config),
        },
    }
}

/// Snapshot of the stored namespaces, so `--to` can override without
/// touching the file.
fn load_store(config: Option<&Path>, to: Option<OutputFormat>) -> Result<MemoryConfigStore> {
    let mut store = MemoryConfigStore::new();
    if let Some(path) = config {
        let file = JsonFileConfigStore::open(path)
            .with_context(|| format!("Failed to open config {}", path.display()))?;
        for key in [PLUGIN_NAME, CODEC_NAMESPACE] {
            if let Some(value) = file.get_value(key) {
                store.set_value(key, value)?;
            }
        }
    }
    if let Some(format) = to {
        set_config(
            &mut store,
            PLUGIN_NAME,
            &PluginConfig {
                output_type: Some(format),
            },
        )?;
    }
    Ok(store)
}

async fn handle_convert(
    inputs: &[String],
    out_dir: &Path,
    config: Option<&Path>,
    to: Option<OutputFormat>,
    recursive: bool,
) -> Result<()> {
    let items = collect_inputs(inputs, recursive).context("Failed to collect inputs")?;
    if items.is_empty() {
        println!("No inputs found.");
        return Ok(());
    }

    let store = load_store(config, to)?;
    let http = ReqwestClient::new().context("Failed to build HTTP client")?;
    let pipeline = Pipeline::new(http, TokioFs, LogLogger);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Converting {} item(s)...", items.len()));
    pb.enable_steady_tick(Duration::from_millis(100));

    let records = pipeline.run(&store, &items).await.into_records();
    pb.finish_and_clear();

    let written: Vec<PathBuf> = write_records(out_dir, &records).context("Failed to write outputs")?;
    for path in &written {
        println!("  {}", path.display());
    }
    println!("Wrote {} file(s) to {}", written.len(), out_dir.display());

    Ok(())
}

fn handle_schema(config: Option<&Path>) -> Result<()> {
    let schema = match config {
        Some(path) => config_schema(
            &JsonFileConfigStore::open(path)
                .with_context(|| format!("Failed to open config {}", path.display()))?,
        ),
        None => config_schema(&MemoryConfigStore::new()),
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn handle_set_format(format: OutputFormat, config: &Path) -> Result<()> {
    let mut store = JsonFileConfigStore::open(config)
        .with_context(|| format!("Failed to open config {}", config.display()))?;
    set_config(
        &mut store,
        PLUGIN_NAME,
        &PluginConfig {
            output_type: Some(format),
        },
    )?;
    println!("outputType set to {} in {}", format, store.path().display());
    Ok(())
}
