use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::format::OutputFormat;
use crate::options::{InputOptions, OutputOptions, OutputOptionsMap};

/// Namespace holding the plugin's own settings.
pub const PLUGIN_NAME: &str = "pic-convert";
/// Namespace holding per-format codec option bags.
pub const CODEC_NAMESPACE: &str = "codec";

/// Format used when no `outputType` is stored.
pub const DEFAULT_OUTPUT_FORMAT: OutputFormat = OutputFormat::Webp;
/// Default advertised by the configuration schema. Differs from
/// [`DEFAULT_OUTPUT_FORMAT`] on purpose.
pub const SCHEMA_DEFAULT_OUTPUT_FORMAT: OutputFormat = OutputFormat::Avif;

/// Key-value configuration owned by the host, one JSON value per namespace.
pub trait ConfigStore {
    fn get_value(&self, key: &str) -> Option<Value>;
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), ConfigError>;
}

/// Read and deserialize one namespace. `Ok(None)` when nothing is stored.
pub fn get_config<T, S>(store: &S, key: &str) -> Result<Option<T>, ConfigError>
where
    T: DeserializeOwned,
    S: ConfigStore + ?Sized,
{
    match store.get_value(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                key: key.to_string(),
                source,
            }),
    }
}

pub fn set_config<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), ConfigError>
where
    T: Serialize,
    S: ConfigStore + ?Sized,
{
    let value = serde_json::to_value(value).map_err(|source| ConfigError::Parse {
        key: key.to_string(),
        source,
    })?;
    store.set_value(key, value)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_type: Option<OutputFormat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodecConfig {
    pub output_options: Option<OutputOptionsMap>,
    pub input_options: Option<BTreeMap<OutputFormat, InputOptions>>,
}

/// Everything a batch needs from configuration, resolved once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSettings {
    pub format: OutputFormat,
    pub output_options: Option<OutputOptions>,
    pub input_options: Option<InputOptions>,
}

impl BatchSettings {
    /// Only the bags stored for the selected format are parsed; the others
    /// are never looked at.
    pub fn load<S: ConfigStore + ?Sized>(store: &S) -> Result<Self, ConfigError> {
        let plugin: Option<PluginConfig> = get_config(store, PLUGIN_NAME)?;
        let format = plugin
            .and_then(|p| p.output_type)
            .unwrap_or(DEFAULT_OUTPUT_FORMAT);

        let codec = match store.get_value(CODEC_NAMESPACE) {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(ConfigError::InvalidValue(format!(
                    "{} must be a JSON object",
                    CODEC_NAMESPACE
                )))
            }
        };
        let bag = |section: &str| {
            codec
                .get(section)
                .and_then(|s| s.get(format.as_str()))
                .filter(|v| !v.is_null())
                .cloned()
        };
        let parse_err = |source: serde_json::Error| ConfigError::Parse {
            key: CODEC_NAMESPACE.to_string(),
            source,
        };

        let output_options = bag("outputOptions")
            .map(|v| OutputOptions::from_value(format, v))
            .transpose()
            .map_err(parse_err)?;
        let input_options = bag("inputOptions")
            .map(serde_json::from_value::<InputOptions>)
            .transpose()
            .map_err(parse_err)?;

        Ok(Self {
            format,
            output_options,
            input_options,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigItemKind {
    List,
}

/// One field of the configuration form the host renders for this plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigItem {
    pub alias: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: ConfigItemKind,
    pub choices: Vec<OutputFormat>,
    pub default: OutputFormat,
    pub required: bool,
}

/// The configuration schema, with the stored `outputType` as the default
/// when present. An unreadable plugin namespace falls back to the schema
/// default.
pub fn config_schema<S: ConfigStore + ?Sized>(store: &S) -> Vec<ConfigItem> {
    let stored = get_config::<PluginConfig, _>(store, PLUGIN_NAME)
        .ok()
        .flatten()
        .and_then(|p| p.output_type);

    vec![ConfigItem {
        alias: "compression format",
        name: "outputType",
        kind: ConfigItemKind::List,
        choices: OutputFormat::ALL.to_vec(),
        default: stored.unwrap_or(SCHEMA_DEFAULT_OUTPUT_FORMAT),
        required: true,
    }]
}

#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    values: BTreeMap<String, Value>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) -> Result<(), ConfigError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// JSON object file whose top-level keys are namespaces. Writes go straight
/// back to disk.
#[derive(Debug, Clone)]
pub struct JsonFileConfigStore {
    path: PathBuf,
    root: Map<String, Value>,
}

impl JsonFileConfigStore {
    /// Open `path`; a missing file is an empty configuration.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let root = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Map::new(),
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    return Err(ConfigError::InvalidValue(format!(
                        "{} must contain a JSON object",
                        path.display()
                    )))
                }
                Err(source) => {
                    return Err(ConfigError::Parse {
                        key: path.display().to_string(),
                        source,
                    })
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        Ok(Self { path, root })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(&self.root).map_err(|source| ConfigError::Parse {
            key: self.path.display().to_string(),
            source,
        })?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, text).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl ConfigStore for JsonFileConfigStore {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.root.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) -> Result<(), ConfigError> {
        self.root.insert(key.to_string(), value);
        self.save()
    }
}
