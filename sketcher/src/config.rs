use anyhow::{Context, Result, bail};
use art_effect::{Style, StyleParams};
use derivative::Derivative;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_CONFIG_FILE: &str = "sketcher.toml";

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
pub struct Config {
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(skip)]
    pub is_first_run: bool,

    #[serde(default = "preview_quality_default")]
    #[derivative(Default(value = "preview_quality_default()"))]
    pub preview_quality: u8,

    #[serde(default = "output_quality_default")]
    #[derivative(Default(value = "output_quality_default()"))]
    pub output_quality: u8,

    #[serde(default = "output_dir_default")]
    #[derivative(Default(value = "output_dir_default()"))]
    pub output_dir: PathBuf,

    #[serde(default = "feedback_log_default")]
    #[derivative(Default(value = "feedback_log_default()"))]
    pub feedback_log: PathBuf,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    // [styles.gothic]
    // glow_strength = 12
    #[serde(default)]
    pub styles: BTreeMap<String, StyleParams>,
}

impl Config {
    /// Read `path`, or write a default config there when it is missing or broken.
    pub fn load_or_init(path: impl AsRef<Path>) -> Result<Config> {
        let mut config = Config {
            config_path: path.as_ref().to_path_buf(),
            ..Default::default()
        };
        config.load()?;
        Ok(config)
    }

    fn load(&mut self) -> Result<()> {
        match fs::read_to_string(&self.config_path) {
            Ok(text) => match toml::from_str::<Config>(&text) {
                Ok(mut c) => {
                    c.config_path = self.config_path.clone();
                    c.is_first_run = false;
                    *self = c;

                    debug!("load config from {}", self.config_path.display());
                    Ok(())
                }
                Err(e) => {
                    warn!("parse {} failed, rewrite it with defaults: {e}", self.config_path.display());
                    self.reset()
                }
            },
            Err(_) => self.reset(),
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.is_first_run = true;

        if self.config_path.exists() {
            let mut bak_file = self.config_path.clone().into_os_string();
            bak_file.push(".bak");
            _ = fs::copy(&self.config_path, bak_file);
        }

        self.save()
    }

    pub fn save(&self) -> Result<()> {
        match toml::to_string_pretty(self) {
            Ok(text) => Ok(fs::write(&self.config_path, text)
                .with_context(|| format!("save config to {} failed", self.config_path.display()))?),
            Err(e) => bail!(format!("convert config to toml format failed. {e:?}")),
        }
    }

    /// Parameters configured for `style`. Table keys may use any spelling the
    /// style name parser accepts, e.g. `pencil-sketch` or `PencilSketch`.
    pub fn style_params(&self, style: Style) -> Result<StyleParams> {
        let mut params = StyleParams::new();

        for (key, table) in &self.styles {
            let configured = key
                .parse::<Style>()
                .with_context(|| format!("unknown style table [styles.{key}] in config"))?;

            if configured == style {
                params.extend(table.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }

        Ok(params)
    }
}

fn preview_quality_default() -> u8 {
    art_effect::codec::DEFAULT_PREVIEW_QUALITY
}

fn output_quality_default() -> u8 {
    art_effect::codec::DEFAULT_PREVIEW_QUALITY
}

fn output_dir_default() -> PathBuf {
    PathBuf::from(".")
}

fn feedback_log_default() -> PathBuf {
    PathBuf::from("feedback.txt")
}
