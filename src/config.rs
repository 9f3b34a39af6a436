// user settings: <project_dir>/.garden/config.json

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::carousel::CarouselConfig;
use crate::pipeline::garden::DEFAULT_OWNER;
use crate::pipeline::store::GARDEN_DIR;

const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_SEED_PLANTS: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GardenConfig {
    /// Name stamped on gardens created from this machine.
    pub owner: String,
    /// Pitched WAVs (`C1.wav`, `A2.wav`, ...). Defaults to `<project>/samples`.
    pub samples_dir: Option<PathBuf>,
    pub log_level: String,
    /// Random plants dropped into a brand-new garden.
    pub seed_plants: usize,
    pub carousel: CarouselConfig,
}

impl Default for GardenConfig {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER.to_string(),
            samples_dir: None,
            log_level: "info".to_string(),
            seed_plants: DEFAULT_SEED_PLANTS,
            carousel: CarouselConfig::default(),
        }
    }
}

impl GardenConfig {
    pub fn path(project_dir: &Path) -> PathBuf {
        project_dir.join(GARDEN_DIR).join(CONFIG_FILE)
    }

    /// Reads the config, writing defaults first if there is none. A file that
    /// doesn't parse is left alone and the defaults are used for this run.
    pub fn load_or_init(project_dir: &Path) -> anyhow::Result<Self> {
        let path = Self::path(project_dir);
        match std::fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str::<Self>(&data) {
                Ok(mut config) => {
                    config.carousel = config.carousel.validated();
                    Ok(config)
                }
                Err(e) => {
                    log::warn!("ignoring malformed {}: {e}", path.display());
                    Ok(Self::default())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.save(project_dir)?;
                Ok(config)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, project_dir: &Path) -> anyhow::Result<()> {
        let path = Self::path(project_dir);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn samples_dir(&self, project_dir: &Path) -> PathBuf {
        match &self.samples_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => project_dir.join(dir),
            None => project_dir.join("samples"),
        }
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
