use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::ingest::CameraConfig;

const DEFAULT_SOURCE_URL: &str = "stub://front_camera";
const DEFAULT_ROUNDS: u32 = 3;

#[derive(Debug, Deserialize, Default)]
struct GameConfigFile {
    source: Option<SourceConfigFile>,
    game: Option<GameSectionFile>,
}

#[derive(Debug, Deserialize, Default)]
struct SourceConfigFile {
    url: Option<String>,
    seed: Option<u64>,
    warmup_frames: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct GameSectionFile {
    rounds: Option<u32>,
    rng_seed: Option<u64>,
    history_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub source: SourceSettings,
    pub rounds: u32,
    pub rng_seed: Option<u64>,
    pub history_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub url: String,
    pub seed: Option<u64>,
    pub warmup_frames: u32,
}

impl SourceSettings {
    pub fn camera_config(&self) -> CameraConfig {
        CameraConfig {
            url: self.url.clone(),
            seed: self.seed,
            warmup_frames: self.warmup_frames,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_file(GameConfigFile::default())
    }
}

impl GameConfig {
    /// Load from `RPS_CONFIG` (JSON, or TOML for `.toml` paths), then apply
    /// `RPS_*` environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("RPS_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: GameConfigFile) -> Self {
        let source = SourceSettings {
            url: file
                .source
                .as_ref()
                .and_then(|source| source.url.clone())
                .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string()),
            seed: file.source.as_ref().and_then(|source| source.seed),
            warmup_frames: file
                .source
                .as_ref()
                .and_then(|source| source.warmup_frames)
                .unwrap_or(0),
        };
        let game = file.game.unwrap_or_default();
        Self {
            source,
            rounds: game.rounds.unwrap_or(DEFAULT_ROUNDS),
            rng_seed: game.rng_seed,
            history_path: game.history_path,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("RPS_SOURCE_URL") {
            if !url.trim().is_empty() {
                self.source.url = url;
            }
        }
        if let Ok(seed) = std::env::var("RPS_SOURCE_SEED") {
            self.source.seed = Some(
                seed.parse()
                    .map_err(|_| anyhow!("RPS_SOURCE_SEED must be an unsigned integer"))?,
            );
        }
        if let Ok(rounds) = std::env::var("RPS_ROUNDS") {
            self.rounds = rounds
                .parse()
                .map_err(|_| anyhow!("RPS_ROUNDS must be an unsigned integer"))?;
        }
        if let Ok(seed) = std::env::var("RPS_RNG_SEED") {
            self.rng_seed = Some(
                seed.parse()
                    .map_err(|_| anyhow!("RPS_RNG_SEED must be an unsigned integer"))?,
            );
        }
        if let Ok(path) = std::env::var("RPS_HISTORY_PATH") {
            if !path.trim().is_empty() {
                self.history_path = Some(PathBuf::from(path));
            }
        }
        Ok(())
    }

    /// Reject settings the game cannot run with. Call again after applying
    /// command-line overrides.
    pub fn validate(&self) -> Result<()> {
        if self.rounds == 0 {
            return Err(anyhow!("rounds must be greater than zero"));
        }
        if self.source.url.trim().is_empty() {
            return Err(anyhow!("source url must not be empty"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<GameConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let cfg = if is_toml {
        toml::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}
