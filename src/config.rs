use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_INPUT: &str = "stub://scene";
const DEFAULT_OUTPUT: &str = "detections.json";
const DEFAULT_FPS: u32 = 25;
const DEFAULT_CONFIDENCE: f32 = 0.3;

#[derive(Debug, Deserialize, Default)]
struct WatchConfigFile {
    input: Option<String>,
    output: Option<String>,
    fps: Option<u32>,
    thresholds: Option<ThresholdConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct ThresholdConfigFile {
    person: Option<f32>,
    helmet: Option<f32>,
}

/// Application configuration for the session runner. The engine itself never
/// reads any of this; it only sees already-thresholded detections.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Annotation source path ("stub://…" selects the scripted scene).
    pub input: String,
    /// Session log output path.
    pub output: String,
    pub fps: u32,
    pub person_confidence: f32,
    pub helmet_confidence: f32,
}

impl WatchConfig {
    /// Load from the optional `PPEWATCH_CONFIG` JSON file, then apply env
    /// overrides, then validate.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("PPEWATCH_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: WatchConfigFile) -> Self {
        Self {
            input: file.input.unwrap_or_else(|| DEFAULT_INPUT.to_string()),
            output: file.output.unwrap_or_else(|| DEFAULT_OUTPUT.to_string()),
            fps: file.fps.unwrap_or(DEFAULT_FPS),
            person_confidence: file
                .thresholds
                .as_ref()
                .and_then(|t| t.person)
                .unwrap_or(DEFAULT_CONFIDENCE),
            helmet_confidence: file
                .thresholds
                .and_then(|t| t.helmet)
                .unwrap_or(DEFAULT_CONFIDENCE),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(input) = std::env::var("PPEWATCH_INPUT") {
            if !input.trim().is_empty() {
                self.input = input;
            }
        }
        if let Ok(output) = std::env::var("PPEWATCH_OUTPUT") {
            if !output.trim().is_empty() {
                self.output = output;
            }
        }
        if let Ok(fps) = std::env::var("PPEWATCH_FPS") {
            self.fps = fps
                .parse()
                .map_err(|_| anyhow!("PPEWATCH_FPS must be an integer frame rate"))?;
        }
        if let Ok(conf) = std::env::var("PPEWATCH_PERSON_CONF") {
            self.person_confidence = conf
                .parse()
                .map_err(|_| anyhow!("PPEWATCH_PERSON_CONF must be a number"))?;
        }
        if let Ok(conf) = std::env::var("PPEWATCH_HELMET_CONF") {
            self.helmet_confidence = conf
                .parse()
                .map_err(|_| anyhow!("PPEWATCH_HELMET_CONF must be a number"))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.input.trim().is_empty() {
            return Err(anyhow!("input path must not be empty"));
        }
        if self.output.trim().is_empty() {
            return Err(anyhow!("output path must not be empty"));
        }
        if self.fps == 0 {
            return Err(anyhow!("fps must be greater than zero"));
        }
        for (name, value) in [
            ("person", self.person_confidence),
            ("helmet", self.helmet_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(anyhow!("{} confidence threshold must be within 0..=1", name));
            }
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<WatchConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
