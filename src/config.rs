//! Startup configuration
//!
//! Credentials and database ids come from the environment and are
//! validated once at startup. Scheduler tuning (review intervals,
//! promotion thresholds) can be overridden from an optional TOML file;
//! the core never reads the environment itself.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::MasteryLevel;

pub const ENV_NOTION_TOKEN: &str = "NOTION_TOKEN";
pub const ENV_VOCAB_DB: &str = "VOCAB_DATABASE_ID";
pub const ENV_GRAMMAR_DB: &str = "GRAMMAR_DATABASE_ID";
pub const ENV_CONFIG_PATH: &str = "LINGON_CONFIG";

/// Everything the gateway and scheduler need, resolved at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Notion integration token (bearer credential).
    pub notion_token: String,
    /// Vocabulary database id.
    pub vocab_db_id: String,
    /// Grammar database id.
    pub grammar_db_id: String,
    /// Spaced-repetition tuning.
    pub scheduler: SchedulerConfig,
}

impl Config {
    /// Load from the environment plus the optional config file.
    ///
    /// Fails with `Error::Config` naming the missing variable, so a
    /// misconfigured server dies at startup instead of on first call.
    pub fn from_env() -> Result<Self> {
        let notion_token = require_env(ENV_NOTION_TOKEN)?;
        let vocab_db_id = require_env(ENV_VOCAB_DB)?;
        let grammar_db_id = require_env(ENV_GRAMMAR_DB)?;

        let scheduler = match config_file_path() {
            Some(path) if path.exists() => {
                info!("Loading scheduler config from {:?}", path);
                load_scheduler_config(&path)?
            }
            _ => {
                debug!("No config file found, using default scheduler config");
                SchedulerConfig::default()
            }
        };
        scheduler.validate()?;

        Ok(Config { notion_token, vocab_db_id, grammar_db_id, scheduler })
    }
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!("environment variable {} is not set", name))),
    }
}

/// `$LINGON_CONFIG` wins; otherwise `~/.config/lingon/config.toml`.
fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("lingon").join("config.toml"))
}

fn load_scheduler_config(path: &Path) -> Result<SchedulerConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {:?}: {}", path, e)))?;
    let file: ConfigFile = toml::from_str(&raw)
        .map_err(|e| Error::Config(format!("failed to parse {:?}: {}", path, e)))?;
    Ok(file.scheduler)
}

/// On-disk shape of the config file.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    scheduler: SchedulerConfig,
}

/// Tunable spaced-repetition policy constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Days between reviews at each mastery level. Must be strictly
    /// increasing with mastery.
    pub intervals: ReviewIntervals,
    /// Promote one level when the session rate reaches this.
    pub promote_threshold: f64,
    /// Demote one level when the session rate falls below this.
    pub demote_threshold: f64,
    /// Reviews required (after the update) before a level can promote.
    pub min_reviews: PromotionGates,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            intervals: ReviewIntervals::default(),
            promote_threshold: 0.8,
            demote_threshold: 0.4,
            min_reviews: PromotionGates::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.promote_threshold) {
            return Err(Error::Config(format!(
                "promote_threshold must be in [0, 1], got {}",
                self.promote_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.demote_threshold) {
            return Err(Error::Config(format!(
                "demote_threshold must be in [0, 1], got {}",
                self.demote_threshold
            )));
        }
        if self.demote_threshold >= self.promote_threshold {
            return Err(Error::Config(format!(
                "demote_threshold ({}) must be below promote_threshold ({})",
                self.demote_threshold, self.promote_threshold
            )));
        }
        self.intervals.validate()
    }
}

/// Review interval table, in days per mastery level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewIntervals {
    pub new: i64,
    pub learning: i64,
    pub familiar: i64,
    pub mastered: i64,
}

impl Default for ReviewIntervals {
    fn default() -> Self {
        ReviewIntervals { new: 1, learning: 3, familiar: 7, mastered: 30 }
    }
}

impl ReviewIntervals {
    pub fn for_level(&self, level: MasteryLevel) -> Duration {
        let days = match level {
            MasteryLevel::New => self.new,
            MasteryLevel::Learning => self.learning,
            MasteryLevel::Familiar => self.familiar,
            MasteryLevel::Mastered => self.mastered,
        };
        Duration::days(days)
    }

    fn validate(&self) -> Result<()> {
        if self.new < 1 {
            return Err(Error::Config(format!(
                "intervals.new must be at least 1 day, got {}",
                self.new
            )));
        }
        if !(self.new < self.learning && self.learning < self.familiar && self.familiar < self.mastered)
        {
            return Err(Error::Config(format!(
                "review intervals must strictly increase with mastery: {} < {} < {} < {} does not hold",
                self.new, self.learning, self.familiar, self.mastered
            )));
        }
        Ok(())
    }
}

/// Minimum review counts before promotion out of each level.
/// `Mastered` has no gate because there is nowhere to promote to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromotionGates {
    pub new: u32,
    pub learning: u32,
    pub familiar: u32,
}

impl Default for PromotionGates {
    fn default() -> Self {
        PromotionGates { new: 1, learning: 3, familiar: 5 }
    }
}

impl PromotionGates {
    pub fn for_level(&self, level: MasteryLevel) -> u32 {
        match level {
            MasteryLevel::New => self.new,
            MasteryLevel::Learning => self.learning,
            MasteryLevel::Familiar => self.familiar,
            // Unreachable from the promotion path; promotion saturates.
            MasteryLevel::Mastered => u32::MAX,
        }
    }
}
