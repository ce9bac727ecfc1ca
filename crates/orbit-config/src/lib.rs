//! Configuration for the orbit backdrop.
//!
//! The config lives at `<config_dir>/orbit/config.toml`. A missing file means
//! defaults; every field may be omitted.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use orbit_core::{AnimationSpeed, ExclusionZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_FILE_NAME: &str = "orbit.log";

/// Errors raised while loading or saving the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a configuration directory for this platform")]
    NoConfigDir,
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Speed of looping animations and shooting stars.
    pub animation_speed: AnimationSpeed,
    /// Draw the aurora wash.
    pub show_aurora: bool,
    /// Draw the rotating orbit rings.
    pub show_orbits: bool,
    pub stars: StarsConfig,
    pub planets: PlanetsConfig,
    pub shooting_stars: ShootingStarsConfig,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            animation_speed: AnimationSpeed::Medium,
            show_aurora: true,
            show_orbits: true,
            stars: StarsConfig::default(),
            planets: PlanetsConfig::default(),
            shooting_stars: ShootingStarsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Star field settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarsConfig {
    pub min_count: usize,
    pub max_count: usize,
    /// Explicit exclusion zones. Empty means "derive from the placed planets".
    pub exclusion_zones: Vec<ExclusionZone>,
}

impl Default for StarsConfig {
    fn default() -> Self {
        Self {
            min_count: 500,
            max_count: 1000,
            exclusion_zones: Vec::new(),
        }
    }
}

/// Planet placement settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetsConfig {
    /// Minimum distance between planet centers, in percent.
    pub min_separation: f32,
    /// Position samples tried per planet before the last one is kept.
    pub max_attempts: u32,
    /// Positions are sampled in `[margin, 100 - margin)`.
    pub margin: f32,
}

impl Default for PlanetsConfig {
    fn default() -> Self {
        Self {
            min_separation: 15.0,
            max_attempts: 100,
            margin: 5.0,
        }
    }
}

/// Shooting-star spawner settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShootingStarsConfig {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Chance that a wake allows two concurrent stars.
    pub two_chance: f32,
    /// Chance that a wake allows three concurrent stars.
    pub three_chance: f32,
    /// Pixels per frame at 60 fps.
    pub min_speed: f32,
    pub max_speed: f32,
    /// Minimum angle between concurrent stars, in degrees.
    pub min_angle_separation: f32,
}

impl Default for ShootingStarsConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 3000,
            max_delay_ms: 8000,
            two_chance: 0.25,
            three_chance: 0.10,
            min_speed: 0.8,
            max_speed: 1.6,
            min_angle_separation: 20.0,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub level: String,
    /// Log file path. Empty means the default cache location.
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "off".to_string(),
            file: String::new(),
        }
    }
}

impl LoggingConfig {
    /// Resolve the log file path, falling back to the cache directory.
    pub fn file_path(&self) -> Result<PathBuf, ConfigError> {
        if !self.file.is_empty() {
            return Ok(PathBuf::from(&self.file));
        }
        Ok(project_dirs()?.cache_dir().join(LOG_FILE_NAME))
    }
}

fn project_dirs() -> Result<ProjectDirs, ConfigError> {
    ProjectDirs::from("", "", "orbit").ok_or(ConfigError::NoConfigDir)
}

/// Default location of the config file.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(project_dirs()?.config_dir().join(CONFIG_FILE_NAME))
}

impl Config {
    /// Load from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path()?)
    }

    /// Load from `path`, returning defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_path()?)
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let stars = &self.stars;
        if stars.min_count == 0 {
            return Err(invalid("stars.min_count", "must be at least 1"));
        }
        if stars.min_count > stars.max_count {
            return Err(invalid(
                "stars.max_count",
                format!("{} is below min_count {}", stars.max_count, stars.min_count),
            ));
        }
        if stars.exclusion_zones.iter().any(|zone| {
            !(zone.top.is_finite() && zone.left.is_finite() && zone.radius.is_finite())
        }) {
            return Err(invalid("stars.exclusion_zones", "values must be finite"));
        }
        if stars.exclusion_zones.iter().any(|zone| zone.radius < 0.0) {
            return Err(invalid("stars.exclusion_zones", "radius must not be negative"));
        }

        let planets = &self.planets;
        if planets.max_attempts == 0 {
            return Err(invalid("planets.max_attempts", "must be at least 1"));
        }
        if !(0.0..50.0).contains(&planets.margin) {
            return Err(invalid("planets.margin", "must be in [0, 50)"));
        }
        if !planets.min_separation.is_finite() || planets.min_separation < 0.0 {
            return Err(invalid(
                "planets.min_separation",
                "must be finite and not negative",
            ));
        }

        let shooting = &self.shooting_stars;
        if shooting.min_delay_ms > shooting.max_delay_ms {
            return Err(invalid(
                "shooting_stars.max_delay_ms",
                format!(
                    "{} is below min_delay_ms {}",
                    shooting.max_delay_ms, shooting.min_delay_ms
                ),
            ));
        }
        if !shooting.min_speed.is_finite() || !shooting.max_speed.is_finite() {
            return Err(invalid("shooting_stars.max_speed", "speeds must be finite"));
        }
        if shooting.min_speed <= 0.0 || shooting.min_speed > shooting.max_speed {
            return Err(invalid(
                "shooting_stars.min_speed",
                "must be positive and not above max_speed",
            ));
        }
        if !shooting.min_angle_separation.is_finite() || shooting.min_angle_separation < 0.0 {
            return Err(invalid(
                "shooting_stars.min_angle_separation",
                "must be finite and not negative",
            ));
        }
        for (field, chance) in [
            ("shooting_stars.two_chance", shooting.two_chance),
            ("shooting_stars.three_chance", shooting.three_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(invalid(field, "must be in [0, 1]"));
            }
        }
        if shooting.two_chance + shooting.three_chance > 1.0 {
            return Err(invalid(
                "shooting_stars.two_chance",
                "two_chance + three_chance must not exceed 1",
            ));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
