use minifb::Scale;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cpu::CpuOptions;
use crate::filters::Palette;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cpu: CpuSection,
    pub display: Display,
    pub speed: Speed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuSection {
    pub strict_interrupts: bool,
    pub memory_operand_timing: bool,
    /// Start at 0x0100 with the register state the boot ROM leaves behind.
    pub skip_boot: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Display {
    pub scale: String,
    pub palette: String,
    pub scanlines: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Speed {
    /// Sleep away positive tick slack so emulation runs at hardware speed.
    pub throttle: bool,
}

impl Default for CpuSection {
    fn default() -> Self {
        let options = CpuOptions::default();
        CpuSection {
            strict_interrupts: options.strict_interrupts,
            memory_operand_timing: options.memory_operand_timing,
            skip_boot: false,
        }
    }
}

impl Default for Display {
    fn default() -> Self {
        Display {
            scale: "4x".into(),
            palette: "Grayscale".into(),
            scanlines: false,
        }
    }
}

impl Default for Speed {
    fn default() -> Self {
        Speed { throttle: true }
    }
}

impl Config {
    fn config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("gb_core");
        path.push("config.toml");
        path
    }

    /// Load the user config, writing defaults on first run. Any failure is
    /// logged and the defaults are used instead.
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            let config = Config::default();
            match config.save_to(&path) {
                Ok(()) => log::info!("Wrote default config to {}", path.display()),
                Err(e) => log::warn!("{}", e),
            }
            return config;
        }
        match Config::load_from(&path) {
            Ok(config) => {
                log::debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{}; using defaults", e);
                Config::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Config::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(io_err)
    }

    pub fn cpu_options(&self) -> CpuOptions {
        CpuOptions {
            strict_interrupts: self.cpu.strict_interrupts,
            memory_operand_timing: self.cpu.memory_operand_timing,
        }
    }

    pub fn scale(&self) -> Scale {
        match self.display.scale.as_str() {
            "1x" => Scale::X1,
            "2x" => Scale::X2,
            "4x" => Scale::X4,
            "8x" => Scale::X8,
            other => {
                log::warn!("Unknown scale '{}' in config; using 4x", other);
                Scale::X4
            }
        }
    }

    pub fn palette(&self) -> Palette {
        Palette::from_name(&self.display.palette).unwrap_or_else(|| {
            log::warn!("Unknown palette '{}' in config; using Grayscale", self.display.palette);
            Palette::Grayscale
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("[cpu]"));
        assert!(text.contains("memory_operand_timing = true"));
        assert_eq!(Config::parse(&text).unwrap(), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config = Config::parse("[cpu]\nstrict_interrupts = true\n").unwrap();
        assert!(config.cpu.strict_interrupts);
        assert!(config.cpu.memory_operand_timing);
        assert!(!config.cpu.skip_boot);
        assert_eq!(config.display, Display::default());
        assert!(config.speed.throttle);
    }

    #[test]
    fn invalid_file_is_rejected() {
        assert!(Config::parse("[cpu]\nstrict_interrupts = \"yes\"\n").is_err());
        assert!(Config::parse("not toml at all [").is_err());
    }

    #[test]
    fn cpu_options_follow_config() {
        let mut config = Config::default();
        config.cpu.memory_operand_timing = false;
        config.cpu.strict_interrupts = true;
        let options = config.cpu_options();
        assert!(options.strict_interrupts);
        assert!(!options.memory_operand_timing);
    }

    #[test]
    fn unknown_display_names_fall_back() {
        let mut config = Config::default();
        config.display.palette = "Sepia".into();
        assert_eq!(config.palette(), Palette::Grayscale);
        config.display.palette = "Green".into();
        assert_eq!(config.palette(), Palette::Green);
    }

    #[test]
    fn save_then_load_from_disk() {
        let path = std::env::temp_dir()
            .join(format!("gb_core_config_test_{}", std::process::id()))
            .join("config.toml");
        let mut config = Config::default();
        config.cpu.skip_boot = true;
        config.display.scale = "2x".into();
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join("gb_core_definitely_missing.toml");
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Io { .. })));
    }
}
