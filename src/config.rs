//! Configuration management (TOML)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub general: GeneralConfig,
    pub file: FileMonitorConfig,
    pub network: NetworkMonitorConfig,
    pub process: ProcessMonitorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub poll_interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMonitorConfig {
    pub watch_dir: PathBuf,
    pub window_seconds: u64,
    pub max_writes_in_window: usize,
    pub max_size_growth_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkMonitorConfig {
    pub window_seconds: u64,
    pub max_connections: u64,
    pub repeated_threshold: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessMonitorConfig {
    pub runtime_threshold_seconds: u64,
    pub whitelist: Vec<String>,
    pub malicious_marker: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            general: GeneralConfig {
                poll_interval_seconds: 10,
            },
            file: FileMonitorConfig {
                watch_dir: PathBuf::from("/tmp/keywatch-watch"),
                window_seconds: 30,
                max_writes_in_window: 1,
                max_size_growth_bytes: 10,
            },
            network: NetworkMonitorConfig {
                window_seconds: 60,
                max_connections: 10,
                repeated_threshold: 3,
            },
            process: ProcessMonitorConfig {
                runtime_threshold_seconds: 60,
                whitelist: vec![
                    "systemd".to_string(),
                    "init".to_string(),
                    "kthreadd".to_string(),
                    "dbus-daemon".to_string(),
                    "sshd".to_string(),
                    "bash".to_string(),
                    "zsh".to_string(),
                    "login".to_string(),
                    "NetworkManager".to_string(),
                    "Xorg".to_string(),
                    "gnome-shell".to_string(),
                    "pipewire".to_string(),
                    "pulseaudio".to_string(),
                    "firefox".to_string(),
                    "chrome".to_string(),
                    "chromium".to_string(),
                    "code".to_string(),
                    "dockerd".to_string(),
                    "containerd".to_string(),
                ],
                malicious_marker: "fake_logger.py".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "keywatch")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
