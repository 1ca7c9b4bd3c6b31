use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub server_url: String,
    pub protocols: Vec<String>,
    pub default_protocol: String,
    pub step_interval_ms: u64,
    pub link_distance: f32,
    pub charge_strength: f32,
    pub drag_alpha_floor: f32,
    pub link_transition_ms: u64,
    pub node_radius: f32,
    /// Canvas background as RGB.
    pub background: [u8; 3],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            protocols: vec!["dijkstra".to_string(), "bellman_ford".to_string()],
            default_protocol: "dijkstra".to_string(),
            step_interval_ms: 1200,
            link_distance: 150.0,
            charge_strength: -500.0,
            drag_alpha_floor: 0.3,
            link_transition_ms: 800,
            node_radius: 18.0,
            background: [0xfa, 0xfa, 0xfa],
        }
    }
}

impl ViewerConfig {
    /// Makes the protocol list non-empty and contain the default.
    pub fn normalize(&mut self) {
        self.protocols.retain(|p| !p.trim().is_empty());
        if self.default_protocol.trim().is_empty() {
            self.default_protocol = self
                .protocols
                .first()
                .cloned()
                .unwrap_or_else(|| ViewerConfig::default().default_protocol);
        }
        if !self.protocols.contains(&self.default_protocol) {
            self.protocols.insert(0, self.default_protocol.clone());
        }
    }
}

fn config_file_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "topoviz")?;
    Some(proj.config_dir().join("viewer.toml"))
}

pub fn load_or_default() -> ViewerConfig {
    let Some(path) = config_file_path() else {
        return ViewerConfig::default();
    };
    load_or_default_from_path(&path)
}

fn load_or_default_from_path(path: &Path) -> ViewerConfig {
    let Ok(contents) = fs::read_to_string(path) else {
        return ViewerConfig::default();
    };
    let mut cfg = match toml::from_str::<ViewerConfig>(&contents) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "invalid viewer config, using defaults"
            );
            ViewerConfig::default()
        }
    };
    cfg.normalize();
    cfg
}

pub fn save(cfg: &ViewerConfig) -> anyhow::Result<()> {
    let Some(path) = config_file_path() else {
        return Err(anyhow::anyhow!("no config directory available"));
    };
    save_to_path(cfg, &path)
}

fn save_to_path(cfg: &ViewerConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let data = toml::to_string_pretty(cfg).context("failed to serialize viewer config")?;
    fs::write(path, data)
        .with_context(|| format!("failed to write viewer config {}", path.display()))?;
    Ok(())
}
