use crate::threshold::ThresholdBounds;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration, read from `~/.liveview/config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub thresholds: ThresholdConfig,
    pub ui: UiConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub latency_ms: u64,
    pub request_timeout_ms: u64,
    pub backend: Option<String>,
    pub backend_args: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            latency_ms: 120,
            request_timeout_ms: 5000,
            backend: None,
            backend_args: Vec::new(),
        }
    }
}

/// Threshold limits and input behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub lower_bound: i32,
    pub upper_bound: i32,
    pub default_min: i32,
    pub default_max: i32,
    pub debounce_ms: u64,
    pub reset_on_stop: bool,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            lower_bound: 0,
            upper_bound: 100,
            default_min: 0,
            default_max: 100,
            debounce_ms: 0,
            reset_on_stop: true,
        }
    }
}

impl ThresholdConfig {
    pub fn bounds(&self) -> ThresholdBounds {
        ThresholdBounds {
            lower: self.lower_bound,
            upper: self.upper_bound,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub notice_ttl_ms: u64,
    pub tick_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            notice_ttl_ms: 4000,
            tick_ms: 50,
        }
    }
}

impl UiConfig {
    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Config {
    /// Load config from `path`, or the default location, falling back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Path to the config file
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".liveview")
            .join("config.toml")
    }

    /// Apply `LIVEVIEW_BACKEND` and `LIVEVIEW_LATENCY_MS` overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("LIVEVIEW_BACKEND").filter(|b| !b.trim().is_empty()) {
            self.gateway.backend = Some(backend);
        }
        if let Some(latency) = lookup("LIVEVIEW_LATENCY_MS") {
            self.gateway.latency_ms = latency
                .trim()
                .parse()
                .with_context(|| format!("LIVEVIEW_LATENCY_MS must be an integer, got '{}'", latency))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        if t.lower_bound > t.upper_bound {
            bail!(
                "thresholds.lower_bound ({}) exceeds thresholds.upper_bound ({})",
                t.lower_bound,
                t.upper_bound
            );
        }
        let bounds = t.bounds();
        if !bounds.contains(t.default_min) || !bounds.contains(t.default_max) {
            bail!(
                "threshold defaults {}..{} must lie within {}..={}",
                t.default_min,
                t.default_max,
                t.lower_bound,
                t.upper_bound
            );
        }
        if t.default_min > t.default_max {
            bail!(
                "thresholds.default_min ({}) exceeds thresholds.default_max ({})",
                t.default_min,
                t.default_max
            );
        }
        if self.ui.tick_ms == 0 {
            bail!("ui.tick_ms must be greater than zero");
        }
        Ok(())
    }
}
