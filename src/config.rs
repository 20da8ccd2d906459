//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/bstview/bstview.toml`
//! 3. Local config: `<project_dir>/.bstview.toml`
//! 4. Environment variables: `BSTVIEW__SECTION__KEY`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::application::ApplicationError;
use crate::domain::{Canvas, ScaleExtent, Theme};

/// Tree store connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the store API (default: http://localhost:8080)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Default SVG file for render commands
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("tree.svg"),
        }
    }
}

/// Unified configuration for bstview.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    pub store: StoreConfig,
    pub canvas: Canvas,
    pub theme: Theme,
    pub zoom: ScaleExtent,
    pub output: OutputConfig,
}

/// Get the XDG config directory for bstview.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "bstview").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("bstview.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".bstview.toml")
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional directory holding a local `.bstview.toml`
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), project_dir, None)
    }

    /// Load settings from explicit layers.
    ///
    /// `env` replaces the process environment when given; keys use the same
    /// `BSTVIEW__SECTION__KEY` form.
    pub fn load_from(
        global: Option<&Path>,
        project_dir: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let defaults = Config::try_from(&Settings::default()).map_err(config_err)?;
        let mut builder = Config::builder().add_source(defaults);

        if let Some(global_path) = global {
            builder = builder.add_source(File::from(global_path).required(false));
        }
        if let Some(dir) = project_dir {
            builder = builder.add_source(File::from(local_config_path(dir)).required(false));
        }
        builder = builder.add_source(
            Environment::with_prefix("BSTVIEW")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config = builder.build().map_err(config_err)?;
        let mut settings: Self = config.try_deserialize().map_err(config_err)?;

        settings.expand_paths()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Expand `~`, `$VAR` and `${VAR}` in the output path.
    fn expand_paths(&mut self) -> Result<(), ApplicationError> {
        let raw = self.output.path.to_string_lossy().into_owned();
        let expanded = shellexpand::full(&raw).map_err(|e| ApplicationError::Config {
            message: format!("expand output path {raw}: {e}"),
        })?;
        self.output.path = PathBuf::from(expanded.as_ref());
        Ok(())
    }

    /// Reject settings the renderer or store cannot work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        self.canvas.validate()?;
        if !self.zoom.is_valid() {
            return Err(ApplicationError::Config {
                message: format!(
                    "zoom: need 0 < min_scale <= max_scale, got [{}, {}]",
                    self.zoom.min_scale, self.zoom.max_scale
                ),
            });
        }
        if self.theme.node_radius <= 0.0 || !self.theme.node_radius.is_finite() {
            return Err(ApplicationError::Config {
                message: format!("theme.node_radius must be positive: {}", self.theme.node_radius),
            });
        }
        Url::parse(&self.store.base_url).map_err(|e| ApplicationError::Config {
            message: format!("store.base_url {}: {e}", self.store.base_url),
        })?;
        if self.store.timeout_secs == 0 {
            return Err(ApplicationError::Config {
                message: "store.timeout_secs must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r##"# bstview configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/bstview/bstview.toml
#   Local:  <project_dir>/.bstview.toml
#   Env:    BSTVIEW__SECTION__KEY, e.g. BSTVIEW__STORE__BASE_URL

[store]
# base_url = "http://localhost:8080"
# timeout_secs = 10

[canvas]
# width = 800
# height = 600

[canvas.margin]
# top = 50
# right = 50
# bottom = 50
# left = 50

[theme]
# default_color = "#00ff00"
# highlight_color = "#ffffff"
# node_radius = 20
# edge_width = 2
# selected_edge_width = 4
# border_width = 2
# font_family = "Courier New"
# font_size = 14
# label_offset = 25
# hover_offset_x = 10
# hover_offset_y = -10

[zoom]
# min_scale = 0.5
# max_scale = 2.0

[output]
# path = "tree.svg"
"##
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
