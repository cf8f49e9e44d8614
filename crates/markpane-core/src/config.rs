//! User configuration, read from `config.toml`.
//!
//! Every key is optional; missing keys fall back to the defaults below.
//!
//! ```toml
//! [files]
//! filter_name = "Markdown files"
//! extensions = ["md"]
//! track_path = false
//!
//! [preview]
//! debounce_ms = 0
//! base_url = ""
//!
//! [window]
//! width = 800.0
//! height = 600.0
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::{ConfigError, FileFilter, FileLifecycle, session::SessionOptions};

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "MARKPANE_CONFIG";

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub files: FilesConfig,
    pub preview: PreviewConfig,
    pub window: WindowConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilesConfig {
    pub filter_name: String,
    pub extensions: Vec<String>,
    pub track_path: bool,
}

impl Default for FilesConfig {
    fn default() -> Self {
        let filter = FileFilter::default();
        Self {
            filter_name: filter.name,
            extensions: filter.extensions,
            track_path: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewConfig {
    pub debounce_ms: u64,
    pub base_url: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read `path`. A missing file yields the defaults.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(source) => Self::from_toml_str(&source),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Load from [`default_path`], falling back to the defaults on any error.
    pub fn load() -> Self {
        let Some(path) = default_path() else {
            return Self::default();
        };
        match Self::from_path(&path) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "config loaded");
                config
            }
            Err(err) => {
                tracing::warn!(%err, "using default config");
                Self::default()
            }
        }
    }

    pub fn file_filter(&self) -> FileFilter {
        let extensions = self
            .files
            .extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_owned())
            .filter(|ext| !ext.is_empty())
            .collect::<Vec<_>>();
        if extensions.is_empty() {
            return FileFilter::default();
        }
        FileFilter {
            name: self.files.filter_name.clone(),
            extensions,
        }
    }

    pub fn lifecycle(&self) -> FileLifecycle {
        FileLifecycle::new(self.file_filter(), self.files.track_path)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            debounce: Duration::from_millis(self.preview.debounce_ms),
            base_url: self.preview.base_url.clone(),
        }
    }
}

/// `$MARKPANE_CONFIG`, else `<config dir>/markpane/config.toml`.
pub fn default_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("markpane").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk_io::tests::make_temp_dir;

    #[test]
    fn empty_config_is_default() {
        let config = Config::from_toml_str("");
        assert!(matches!(config, Ok(ref c) if *c == Config::default()));
    }

    #[test]
    fn defaults_prompt_on_save_and_render_every_edit() {
        let config = Config::default();
        assert_eq!(config.file_filter(), FileFilter::default());
        assert!(!config.files.track_path);
        assert_eq!(config.session_options().debounce, Duration::ZERO);
        assert_eq!(config.session_options().base_url, "");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let source = "[files]\nextensions = [\".markdown\", \"md\"]\ntrack_path = true\n\n[preview]\ndebounce_ms = 150\n";
        let Ok(config) = Config::from_toml_str(source) else {
            panic!("config should parse");
        };
        assert_eq!(config.file_filter().extensions, ["markdown", "md"]);
        assert_eq!(config.file_filter().name, "Markdown files");
        assert!(config.files.track_path);
        assert_eq!(
            config.session_options().debounce,
            Duration::from_millis(150)
        );
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn empty_extension_list_falls_back_to_markdown() {
        let Ok(config) = Config::from_toml_str("[files]\nextensions = []\n") else {
            panic!("config should parse");
        };
        assert_eq!(config.file_filter(), FileFilter::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = Config::from_toml_str("[preview]\ndebounce = 5\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_default() {
        let dir = make_temp_dir("markpane-config-missing-test");
        let config = Config::from_path(&dir.join("config.toml"));
        assert!(matches!(config, Ok(ref c) if *c == Config::default()));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn reads_file_from_disk() {
        let dir = make_temp_dir("markpane-config-read-test");
        let path = dir.join("config.toml");
        fs::write(&path, "[window]\nwidth = 1024.0\n").ok();

        let config = Config::from_path(&path);
        assert!(matches!(config, Ok(ref c) if c.window.width > 1000.0 && c.window.height > 500.0));

        let _ = fs::remove_dir_all(&dir);
    }
}
