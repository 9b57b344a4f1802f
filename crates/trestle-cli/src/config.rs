//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).
//! A configuration file can override the layout constants and seed the
//! initial session options, for example:
//!
//! ```toml
//! [layout]
//! arc_radius = 12.0
//! internal_alignment = "left"
//!
//! [options]
//! showArrows = false
//! start = "complex"
//! ```

use std::{fs, path::Path};

use directories::ProjectDirs;
use log::{debug, info};

use trestle::config::RenderConfig;

use crate::CliError;

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (trestle.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<RenderConfig, CliError> {
    // 1. Try the explicitly provided path first if available
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    // 2. Try the local project directory
    let local_config = Path::new("trestle.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    // 3. Try the platform-specific config directory
    if let Some(proj_dirs) = ProjectDirs::from("com", "trestle", "trestle") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    // 4. If no config is found, return default config
    debug!("No configuration file found, using default configuration");
    Ok(RenderConfig::default())
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if the file cannot be read or the TOML fails to parse.
fn load_config_file(path: impl AsRef<Path>) -> Result<RenderConfig, CliError> {
    let content = fs::read_to_string(path.as_ref())?;
    toml::from_str(&content).map_err(|err| CliError::Config(err.to_string()))
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn explicit_config_overrides_layout_and_options() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "[layout]\narc_radius = 12.0\n\n[options]\nshowArrows = false\nstart = \"complex\"\n"
        )
        .expect("writes");

        let config = load_config(Some(file.path())).expect("loads");
        assert_eq!(config.layout.arc_radius, 12.0);
        assert_eq!(config.layout.vertical_separation, 8.0);
        assert!(!config.options.show_arrows);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[layout\narc_radius = ").expect("writes");

        let err = load_config(Some(file.path())).expect_err("rejects");
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn missing_explicit_path_is_an_io_error() {
        let err = load_config(Some("/definitely/not/here.toml")).expect_err("rejects");
        assert!(matches!(err, CliError::Io(_)));
    }
}
