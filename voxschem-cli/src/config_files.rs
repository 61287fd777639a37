use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use directories_next::ProjectDirs;
use serde::{Serialize, de::DeserializeOwned};

use voxschem::{BlockId, ColorMapping};

// -------------------------------------------------------------------------------------------------

/// Persistent settings, stored as `settings.json` in the platform configuration directory.
///
/// Command-line options take precedence over these.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub(crate) struct Settings {
    /// Block for voxels whose color has no block.
    pub default_block: Option<BlockId>,

    /// Path of an explicit color mapping file to use.
    pub mapping: Option<PathBuf>,
}

/// Load settings from a platform-appropriate read/write location,
/// creating the file with default contents if it does not exist.
///
/// This does not respect command-line options. Use [`SettingsArgs`] for that.
pub(crate) fn load_config() -> Result<Settings, anyhow::Error> {
    if std::env::var("VOXSCHEM_DO_NOT_USE_CONFIG_FILES_IN_TESTS").is_ok() {
        panic!(
            "tests should be hermetic and not touch user config files \
            (environment variable VOXSCHEM_DO_NOT_USE_CONFIG_FILES_IN_TESTS set, \
            but --no-config-files not passed)"
        );
    }

    let project_dirs = ProjectDirs::from("", "", "voxschem")
        .ok_or_else(|| anyhow::anyhow!("could not find configuration directory"))?;
    fs::create_dir_all(project_dirs.config_dir())?;

    Ok(read_or_create_default_json_file(
        "settings",
        &project_dirs.config_dir().join("settings.json"),
        Settings::default,
    ))
}

// -------------------------------------------------------------------------------------------------

/// [`clap::Args`] argument group struct for args that affect what settings are used.
#[derive(Clone, Debug, clap::Args)]
pub(crate) struct SettingsArgs {
    /// Ignore all configuration files, using only defaults and command-line options.
    #[arg(long = "no-config-files")]
    pub no_config_files: bool,
}

impl SettingsArgs {
    /// Returns the [`Settings`] to use, given these args.
    pub fn load(&self) -> Result<Settings, anyhow::Error> {
        if self.no_config_files {
            Ok(Settings::default())
        } else {
            load_config().context("Error loading configuration files")
        }
    }
}

/// Reads an explicit color mapping file: a JSON array of
/// `{"color": [r, g, b], "numeric_id": "<id>:<meta>"}` objects.
pub(crate) fn read_mapping_file(path: &Path) -> Result<Vec<ColorMapping>, anyhow::Error> {
    let file = File::open(path)
        .with_context(|| format!("failed to open mapping file '{}'", path.display()))?;
    let mapping: Vec<ColorMapping> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("invalid mapping file '{}'", path.display()))?;
    log::debug!(
        "loaded {count} color mappings from {path}",
        count = mapping.len(),
        path = path.display()
    );
    Ok(mapping)
}

// -------------------------------------------------------------------------------------------------

fn read_or_create_default_json_file<V: DeserializeOwned + Serialize>(
    description: &str,
    path: &Path,
    default: fn() -> V,
) -> V {
    match File::open(path) {
        Ok(file) => match serde_json::from_reader(BufReader::new(file)) {
            Ok(value) => {
                log::trace!(
                    "Loaded {description} from {path}",
                    path = path.to_string_lossy()
                );
                value
            }
            Err(e) => {
                log::warn!(
                    "Syntax error in {description} loaded from {path}; \
                    using default values. Error: {e}",
                    path = path.to_string_lossy(),
                );
                default()
            }
        },
        Err(open_for_read_error) if open_for_read_error.kind() == std::io::ErrorKind::NotFound => {
            log::info!(
                "No {description} file found; creating {path}",
                path = path.to_string_lossy()
            );
            let value = default();
            let written = serde_json::to_string_pretty(&value)
                .map_err(std::io::Error::from)
                .and_then(|json_text| fs::write(path, json_text.as_bytes()));
            match written {
                Ok(()) => log::trace!(
                    "Wrote default {description} to {path}",
                    path = path.to_string_lossy()
                ),
                Err(write_error) => {
                    log::error!(
                        "Error while writing default {description} file {path}: {write_error}",
                        path = path.to_string_lossy(),
                    );
                }
            }
            value
        }
        Err(e) => {
            log::error!(
                "Error while reading {description} file {path}: {e}",
                path = path.to_string_lossy(),
            );
            default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn settings_json() {
        let settings: Settings =
            serde_json::from_str(r#"{"default_block": "35:14", "mapping": "colors.json"}"#)
                .unwrap();
        assert_eq!(
            settings,
            Settings {
                default_block: Some(BlockId::new(35, 14)),
                mapping: Some(PathBuf::from("colors.json")),
            }
        );
        assert_eq!(
            serde_json::from_str::<Settings>("{}").unwrap(),
            Settings::default()
        );
    }

    #[test]
    fn creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = read_or_create_default_json_file("settings", &path, Settings::default);
        assert_eq!(settings, Settings::default());
        assert!(path.exists());

        fs::write(&path, r#"{"default_block": "5"}"#).unwrap();
        let settings = read_or_create_default_json_file("settings", &path, Settings::default);
        assert_eq!(settings.default_block, Some(BlockId::new(5, 0)));
    }

    #[test]
    fn invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{").unwrap();
        assert_eq!(
            read_or_create_default_json_file("settings", &path, Settings::default),
            Settings::default()
        );
    }

    #[test]
    fn mapping_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.json");
        fs::write(
            &path,
            r#"[{"color": [255, 0, 0], "numeric_id": "35:14"}]"#,
        )
        .unwrap();
        assert_eq!(
            read_mapping_file(&path).unwrap(),
            vec![ColorMapping {
                color: voxschem::color::Color::opaque(255, 0, 0),
                block: BlockId::new(35, 14),
            }]
        );

        fs::write(&path, r#"[{"color": [255, 0, 0], "numeric_id": "red"}]"#).unwrap();
        let error = read_mapping_file(&path).unwrap_err();
        assert_eq!(
            error.to_string(),
            format!("invalid mapping file '{}'", path.display())
        );
    }
}
