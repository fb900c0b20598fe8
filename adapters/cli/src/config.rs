//! TOML configuration for the command-line adapter.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use mapwright_core::Symmetry;
use mapwright_system_playback::PlaybackConfig;
use serde::Deserialize;

const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// Settings resolved from the optional configuration file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CliConfig {
    /// Timeline tunables used by `replay`.
    pub(crate) playback: PlaybackConfig,
    /// Symmetry used by `new-map` when none is given on the command line.
    pub(crate) default_symmetry: Symmetry,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig::default(),
            default_symmetry: Symmetry::Rotational,
        }
    }
}

impl CliConfig {
    /// Loads the configuration at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        parse_config(&contents)
            .with_context(|| format!("invalid configuration at {}", path.display()))
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    version: u32,
    #[serde(default)]
    playback: PlaybackConfig,
    #[serde(default)]
    editor: EditorSection,
}

#[derive(Debug, Default, Deserialize)]
struct EditorSection {
    default_symmetry: Option<u8>,
}

fn parse_config(contents: &str) -> Result<CliConfig> {
    let file: ConfigFile =
        toml::from_str(contents).context("failed to parse configuration toml contents")?;
    if file.version != SUPPORTED_CONFIG_VERSION {
        bail!(
            "unsupported configuration version {}; expected {}",
            file.version,
            SUPPORTED_CONFIG_VERSION
        );
    }
    file.playback
        .validate()
        .context("invalid [playback] section")?;

    let default_symmetry = match file.editor.default_symmetry {
        Some(tag) => Symmetry::from_tag(tag).context("invalid [editor] default_symmetry")?,
        None => Symmetry::Rotational,
    };

    Ok(CliConfig {
        playback: file.playback,
        default_symmetry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = CliConfig::load(None).expect("defaults load");
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.playback.snapshot_interval, 50);
    }

    #[test]
    fn sections_are_optional() {
        let config = parse_config("version = 1").expect("minimal config parses");
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn sections_override_defaults() {
        let config = parse_config(
            r#"
            version = 1

            [playback]
            snapshot_interval = 10

            [editor]
            default_symmetry = 2
            "#,
        )
        .expect("config parses");
        assert_eq!(config.playback.snapshot_interval, 10);
        assert_eq!(config.default_symmetry, Symmetry::Vertical);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let result = parse_config("version = 2");
        assert!(result.is_err(), "version 2 should be rejected");
    }

    #[test]
    fn zero_snapshot_interval_is_rejected() {
        let result = parse_config(
            r#"
            version = 1
            [playback]
            snapshot_interval = 0
            "#,
        );
        assert!(result.is_err(), "zero interval should be rejected");
    }

    #[test]
    fn unknown_symmetry_tag_is_rejected() {
        let result = parse_config(
            r#"
            version = 1
            [editor]
            default_symmetry = 3
            "#,
        );
        assert!(result.is_err(), "tag 3 should be rejected");
    }
}
