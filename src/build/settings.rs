//! Resolved, immutable settings for one build run

use crate::config::Config;
use crate::error::{StageCacheError, StageCacheResult};
use crate::process::Invocation;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Whether the build tool starts stages from a clean rootfs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    #[default]
    Clean,
    Resume,
}

impl BuildMode {
    /// Value of the clean flag variable
    pub fn flag_value(&self) -> &'static str {
        match self {
            Self::Clean => "1",
            Self::Resume => "0",
        }
    }
}

/// Everything the controller needs to know, with all paths absolute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    pub stage_count: usize,
    pub source_dir: PathBuf,
    pub work_dir: PathBuf,
    pub marker_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub command: Vec<String>,
    pub clean_var: String,
    pub env: BTreeMap<String, String>,
}

impl BuildSettings {
    /// Resolve configuration against the build tree at `source_dir`
    pub fn resolve(config: &Config, source_dir: &Path) -> StageCacheResult<Self> {
        if config.build.stage_count == 0 {
            return Err(StageCacheError::InvalidSetting {
                key: "build.stage_count".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if config.build.command.is_empty() {
            return Err(StageCacheError::InvalidSetting {
                key: "build.command".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if config.build.clean_var.is_empty() {
            return Err(StageCacheError::InvalidSetting {
                key: "build.clean_var".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        let work_dir = source_dir.join(&config.paths.work_dir);
        let marker_dir = match config.paths.marker_dir {
            Some(ref dir) => source_dir.join(dir),
            None => work_dir.clone(),
        };

        Ok(Self {
            stage_count: config.build.stage_count,
            source_dir: source_dir.to_path_buf(),
            work_dir,
            marker_dir,
            cache_dir: source_dir.join(&config.paths.cache_dir),
            command: config.build.command.clone(),
            clean_var: config.build.clean_var.clone(),
            env: config.build.env.clone(),
        })
    }

    /// Invocation of the build tool for `mode`
    pub fn build_invocation(&self, mode: BuildMode) -> StageCacheResult<Invocation> {
        let invocation =
            Invocation::from_argv(&self.command).ok_or_else(|| StageCacheError::InvalidSetting {
                key: "build.command".to_string(),
                reason: "must not be empty".to_string(),
            })?;

        Ok(invocation
            .current_dir(&self.source_dir)
            .envs(self.env.iter().map(|(k, v)| (k.clone(), v.clone())))
            .env(self.clean_var.clone(), mode.flag_value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_paths_against_source() {
        let config = Config::default();
        let settings = BuildSettings::resolve(&config, Path::new("/src/pi-gen")).unwrap();

        assert_eq!(
            settings.work_dir,
            PathBuf::from("/src/pi-gen/work/raspios-bookworm-arm64")
        );
        assert_eq!(settings.marker_dir, settings.work_dir);
        // Absolute paths are kept as-is
        assert_eq!(settings.cache_dir, PathBuf::from("/var/cache/stagecache"));
    }

    #[test]
    fn marker_dir_override() {
        let mut config = Config::default();
        config.paths.marker_dir = Some(PathBuf::from("."));
        let settings = BuildSettings::resolve(&config, Path::new("/src")).unwrap();
        assert_eq!(settings.marker_dir, PathBuf::from("/src/."));
    }

    #[test]
    fn rejects_zero_stages() {
        let mut config = Config::default();
        config.build.stage_count = 0;
        let err = BuildSettings::resolve(&config, Path::new("/src")).unwrap_err();
        assert!(err.to_string().contains("build.stage_count"));
    }

    #[test]
    fn rejects_empty_command() {
        let mut config = Config::default();
        config.build.command.clear();
        assert!(BuildSettings::resolve(&config, Path::new("/src")).is_err());
    }

    #[test]
    fn build_invocation_sets_flag_and_env() {
        let mut config = Config::default();
        config.build.env.insert("IMG_NAME".to_string(), "raspios".to_string());
        let settings = BuildSettings::resolve(&config, Path::new("/src")).unwrap();

        let clean = settings.build_invocation(BuildMode::Clean).unwrap();
        assert_eq!(clean.program, "./build.sh");
        assert_eq!(clean.cwd, Some(PathBuf::from("/src")));
        assert_eq!(clean.env.get("CLEAN").map(String::as_str), Some("1"));
        assert_eq!(clean.env.get("IMG_NAME").map(String::as_str), Some("raspios"));

        let resume = settings.build_invocation(BuildMode::Resume).unwrap();
        assert_eq!(resume.env.get("CLEAN").map(String::as_str), Some("0"));
    }

    #[test]
    fn clean_flag_wins_over_env_table() {
        let mut config = Config::default();
        config.build.env.insert("CLEAN".to_string(), "0".to_string());
        let settings = BuildSettings::resolve(&config, Path::new("/src")).unwrap();

        let inv = settings.build_invocation(BuildMode::Clean).unwrap();
        assert_eq!(inv.env.get("CLEAN").map(String::as_str), Some("1"));
    }
}
