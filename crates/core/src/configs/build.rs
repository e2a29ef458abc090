use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{PipelineError, PipelineResult};

/// File name looked up at the project root
pub const CONFIG_FILE_NAME: &str = "assetpipe.yml";

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct BuildConfig {
    /// Root of the vendored UI library; its `dist/` holds the css, js and fonts to copy.
    pub dependency_root: PathBuf,
    /// Project source tree receiving `styles/`, `scripts/` and `fonts/`.
    pub web_root: PathBuf,
    /// Treat a copy glob that matches nothing as an error.
    pub strict_copy: bool,
    /// Elm source of the game, relative to `webRoot`.
    pub tic_tac_toe_source: PathBuf,
    pub compiler: CompilerConfig,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct CompilerConfig {
    /// Executable invoked to compile the Elm source.
    pub program: String,
    /// Arguments placed before the source path.
    pub args: Vec<String>,
    /// Emit compiler warnings.
    pub warn: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            dependency_root: PathBuf::from("bower_components/bootstrap"),
            web_root: PathBuf::from("src"),
            strict_copy: false,
            tic_tac_toe_source: PathBuf::from("scripts/tictactoe.elm"),
            compiler: CompilerConfig::default(),
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: "elm-make".to_string(),
            args: vec!["--yes".to_string()],
            warn: false,
        }
    }
}

impl BuildConfig {
    /// Load `assetpipe.yml` from the project root, or the defaults when it is absent
    pub fn load(project_root: &Path) -> PipelineResult<Self> {
        let config_path = project_root.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            log::debug!(
                "No {} in {}, using defaults",
                CONFIG_FILE_NAME,
                project_root.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read build config {}: {}",
                config_path.display(),
                e
            ))
        })?;

        parse_build_config(&content).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to parse build config {}: {}",
                config_path.display(),
                e
            ))
        })
    }

    /// JSON schema of the configuration file
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(BuildConfig)).unwrap_or_default()
    }

    pub fn dist_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.dependency_root).join("dist")
    }

    pub fn web_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.web_root)
    }
}

pub fn parse_build_config(yaml_str: &str) -> PipelineResult<BuildConfig> {
    serde_yaml::from_str(yaml_str).map_err(|e| PipelineError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_bower_layout() {
        let config = BuildConfig::default();
        let root = Path::new("/project");
        assert_eq!(
            config.dist_dir(root),
            PathBuf::from("/project/bower_components/bootstrap/dist")
        );
        assert_eq!(config.web_dir(root), PathBuf::from("/project/src"));
        assert!(!config.strict_copy);
        assert!(!config.compiler.warn);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = parse_build_config("webRoot: public\ncompiler:\n  warn: true\n").unwrap();
        assert_eq!(config.web_root, PathBuf::from("public"));
        assert_eq!(config.dependency_root, PathBuf::from("bower_components/bootstrap"));
        assert!(config.compiler.warn);
        assert_eq!(config.compiler.program, "elm-make");
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = parse_build_config("webroot: public\n").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = BuildConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config, BuildConfig::default());
    }

    #[test]
    fn test_load_reads_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "strictCopy: true\ndependencyRoot: vendor/bootstrap\n",
        )
        .unwrap();
        let config = BuildConfig::load(temp_dir.path()).unwrap();
        assert!(config.strict_copy);
        assert_eq!(config.dependency_root, PathBuf::from("vendor/bootstrap"));
    }

    #[test]
    fn test_schema_lists_fields() {
        let schema = BuildConfig::json_schema().to_string();
        assert!(schema.contains("dependencyRoot"));
        assert!(schema.contains("ticTacToeSource"));
    }
}
