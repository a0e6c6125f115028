use crate::error::{CliError, Result};
use covadock::core::scoring::covalent::ScoringPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileEngineConfig {
    pub vina: Option<PathBuf>,
    pub obabel: Option<PathBuf>,
    pub exhaustiveness: Option<u32>,
    pub num_modes: Option<u32>,
    pub timeout_secs: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileBoxConfig {
    pub center: Option<[f64; 3]>,
    pub size: Option<[f64; 3]>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileTargetConfig {
    pub atom_name: Option<String>,
    pub box_size: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileScoringConfig {
    pub policy: Option<ScoringPolicy>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileWorkspaceConfig {
    pub scratch_dir: Option<PathBuf>,
    pub keep: Option<bool>,
    pub remove_heteroatoms: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileWarheadsConfig {
    pub catalogue: Option<PathBuf>,
}

/// A configuration file where every section and key is optional.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub engine: Option<FileEngineConfig>,
    #[serde(rename = "box")]
    pub docking_box: Option<FileBoxConfig>,
    pub target: Option<FileTargetConfig>,
    pub scoring: Option<FileScoringConfig>,
    pub workspace: Option<FileWorkspaceConfig>,
    pub warheads: Option<FileWarheadsConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
