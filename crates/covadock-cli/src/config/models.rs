use covadock::engine::config::PipelineConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Everything a docking command needs after merging flags, file and defaults.
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub obabel_path: PathBuf,
    /// `None` disables the per-process timeout.
    pub timeout: Option<Duration>,
    pub catalogue_path: Option<PathBuf>,
}
