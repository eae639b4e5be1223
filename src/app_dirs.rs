use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Input profile document, under the platform config dir.
    pub fn profile_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "flik").map(|pd| pd.config_dir().join("profile.json"))
    }

    /// Per-mode session CSV logs, under the platform data dir.
    pub fn sessions_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "flik").map(|pd| pd.data_local_dir().join("sessions"))
    }
}
