use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::input::{
    InputNormalizer, DEFAULT_DEADZONE, DEFAULT_GAMEPAD_SENSITIVITY, DEFAULT_MOUSE_SENSITIVITY,
    DEFAULT_RESPONSE_CURVE,
};

/// Persisted input settings, grouped per device the way the on-disk
/// document is laid out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub mouse: MouseProfile,
    pub gamepad: GamepadProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MouseProfile {
    pub sensitivity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GamepadProfile {
    pub sensitivity: f64,
    pub deadzone: f64,
    pub response_curve: f64,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            mouse: MouseProfile {
                sensitivity: DEFAULT_MOUSE_SENSITIVITY,
            },
            gamepad: GamepadProfile {
                sensitivity: DEFAULT_GAMEPAD_SENSITIVITY,
                deadzone: DEFAULT_DEADZONE,
                response_curve: DEFAULT_RESPONSE_CURVE,
            },
        }
    }
}

impl Profile {
    /// Pushes the stored values through the normalizer's clamped setters,
    /// so an out-of-range value in a hand-edited file lands in range.
    pub fn apply(&self, input: &mut InputNormalizer) {
        input.set_mouse_sensitivity(self.mouse.sensitivity);
        input.set_gamepad_sensitivity(self.gamepad.sensitivity);
        input.set_deadzone(self.gamepad.deadzone);
        input.set_response_curve(self.gamepad.response_curve);
    }
}

impl From<&InputNormalizer> for Profile {
    fn from(input: &InputNormalizer) -> Self {
        Self {
            mouse: MouseProfile {
                sensitivity: input.mouse_sensitivity(),
            },
            gamepad: GamepadProfile {
                sensitivity: input.gamepad_sensitivity(),
                deadzone: input.deadzone(),
                response_curve: input.response_curve(),
            },
        }
    }
}

pub trait ProfileStore {
    /// Never fails; a missing or corrupt file yields the defaults.
    fn load(&self) -> Profile;
    fn save(&self, profile: &Profile) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::profile_path().unwrap_or_else(|| PathBuf::from("flik_profile.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileStore for FileProfileStore {
    fn load(&self) -> Profile {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(profile) = serde_json::from_slice::<Profile>(&bytes) {
                return profile;
            }
        }
        Profile::default()
    }

    fn save(&self, profile: &Profile) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(profile).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_profile() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.json");
        let store = FileProfileStore::with_path(&path);
        let profile = Profile::default();
        store.save(&profile).unwrap();
        let loaded = store.load();
        assert_eq!(profile, loaded);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileProfileStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load(), Profile::default());
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(&path, b"{ not json").unwrap();
        let store = FileProfileStore::with_path(&path);
        assert_eq!(store.load(), Profile::default());
    }

    #[test]
    fn document_uses_nested_device_keys() {
        let profile = Profile::default();
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json["mouse"]["sensitivity"].is_number());
        assert!(json["gamepad"]["deadzone"].is_number());
        assert!(json["gamepad"]["response_curve"].is_number());
    }

    #[test]
    fn saved_settings_roundtrip_through_clamping() {
        let dir = tempdir().unwrap();
        let store = FileProfileStore::with_path(dir.path().join("profile.json"));

        // Out-of-range values clamp at assignment, so the snapshot that
        // gets saved is already in range.
        let mut input = InputNormalizer::new();
        input.set_mouse_sensitivity(42.0);
        input.set_deadzone(0.7);
        input.set_gamepad_sensitivity(650.0);
        input.set_response_curve(2.0);

        store.save(&Profile::from(&input)).unwrap();

        let mut restored = InputNormalizer::new();
        store.load().apply(&mut restored);
        assert_eq!(restored.mouse_sensitivity(), 5.0);
        assert_eq!(restored.deadzone(), 0.3);
        assert_eq!(restored.gamepad_sensitivity(), 650.0);
        assert_eq!(restored.response_curve(), 2.0);
    }
}
