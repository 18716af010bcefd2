//! User preferences that survive restarts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::lut::Delimiter;
use crate::point_editor::{DEFAULT_HIT_RADIUS, MAX_HIT_RADIUS, MIN_HIT_RADIUS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Screen-space distance within which a press grabs a point
    pub hit_radius: f32,
    pub delimiter: Delimiter,
    pub dark_mode: Option<bool>, // None = follow system, Some(true) = force dark, Some(false) = force light
    pub last_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hit_radius: DEFAULT_HIT_RADIUS,
            delimiter: Delimiter::default(),
            dark_mode: None,
            last_dir: None,
        }
    }
}

impl Settings {
    /// Restore from persisted storage, falling back to defaults
    pub fn restore(storage: Option<&dyn eframe::Storage>) -> Self {
        let mut settings: Self = storage
            .and_then(|s| eframe::get_value(s, eframe::APP_KEY))
            .unwrap_or_default();
        settings.hit_radius = settings.hit_radius.clamp(MIN_HIT_RADIUS, MAX_HIT_RADIUS);
        settings
    }

    pub fn persist(&self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    /// Remember the directory of a file the user just picked
    pub fn remember_dir(&mut self, picked: &Path) {
        if let Some(dir) = picked.parent() {
            self.last_dir = Some(dir.to_path_buf());
        }
    }

    /// Cycle System -> Dark -> Light -> System
    pub fn cycle_theme(&mut self) {
        self.dark_mode = match self.dark_mode {
            None => Some(true),
            Some(true) => Some(false),
            Some(false) => None,
        };
    }
}
