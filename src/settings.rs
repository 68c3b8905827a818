// Module settings, stored as JSON next to the world data.
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::save::DEFAULT_PACK;

pub const SETTINGS_PATH: &str = "./data/settings.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub enable_visual_effects: bool, // Show the toll marker on the character sheet.
    pub content_pack: String,        // Pack holding the marker's effect template.
    pub effect_name: String,
    pub effect_slug: String,
    pub debug_mode: bool, // Log computations at debug level.
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            enable_visual_effects: true,
            content_pack: DEFAULT_PACK.to_string(),
            effect_name: "Vestige's Toll".to_string(),
            effect_slug: "vestiges-toll".to_string(),
            debug_mode: false,
        }
    }
}

impl Settings {
    // Load settings from the default path, falling back to defaults when the file is absent.
    pub fn load() -> io::Result<Self> {
        if !Path::new(SETTINGS_PATH).exists() {
            return Ok(Self::default());
        }
        Self::load_settings_from_file(SETTINGS_PATH)
    }

    pub fn load_settings_from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let data = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&data)?;
        Ok(settings)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(path)?;
        file.write_all(data.as_bytes())?;
        Ok(())
    }
}
