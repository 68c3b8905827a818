use crate::host::EffectTemplate;
use crate::memory::CharacterRecord;

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, create_dir_all, write};
use std::path::Path;

use crate::error::Result;

pub const DEFAULT_PACK: &str = "vestige-of-yimyar.vestige-features";

// Characters and content packs of one table, as stored on disk.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WorldFile {
    #[serde(default)]
    pub characters: Vec<CharacterRecord>,
    #[serde(default)]
    pub packs: BTreeMap<String, Vec<EffectTemplate>>,
}

impl WorldFile {
    // The module's own pack with the toll effect template.
    pub fn default_packs() -> BTreeMap<String, Vec<EffectTemplate>> {
        let mut packs = BTreeMap::new();
        packs.insert(
            DEFAULT_PACK.to_string(),
            vec![EffectTemplate {
                name: "Vestige's Toll".to_string(),
                slug: Some("vestiges-toll".to_string()),
                description: "Your maximum hit points are reduced by the toll you have paid."
                    .to_string(),
            }],
        );
        packs
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut world: WorldFile = serde_json::from_reader(file)?;
        if world.packs.is_empty() {
            world.packs = Self::default_packs();
        }
        debug!(
            "loaded {} character(s) from {}",
            world.characters.len(),
            path.display()
        );
        Ok(world)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(self)?;
        write(path, serialized)?;
        Ok(())
    }
}
