//! In-process host: character records, flag store, embedded items, content
//! packs and a pre-commit hook pipeline, all behind `tokio` mutexes.
//!
//! Used by the `vestige` binary against a world file and by the tests.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::character::{CharacterId, CharacterSnapshot, HitPoints, HpUpdate, RestProfile, UpdateTag};
use crate::error::{Result, VestigeError};
use crate::healing::{self, Interception};
use crate::host::{
    CharacterStore, ContentSource, EffectTemplate, FLAG_SCOPE, MarkerRecord, Notifier, RestRoutine,
};
use crate::ledger::FlagMap;
use crate::message::Notification;
use crate::rest::RestReport;
use crate::save::WorldFile;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub id: CharacterId,
    pub name: String,
    pub hp: HitPoints,
    #[serde(default)]
    pub rest: RestProfile,
    #[serde(default)]
    pub flags: HashMap<String, FlagMap>, // Scope -> key -> value.
    #[serde(default)]
    pub items: Vec<MarkerRecord>,
}

impl CharacterRecord {
    pub fn new(id: &str, name: &str, hp: HitPoints, rest: RestProfile) -> Self {
        CharacterRecord {
            id: CharacterId::new(id),
            name: name.to_string(),
            hp,
            rest,
            flags: HashMap::new(),
            items: Vec::new(),
        }
    }

    pub fn scoped_flags(&self, scope: &str) -> Option<&FlagMap> {
        self.flags.get(scope)
    }

    pub fn toll_markers(&self) -> Vec<&MarkerRecord> {
        self.items.iter().filter(|item| item.is_toll_marker()).collect()
    }
}

/// Runs before every hit point commit and may rewrite the proposed update.
pub type PreUpdateHook =
    Arc<dyn Fn(HitPoints, &FlagMap, &mut HpUpdate, UpdateTag) -> Interception + Send + Sync>;

pub struct MemoryHost {
    characters: Mutex<BTreeMap<CharacterId, CharacterRecord>>,
    packs: Mutex<BTreeMap<String, Vec<EffectTemplate>>>,
    hooks: Vec<PreUpdateHook>,
    fail_updates: AtomicBool,
    fail_rest: AtomicBool,
    rests_taken: AtomicUsize,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::from_world(WorldFile::default())
    }
}

impl MemoryHost {
    pub fn from_world(world: WorldFile) -> Self {
        let characters = world
            .characters
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self {
            characters: Mutex::new(characters),
            packs: Mutex::new(world.packs),
            hooks: Vec::new(),
            fail_updates: AtomicBool::new(false),
            fail_rest: AtomicBool::new(false),
            rests_taken: AtomicUsize::new(0),
        }
    }

    pub fn with_characters(records: Vec<CharacterRecord>) -> Self {
        Self::from_world(WorldFile {
            characters: records,
            packs: WorldFile::default_packs(),
        })
    }

    pub fn with_hook(mut self, hook: PreUpdateHook) -> Self {
        self.hooks.push(hook);
        self
    }

    // Installs the toll healing interceptor as a pre-commit hook.
    pub fn with_vestige_hook(self) -> Self {
        self.with_hook(Arc::new(healing::intercept_flags))
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_rest(&self, fail: bool) {
        self.fail_rest.store(fail, Ordering::SeqCst);
    }

    pub fn rests_taken(&self) -> usize {
        self.rests_taken.load(Ordering::SeqCst)
    }

    pub async fn character(&self, id: &CharacterId) -> Option<CharacterRecord> {
        self.characters.lock().await.get(id).cloned()
    }

    pub async fn set_pack(&self, pack: &str, templates: Vec<EffectTemplate>) {
        self.packs.lock().await.insert(pack.to_string(), templates);
    }

    pub async fn remove_pack(&self, pack: &str) {
        self.packs.lock().await.remove(pack);
    }

    // Test and tooling access: push an item straight onto a character sheet.
    pub async fn push_item(&self, id: &CharacterId, item: MarkerRecord) -> Result<()> {
        self.create_marker(id, item).await
    }

    pub async fn to_world(&self) -> WorldFile {
        WorldFile {
            characters: self.characters.lock().await.values().cloned().collect(),
            packs: self.packs.lock().await.clone(),
        }
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(VestigeError::Persistence("update rejected by host".to_string()));
        }
        Ok(())
    }
}

fn not_found(id: &CharacterId) -> VestigeError {
    VestigeError::CharacterNotFound(id.to_string())
}

impl CharacterStore for MemoryHost {
    async fn snapshot(&self, id: &CharacterId) -> Result<CharacterSnapshot> {
        let characters = self.characters.lock().await;
        let record = characters.get(id).ok_or_else(|| not_found(id))?;
        Ok(CharacterSnapshot {
            id: record.id.clone(),
            name: record.name.clone(),
            hp: record.hp,
        })
    }

    async fn rest_profile(&self, id: &CharacterId) -> Result<RestProfile> {
        let characters = self.characters.lock().await;
        characters.get(id).map(|record| record.rest).ok_or_else(|| not_found(id))
    }

    async fn get_flag(&self, id: &CharacterId, scope: &str, key: &str) -> Result<Option<Value>> {
        let characters = self.characters.lock().await;
        let record = characters.get(id).ok_or_else(|| not_found(id))?;
        Ok(record.flags.get(scope).and_then(|flags| flags.get(key)).cloned())
    }

    async fn set_flag(&self, id: &CharacterId, scope: &str, key: &str, value: Value) -> Result<()> {
        self.check_writable()?;
        let mut characters = self.characters.lock().await;
        let record = characters.get_mut(id).ok_or_else(|| not_found(id))?;
        record
            .flags
            .entry(scope.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn unset_flag(&self, id: &CharacterId, scope: &str, key: &str) -> Result<()> {
        self.check_writable()?;
        let mut characters = self.characters.lock().await;
        let record = characters.get_mut(id).ok_or_else(|| not_found(id))?;
        if let Some(flags) = record.flags.get_mut(scope) {
            flags.remove(key);
            if flags.is_empty() {
                record.flags.remove(scope);
            }
        }
        Ok(())
    }

    async fn update_hit_points(
        &self,
        id: &CharacterId,
        mut update: HpUpdate,
        tag: UpdateTag,
    ) -> Result<()> {
        self.check_writable()?;
        let mut characters = self.characters.lock().await;
        let record = characters.get_mut(id).ok_or_else(|| not_found(id))?;

        let empty = FlagMap::new();
        let flags = record.flags.get(FLAG_SCOPE).unwrap_or(&empty);
        for hook in &self.hooks {
            hook(record.hp, flags, &mut update, tag);
        }

        let committed = update.applied_to(record.hp);
        debug!("{}: hp {:?} -> {:?} ({:?})", record.name, record.hp, committed, tag);
        record.hp = committed;
        Ok(())
    }

    async fn markers(&self, id: &CharacterId) -> Result<Vec<MarkerRecord>> {
        let characters = self.characters.lock().await;
        let record = characters.get(id).ok_or_else(|| not_found(id))?;
        Ok(record.items.clone())
    }

    async fn create_marker(&self, id: &CharacterId, marker: MarkerRecord) -> Result<()> {
        self.check_writable()?;
        let mut characters = self.characters.lock().await;
        let record = characters.get_mut(id).ok_or_else(|| not_found(id))?;
        record.items.push(marker);
        Ok(())
    }

    async fn delete_markers(&self, id: &CharacterId, marker_ids: &[Uuid]) -> Result<()> {
        self.check_writable()?;
        let mut characters = self.characters.lock().await;
        let record = characters.get_mut(id).ok_or_else(|| not_found(id))?;
        record.items.retain(|item| !marker_ids.contains(&item.id));
        Ok(())
    }
}

impl ContentSource for MemoryHost {
    async fn find_effect(
        &self,
        pack: &str,
        name: &str,
        slug: &str,
    ) -> Result<Option<EffectTemplate>> {
        let packs = self.packs.lock().await;
        let templates = packs
            .get(pack)
            .ok_or_else(|| VestigeError::ContentLookup(format!("Compendium not found: {}", pack)))?;
        Ok(templates
            .iter()
            .find(|t| t.name == name || t.slug.as_deref() == Some(slug))
            .cloned())
    }
}

impl RestRoutine for MemoryHost {
    async fn rest_for_the_night(&self, id: &CharacterId) -> Result<()> {
        if self.fail_rest.load(Ordering::SeqCst) {
            return Err(VestigeError::Persistence(format!(
                "daily preparations failed for {}",
                id
            )));
        }
        if !self.characters.lock().await.contains_key(id) {
            return Err(not_found(id));
        }
        self.rests_taken.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Keeps every notification and rest report for later inspection.
#[derive(Default)]
pub struct RecordingNotifier {
    notifications: StdMutex<Vec<Notification>>,
    reports: StdMutex<Vec<RestReport>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|n| n.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn reports(&self) -> Vec<RestReport> {
        self.reports
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn last(&self) -> Option<Notification> {
        self.notifications().pop()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        let mut notifications = self
            .notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        notifications.push(notification);
    }

    fn whisper(&self, report: &RestReport) {
        let mut reports = self
            .reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        reports.push(report.clone());
    }
}
