//! Collaborator contracts between the toll mechanic and the host application.
//!
//! The host owns character records, the content pack and the player's
//! notification surface. The core reaches all of them through these traits,
//! injected into [`crate::Vestige`]; nothing is looked up globally.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::character::{CharacterId, CharacterSnapshot, HpUpdate, RestProfile, UpdateTag};
use crate::error::Result;
use crate::message::Notification;
use crate::rest::RestReport;

/// Namespace every flag and marker identity of this module lives under.
pub const FLAG_SCOPE: &str = "vestige-of-yimyar";

/// Embedded item on a character sheet. Only items whose `vestige` block has
/// `is_vestige_toll` set belong to this module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub vestige: Option<MarkerFlags>,
}

impl MarkerRecord {
    pub fn is_toll_marker(&self) -> bool {
        self.vestige.as_ref().is_some_and(|flags| flags.is_vestige_toll)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerFlags {
    pub is_vestige_toll: bool,
    pub toll_counter: i32,
}

/// Effect definition fetched from the content pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectTemplate {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// Character records and their namespaced flag store.
#[allow(async_fn_in_trait)]
pub trait CharacterStore {
    async fn snapshot(&self, id: &CharacterId) -> Result<CharacterSnapshot>;

    async fn rest_profile(&self, id: &CharacterId) -> Result<RestProfile>;

    async fn get_flag(&self, id: &CharacterId, scope: &str, key: &str) -> Result<Option<Value>>;

    async fn set_flag(&self, id: &CharacterId, scope: &str, key: &str, value: Value) -> Result<()>;

    async fn unset_flag(&self, id: &CharacterId, scope: &str, key: &str) -> Result<()>;

    /// Commits a hit point update. The host runs its pre-commit hooks with
    /// `tag` before persisting, which is where [`crate::healing::intercept`]
    /// plugs in.
    async fn update_hit_points(&self, id: &CharacterId, update: HpUpdate, tag: UpdateTag)
    -> Result<()>;

    async fn markers(&self, id: &CharacterId) -> Result<Vec<MarkerRecord>>;

    async fn create_marker(&self, id: &CharacterId, marker: MarkerRecord) -> Result<()>;

    async fn delete_markers(&self, id: &CharacterId, marker_ids: &[Uuid]) -> Result<()>;
}

/// Lookup of the effect template behind the toll marker.
#[allow(async_fn_in_trait)]
pub trait ContentSource {
    /// `Ok(None)` means the pack exists but holds no matching entry; a
    /// missing pack is an error.
    async fn find_effect(&self, pack: &str, name: &str, slug: &str)
    -> Result<Option<EffectTemplate>>;
}

/// The game system's own rest: spell slots, daily resources and so on.
#[allow(async_fn_in_trait)]
pub trait RestRoutine {
    async fn rest_for_the_night(&self, id: &CharacterId) -> Result<()>;
}

/// Single-recipient messages for the player who invoked an operation.
pub trait Notifier {
    fn notify(&self, notification: Notification);

    /// Rest reports go to the invoking player only, never to the table.
    fn whisper(&self, report: &RestReport);
}
