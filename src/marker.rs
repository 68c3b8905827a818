//! The visible "Vestige's Toll (N)" item on a character sheet.
//!
//! At most one marker exists per character. It is recognised by the
//! `isVestigeToll` identity flag, never by name, so renamed or duplicated
//! markers are still cleaned up.

use log::{debug, info};
use uuid::Uuid;

use crate::character::CharacterId;
use crate::error::{Result, VestigeError};
use crate::host::{CharacterStore, ContentSource, MarkerFlags, MarkerRecord};
use crate::ledger;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerState {
    Absent,
    Shown(i32),
}

/// Deletes every toll marker on `id`. Returns how many were removed.
pub async fn remove<S: CharacterStore>(store: &S, id: &CharacterId) -> Result<usize> {
    let stale: Vec<Uuid> = store
        .markers(id)
        .await?
        .into_iter()
        .filter(MarkerRecord::is_toll_marker)
        .map(|marker| marker.id)
        .collect();

    if !stale.is_empty() {
        debug!("removing {} toll marker(s) from {}", stale.len(), id);
        store.delete_markers(id, &stale).await?;
    }
    Ok(stale.len())
}

/// Replaces whatever toll markers exist with a single one showing the
/// current toll. With no outstanding toll, or visual effects disabled, the
/// character ends up with none.
pub async fn refresh<S: CharacterStore, C: ContentSource>(
    store: &S,
    content: &C,
    settings: &Settings,
    id: &CharacterId,
) -> Result<MarkerState> {
    remove(store, id).await?;

    let total_toll = ledger::total_toll(store, id).await?;
    if total_toll == 0 || !settings.enable_visual_effects {
        return Ok(MarkerState::Absent);
    }

    let template = content
        .find_effect(&settings.content_pack, &settings.effect_name, &settings.effect_slug)
        .await?
        .ok_or_else(|| {
            VestigeError::ContentLookup(format!(
                "{} effect not found in {}",
                settings.effect_name, settings.content_pack
            ))
        })?;

    let description = format!("Current Vestige Toll: {}<br>{}", total_toll, template.description);
    let marker = MarkerRecord {
        id: Uuid::new_v4(),
        name: format!("{} ({})", template.name, total_toll),
        description,
        vestige: Some(MarkerFlags {
            is_vestige_toll: true,
            toll_counter: total_toll,
        }),
    };
    store.create_marker(id, marker).await?;

    info!("toll marker on {} now shows {}", id, total_toll);
    Ok(MarkerState::Shown(total_toll))
}
