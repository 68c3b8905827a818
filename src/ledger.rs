//! Per-character toll state.
//!
//! Persisted as three flags under [`FLAG_SCOPE`]: `vestigeToll` (presence),
//! `totalToll` and `effectiveMaxHP`. This module is the only place those key
//! strings appear; everything else works with [`TollLedger`].

use serde_json::Value;
use std::collections::HashMap;

use crate::character::CharacterId;
use crate::error::Result;
use crate::host::{CharacterStore, FLAG_SCOPE};

pub const PRESENCE_KEY: &str = "vestigeToll";
pub const TOTAL_TOLL_KEY: &str = "totalToll";
pub const EFFECTIVE_MAX_KEY: &str = "effectiveMaxHP";

/// Maximum hit points left once `total_toll` has been converted, never below 1.
pub fn effective_max_hp(max_hp: i32, total_toll: i32) -> i32 {
    max_hp.saturating_sub(total_toll).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TollLedger {
    pub total_toll: i32,
    pub effective_max_hp: i32,
}

impl TollLedger {
    pub fn new(max_hp: i32, total_toll: i32) -> Self {
        TollLedger {
            total_toll,
            effective_max_hp: effective_max_hp(max_hp, total_toll),
        }
    }

    pub fn is_outstanding(&self) -> bool {
        self.total_toll > 0
    }

    // Temp hit points still available under this toll.
    pub fn temp_headroom(&self, current_temp: i32) -> i32 {
        (self.total_toll - current_temp).max(0)
    }
}

/// Flags of one character in one scope, as a host keeps them in memory.
pub type FlagMap = HashMap<String, Value>;

/// Reads the ledger of `id`. `None` when the presence flag is not set.
/// A missing `effectiveMaxHP` is recomputed from `max_hp`.
pub async fn load<S: CharacterStore>(
    store: &S,
    id: &CharacterId,
    max_hp: i32,
) -> Result<Option<TollLedger>> {
    let presence = store.get_flag(id, FLAG_SCOPE, PRESENCE_KEY).await?;
    if !is_present(presence.as_ref()) {
        return Ok(None);
    }
    let total = store.get_flag(id, FLAG_SCOPE, TOTAL_TOLL_KEY).await?;
    let effective = store.get_flag(id, FLAG_SCOPE, EFFECTIVE_MAX_KEY).await?;
    Ok(Some(parse(total.as_ref(), effective.as_ref(), max_hp)))
}

/// Same as [`load`] for a host that already holds the flags, e.g. inside its
/// pre-commit hook.
pub fn from_flags(flags: &FlagMap, max_hp: i32) -> Option<TollLedger> {
    if !is_present(flags.get(PRESENCE_KEY)) {
        return None;
    }
    Some(parse(
        flags.get(TOTAL_TOLL_KEY),
        flags.get(EFFECTIVE_MAX_KEY),
        max_hp,
    ))
}

fn is_present(presence: Option<&Value>) -> bool {
    presence.and_then(Value::as_bool).unwrap_or(false)
}

fn parse(total: Option<&Value>, effective: Option<&Value>, max_hp: i32) -> TollLedger {
    let total_toll = total.and_then(as_i32).unwrap_or(0).max(0);
    let effective_max_hp = effective
        .and_then(as_i32)
        .unwrap_or_else(|| effective_max_hp(max_hp, total_toll));
    TollLedger {
        total_toll,
        effective_max_hp,
    }
}

fn as_i32(value: &Value) -> Option<i32> {
    value
        .as_i64()
        .map(|v| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
}

/// Outstanding toll of `id`, zero when no toll is recorded.
pub async fn total_toll<S: CharacterStore>(store: &S, id: &CharacterId) -> Result<i32> {
    let presence = store.get_flag(id, FLAG_SCOPE, PRESENCE_KEY).await?;
    if !is_present(presence.as_ref()) {
        return Ok(0);
    }
    let total = store.get_flag(id, FLAG_SCOPE, TOTAL_TOLL_KEY).await?;
    Ok(total.as_ref().and_then(as_i32).unwrap_or(0).max(0))
}

pub async fn store<S: CharacterStore>(store: &S, id: &CharacterId, ledger: &TollLedger) -> Result<()> {
    store
        .set_flag(id, FLAG_SCOPE, PRESENCE_KEY, Value::Bool(true))
        .await?;
    store
        .set_flag(id, FLAG_SCOPE, TOTAL_TOLL_KEY, Value::from(ledger.total_toll))
        .await?;
    store
        .set_flag(
            id,
            FLAG_SCOPE,
            EFFECTIVE_MAX_KEY,
            Value::from(ledger.effective_max_hp),
        )
        .await
}

/// Unsets all three flags. Safe to call when none are set.
pub async fn clear<S: CharacterStore>(store: &S, id: &CharacterId) -> Result<()> {
    for key in [PRESENCE_KEY, TOTAL_TOLL_KEY, EFFECTIVE_MAX_KEY] {
        store.unset_flag(id, FLAG_SCOPE, key).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_max_never_drops_below_one() {
        assert_eq!(effective_max_hp(30, 10), 20);
        assert_eq!(effective_max_hp(30, 29), 1);
        assert_eq!(effective_max_hp(30, 45), 1);
    }

    #[test]
    fn missing_effective_max_is_recomputed() {
        let mut flags = FlagMap::new();
        assert_eq!(from_flags(&flags, 30), None);

        flags.insert(PRESENCE_KEY.to_string(), Value::Bool(true));
        flags.insert(TOTAL_TOLL_KEY.to_string(), Value::from(12));
        assert_eq!(from_flags(&flags, 30), Some(TollLedger::new(30, 12)));

        flags.insert(EFFECTIVE_MAX_KEY.to_string(), Value::from(17));
        assert_eq!(
            from_flags(&flags, 30).map(|ledger| ledger.effective_max_hp),
            Some(17)
        );
    }

    #[test]
    fn temp_headroom_is_floored() {
        let ledger = TollLedger::new(30, 10);
        assert_eq!(ledger.temp_headroom(3), 7);
        assert_eq!(ledger.temp_headroom(12), 0);
    }
}
