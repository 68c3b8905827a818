// Character-side data the toll mechanic reads from the host. The host owns these
// records; the core only sees snapshots and proposes updates.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, VestigeError};

// Stable identifier of a character record in the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterId(pub String);

impl CharacterId {
    pub fn new(id: impl Into<String>) -> Self {
        CharacterId(id.into())
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Hit point block of a character sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPoints {
    pub max: i32,   // Nominal maximum, unaffected by the toll.
    pub value: i32, // Current hit points.
    #[serde(default)]
    pub temp: i32, // Temporary hit points; absent reads as zero.
}

impl HitPoints {
    pub fn new(max: i32, value: i32, temp: i32) -> Self {
        HitPoints { max, value, temp }
    }
}

// Inputs of the host's rest healing formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RestProfile {
    #[serde(default)]
    pub con_mod: i32,
    #[serde(default)]
    pub level: Option<i32>,
}

impl RestProfile {
    pub fn new(con_mod: i32, level: i32) -> Self {
        RestProfile {
            con_mod,
            level: Some(level),
        }
    }

    // Constitution modifier times level, never negative. A missing level counts as 1.
    pub fn healing_budget(&self) -> i32 {
        let level = self.level.unwrap_or(1);
        self.con_mod.saturating_mul(level).max(0)
    }
}

// What the core knows about a character at the start of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSnapshot {
    pub id: CharacterId,
    pub name: String,
    pub hp: HitPoints,
}

// A proposed partial change to the hit point block. `None` leaves the field alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HpUpdate {
    pub value: Option<i32>,
    pub temp: Option<i32>,
}

impl HpUpdate {
    pub fn new(value: i32, temp: i32) -> Self {
        HpUpdate {
            value: Some(value),
            temp: Some(temp),
        }
    }

    pub fn value(value: i32) -> Self {
        HpUpdate {
            value: Some(value),
            temp: None,
        }
    }

    pub fn temp(temp: i32) -> Self {
        HpUpdate {
            value: None,
            temp: Some(temp),
        }
    }

    // Healing as a sheet applies it, capped at the nominal maximum.
    pub fn heal(hp: HitPoints, amount: i32) -> Self {
        HpUpdate::value(hp.value.saturating_add(amount.max(0)).min(hp.max))
    }

    // Damage as a sheet applies it: temporary hit points absorb first, and
    // current hit points stop at zero.
    pub fn damage(hp: HitPoints, amount: i32) -> Self {
        let amount = amount.max(0);
        let temp = hp.temp.max(0);
        let absorbed = amount.min(temp);
        HpUpdate {
            value: Some(hp.value.saturating_sub(amount - absorbed).max(0)),
            temp: Some(temp - absorbed),
        }
    }

    // The hit point block after this update is committed on top of `hp`.
    pub fn applied_to(&self, hp: HitPoints) -> HitPoints {
        HitPoints {
            max: hp.max,
            value: self.value.unwrap_or(hp.value),
            temp: self.temp.unwrap_or(hp.temp),
        }
    }
}

// Out-of-band marker attached to an update. The healing interceptor skips
// anything tagged `Rest`, which is how rest and discharge commits avoid being
// processed twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateTag {
    #[default]
    Untagged,
    Rest,
}

// The invoking user's view of which character an action targets.
#[derive(Debug, Clone, Default)]
pub struct TargetContext {
    pub assigned: Option<CharacterId>,   // The user's own character.
    pub controlled: Vec<CharacterId>,    // Characters behind the selected tokens.
}

impl TargetContext {
    pub fn assigned(id: CharacterId) -> Self {
        TargetContext {
            assigned: Some(id),
            controlled: Vec::new(),
        }
    }

    pub fn resolve(&self) -> Result<CharacterId> {
        self.assigned
            .clone()
            .or_else(|| self.controlled.first().cloned())
            .ok_or(VestigeError::NoTargetSelected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_budget_floors_at_zero() {
        assert_eq!(RestProfile::new(3, 4).healing_budget(), 12);
        assert_eq!(RestProfile::new(-1, 5).healing_budget(), 0);
        let no_level = RestProfile {
            con_mod: 2,
            level: None,
        };
        assert_eq!(no_level.healing_budget(), 2);
    }

    #[test]
    fn damage_drains_temp_first() {
        let hp = HitPoints::new(30, 20, 5);
        assert_eq!(HpUpdate::damage(hp, 3), HpUpdate::new(20, 2));
        assert_eq!(HpUpdate::damage(hp, 8), HpUpdate::new(17, 0));
        assert_eq!(HpUpdate::damage(hp, 40), HpUpdate::new(0, 0));
    }

    #[test]
    fn heal_caps_at_max_without_overflow() {
        let hp = HitPoints::new(30, 20, 0);
        assert_eq!(HpUpdate::heal(hp, 4), HpUpdate::value(24));
        assert_eq!(HpUpdate::heal(hp, i32::MAX), HpUpdate::value(30));
    }

    #[test]
    fn target_prefers_assigned_character() {
        let ctx = TargetContext {
            assigned: Some(CharacterId::new("own")),
            controlled: vec![CharacterId::new("token")],
        };
        assert_eq!(ctx.resolve().unwrap(), CharacterId::new("own"));

        let ctx = TargetContext {
            assigned: None,
            controlled: vec![CharacterId::new("token")],
        };
        assert_eq!(ctx.resolve().unwrap(), CharacterId::new("token"));

        assert!(matches!(
            TargetContext::default().resolve(),
            Err(VestigeError::NoTargetSelected)
        ));
    }
}
