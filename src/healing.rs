//! Pre-commit transform for hit point updates on characters carrying a toll.
//!
//! Healing first fills regular hit points up to the effective maximum; what is
//! left refills temporary hit points, never past the outstanding toll. Damage
//! and unchanged values pass through. Updates tagged [`UpdateTag::Rest`] are
//! the rest resolver's own commits and are never touched.

use log::debug;

use crate::character::{HitPoints, HpUpdate, UpdateTag};
use crate::ledger::{self, FlagMap, TollLedger};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealingSplit {
    pub healing: i32, // Proposed increase over current hit points.
    pub regular: i32, // Part kept as regular hit points.
    pub temp: i32,    // Part redirected into temporary hit points.
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interception {
    pub split: Option<HealingSplit>,
    pub temp_clamped: bool,
}

impl Interception {
    pub fn is_pass_through(&self) -> bool {
        self.split.is_none() && !self.temp_clamped
    }
}

/// Rewrites `update` in place. `ledger` is `None` for characters without a toll.
pub fn intercept(
    hp: HitPoints,
    ledger: Option<&TollLedger>,
    update: &mut HpUpdate,
    tag: UpdateTag,
) -> Interception {
    let mut result = Interception::default();
    if tag == UpdateTag::Rest {
        return result;
    }
    let Some(ledger) = ledger else {
        return result;
    };

    let current_temp = hp.temp.max(0);
    let proposed_temp = update.temp;

    if let Some(proposed_hp) = update.value.filter(|&v| v > hp.value) {
        let healing = proposed_hp.saturating_sub(hp.value);
        let deficit = ledger.effective_max_hp.saturating_sub(hp.value).max(0);
        let regular = healing.min(deficit);
        let remaining = healing - regular;
        let temp = remaining.min(ledger.temp_headroom(current_temp));

        update.value = Some(hp.value + regular);
        if proposed_temp.is_some() || temp > 0 {
            let base = proposed_temp
                .unwrap_or(current_temp)
                .clamp(0, ledger.total_toll);
            update.temp = Some(base.saturating_add(temp).min(ledger.total_toll));
        }

        debug!(
            "healing split: healing={} regular={} temp={} new_hp={:?} new_temp={:?} effective_max={} toll={}",
            healing,
            regular,
            temp,
            update.value,
            update.temp,
            ledger.effective_max_hp,
            ledger.total_toll
        );
        result.split = Some(HealingSplit {
            healing,
            regular,
            temp,
        });
    }

    // Temp hit points stay within 0..=total toll whatever the host proposed.
    if let Some(temp) = update.temp {
        let clamped = temp.clamp(0, ledger.total_toll);
        if clamped != temp {
            debug!("temp hp {} limited to 0..={}", temp, ledger.total_toll);
            update.temp = Some(clamped);
            result.temp_clamped = true;
        }
    }

    result
}

/// Hook form for hosts that keep the module's flags in memory.
pub fn intercept_flags(
    hp: HitPoints,
    flags: &FlagMap,
    update: &mut HpUpdate,
    tag: UpdateTag,
) -> Interception {
    let ledger = ledger::from_flags(flags, hp.max);
    intercept(hp, ledger.as_ref(), update, tag)
}
