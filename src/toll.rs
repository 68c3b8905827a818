// Paying the toll: current hit points become temporary hit points, and the
// converted amount comes off the effective maximum until a rest repays it.
use std::num::IntErrorKind;

use crate::character::HitPoints;
use crate::error::{Result, VestigeError};
use crate::ledger::{TollLedger, effective_max_hp};

// Values after a toll was paid, reported back to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TollReceipt {
    pub reduction: i32, // Hit points actually converted.
    pub new_hp: i32,
    pub new_temp_hp: i32,
    pub new_total_toll: i32,
    pub new_effective_max_hp: i32,
}

impl TollReceipt {
    pub fn ledger(&self) -> TollLedger {
        TollLedger {
            total_toll: self.new_total_toll,
            effective_max_hp: self.new_effective_max_hp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TollOutcome {
    Applied(TollReceipt),
    NothingApplied, // The character is already at 1 HP or below.
}

// Reads a toll amount typed by the player. Leading digits are taken the way a
// sheet input field reads them; anything else, or a non-positive value, is rejected.
pub fn parse_toll_amount(input: &str) -> Result<i32> {
    let trimmed = input.trim();
    let digits_end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());

    // Oversized amounts saturate; the clamp in `compute_toll` brings them back in range.
    let amount = match trimmed[..digits_end].parse::<i64>() {
        Ok(amount) => amount,
        Err(err) if *err.kind() == IntErrorKind::PosOverflow => i64::MAX,
        Err(err) if *err.kind() == IntErrorKind::NegOverflow => i64::MIN,
        Err(_) => {
            return Err(VestigeError::InvalidInput(format!(
                "'{}' is not a number of hit points",
                trimmed
            )));
        }
    };

    validate_amount(amount)
}

pub fn validate_amount(amount: i64) -> Result<i32> {
    if amount <= 0 {
        return Err(VestigeError::InvalidInput(format!(
            "toll amount must be positive, got {}",
            amount
        )));
    }
    Ok(amount.min(i32::MAX as i64) as i32)
}

// Computes the state after paying `requested` hit points of toll.
pub fn compute_toll(hp: HitPoints, total_toll: i32, requested: i32) -> Result<TollOutcome> {
    let requested = validate_amount(requested as i64)?;

    // Never take the character to 0, and never let the toll reach the nominal max.
    let max_reduction = (hp.value - 1).max(0);
    let toll_room = (hp.max - 1 - total_toll).max(0);
    let reduction = requested.min(max_reduction).min(toll_room);
    if reduction == 0 {
        return Ok(TollOutcome::NothingApplied);
    }

    let new_total_toll = total_toll + reduction;
    let current_temp = hp.temp.max(0);

    Ok(TollOutcome::Applied(TollReceipt {
        reduction,
        new_hp: hp.value - reduction,
        new_temp_hp: (current_temp + reduction).min(new_total_toll),
        new_total_toll,
        new_effective_max_hp: effective_max_hp(hp.max, new_total_toll),
    }))
}
