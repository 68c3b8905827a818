// Rest-side accounting: paying the toll back down and reporting the result.
use chrono::{DateTime, Local};
use std::fmt;

use crate::character::HitPoints;
use crate::ledger::{TollLedger, effective_max_hp};

// Computed effect of one rest on a tolled character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestConversion {
    pub budget: i32,
    pub conversion: i32,      // Temp hit points repaid this rest.
    pub missing_hp: i32,      // Gap to the effective maximum before the rest.
    pub regular_healing: i32, // Regular healing drawn from the same budget.
    pub new_hp: i32,
    pub new_temp_hp: i32,
    pub new_total_toll: i32,
    pub new_effective_max_hp: i32,
}

impl RestConversion {
    pub fn discharges(&self) -> bool {
        self.new_total_toll == 0
    }

    pub fn ledger(&self) -> TollLedger {
        TollLedger {
            total_toll: self.new_total_toll,
            effective_max_hp: self.new_effective_max_hp,
        }
    }
}

// One shared budget drives both the temp paydown and the regular top-up.
pub fn compute_rest(hp: HitPoints, ledger: &TollLedger, budget: i32) -> RestConversion {
    let budget = budget.max(0);
    let current_temp = hp.temp.max(0);

    let conversion = budget.min(current_temp);
    let missing_hp = (ledger.effective_max_hp - hp.value).max(0);
    let regular_healing = missing_hp.min(conversion);

    let new_total_toll = (ledger.total_toll - conversion).max(0);
    let new_effective_max_hp = effective_max_hp(hp.max, new_total_toll);
    let new_hp = (hp.value + regular_healing + conversion).min(new_effective_max_hp.max(hp.value));

    RestConversion {
        budget,
        conversion,
        missing_hp,
        regular_healing,
        new_hp,
        new_temp_hp: current_temp - conversion,
        new_total_toll,
        new_effective_max_hp,
    }
}

// Full repayment outside of a rest: remaining temp hit points become regular ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DischargePlan {
    pub repaid: i32,
    pub new_hp: i32,
    pub new_temp_hp: i32,
}

pub fn compute_discharge(hp: HitPoints, ledger: &TollLedger) -> DischargePlan {
    let repaid = hp.temp.max(0).min(ledger.total_toll);
    DischargePlan {
        repaid,
        new_hp: (hp.value + repaid).min(hp.max.max(hp.value)),
        new_temp_hp: 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TollSummary {
    pub paid: i32,
    pub remaining: i32,
}

// Before/after snapshot of a rest, whispered to the resting player.
#[derive(Debug, Clone, PartialEq)]
pub struct RestReport {
    pub character_name: String,
    pub initial: HitPoints,
    pub last: HitPoints,
    pub toll: Option<TollSummary>, // Present when a toll was active at the start of the rest.
    pub rested_at: DateTime<Local>,
}

impl RestReport {
    pub fn new(
        character_name: String,
        initial: HitPoints,
        last: HitPoints,
        had_toll: bool,
        remaining_toll: i32,
    ) -> Self {
        let toll = had_toll.then(|| TollSummary {
            paid: (initial.temp - last.temp).max(0),
            remaining: remaining_toll,
        });
        RestReport {
            character_name,
            initial,
            last,
            toll,
            rested_at: Local::now(),
        }
    }

    pub fn hp_change(&self) -> i32 {
        self.last.value - self.initial.value
    }

    pub fn temp_change(&self) -> i32 {
        self.last.temp - self.initial.temp
    }

    pub fn fully_paid(&self) -> bool {
        self.toll.is_some_and(|toll| toll.remaining == 0)
    }
}

fn signed(value: i32) -> String {
    if value >= 0 {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

impl fmt::Display for RestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} - Rest Report", self.character_name)?;
        writeln!(f, "HP Change: {} HP", signed(self.hp_change()))?;
        write!(f, "Current HP: {} / {}", self.last.value, self.last.max)?;
        if let Some(toll) = self.toll {
            writeln!(f)?;
            writeln!(f, "Temp HP Change: {}", signed(self.temp_change()))?;
            writeln!(f, "Vestige's Toll Paid: +{} HP recovered", toll.paid)?;
            write!(f, "Remaining Toll: {}", toll.remaining)?;
            if toll.remaining == 0 {
                write!(f, "\nThe Vestige's Toll has been fully paid off!")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_discharges_small_toll() {
        let hp = HitPoints::new(30, 20, 5);
        let ledger = TollLedger::new(30, 5);
        let rest = compute_rest(hp, &ledger, 5);

        assert_eq!(rest.conversion, 5);
        assert_eq!(rest.missing_hp, 5);
        assert_eq!(rest.regular_healing, 5);
        assert_eq!(rest.new_hp, 30);
        assert_eq!(rest.new_temp_hp, 0);
        assert!(rest.discharges());
    }

    #[test]
    fn partial_paydown_keeps_toll() {
        let hp = HitPoints::new(30, 20, 8);
        let ledger = TollLedger::new(30, 10);
        let rest = compute_rest(hp, &ledger, 3);

        assert_eq!(rest.conversion, 3);
        assert_eq!(rest.regular_healing, 0);
        assert_eq!(rest.new_hp, 23);
        assert_eq!(rest.new_temp_hp, 5);
        assert_eq!(rest.new_total_toll, 7);
        assert_eq!(rest.new_effective_max_hp, 23);
    }

    #[test]
    fn zero_budget_changes_nothing() {
        let hp = HitPoints::new(30, 12, 4);
        let ledger = TollLedger::new(30, 6);
        let rest = compute_rest(hp, &ledger, 0);
        assert_eq!((rest.new_hp, rest.new_temp_hp, rest.new_total_toll), (12, 4, 6));
    }

    #[test]
    fn report_counts_paid_toll() {
        let report = RestReport::new(
            "Ysolde".to_string(),
            HitPoints::new(30, 20, 5),
            HitPoints::new(30, 30, 0),
            true,
            0,
        );
        assert_eq!(report.hp_change(), 10);
        assert_eq!(report.temp_change(), -5);
        assert_eq!(report.toll, Some(TollSummary { paid: 5, remaining: 0 }));
        assert!(report.fully_paid());
        assert!(report.to_string().contains("fully paid off"));
    }
}
