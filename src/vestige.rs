// Entry points of the toll mechanic. Every operation catches its own failures,
// turns them into one notification for the invoking player plus an error log
// line, and hands the error back to the direct caller.
use log::{debug, error, info, warn};

use crate::character::{CharacterId, HpUpdate, TargetContext, UpdateTag};
use crate::error::{Result, VestigeError};
use crate::host::{CharacterStore, ContentSource, Notifier, RestRoutine};
use crate::ledger::{self, TollLedger};
use crate::marker::{self, MarkerState};
use crate::message::Notification;
use crate::rest::{self, DischargePlan, RestConversion, RestReport};
use crate::settings::Settings;
use crate::toll::{self, TollOutcome};

#[derive(Debug, Clone, PartialEq)]
pub struct RestOutcome {
    pub report: RestReport,
    pub conversion: Option<RestConversion>, // `None` when no toll was active.
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DischargeOutcome {
    Discharged(DischargePlan),
    NoToll,
}

pub struct Vestige<H, N> {
    host: H,
    notifier: N,
    settings: Settings,
}

impl<H, N> Vestige<H, N>
where
    H: CharacterStore + ContentSource + RestRoutine,
    N: Notifier,
{
    pub fn new(host: H, notifier: N, settings: Settings) -> Self {
        Self {
            host,
            notifier,
            settings,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // Pay a toll typed in by the player.
    pub async fn apply_toll_input(&self, target: &TargetContext, input: &str) -> Result<TollOutcome> {
        match toll::parse_toll_amount(input) {
            Ok(amount) => self.apply_toll(target, amount as i64).await,
            Err(err) => {
                self.report(&err);
                Err(err)
            }
        }
    }

    pub async fn apply_toll(&self, target: &TargetContext, requested: i64) -> Result<TollOutcome> {
        let result = self.try_apply_toll(target, requested).await;
        if let Err(err) = &result {
            self.report(err);
        }
        result
    }

    async fn try_apply_toll(&self, target: &TargetContext, requested: i64) -> Result<TollOutcome> {
        let id = target.resolve()?;
        let requested = toll::validate_amount(requested)?;

        let snapshot = self.host.snapshot(&id).await?;
        let total_toll = ledger::total_toll(&self.host, &id).await?;
        debug!(
            "processing toll for {}: hp={:?} total_toll={} requested={}",
            snapshot.name, snapshot.hp, total_toll, requested
        );

        let receipt = match toll::compute_toll(snapshot.hp, total_toll, requested)? {
            TollOutcome::NothingApplied => {
                info!("{} is at {} HP, no toll applied", snapshot.name, snapshot.hp.value);
                self.notifier.notify(Notification::info(format!(
                    "{} has no hit points to spare; nothing applied",
                    snapshot.name
                )));
                return Ok(TollOutcome::NothingApplied);
            }
            TollOutcome::Applied(receipt) => receipt,
        };

        // Flags first, so the host's pre-commit hook already sees the new toll.
        ledger::store(&self.host, &id, &receipt.ledger()).await?;
        self.host
            .update_hit_points(
                &id,
                HpUpdate::new(receipt.new_hp, receipt.new_temp_hp),
                UpdateTag::Untagged,
            )
            .await?;
        self.refresh_marker(&id).await;

        info!("{} paid a toll: {:?}", snapshot.name, receipt);
        self.notifier.notify(Notification::info(format!(
            "Applied Vestige's Toll: Converted {} HP to temporary HP (Total toll: {})",
            receipt.reduction, receipt.new_total_toll
        )));
        Ok(TollOutcome::Applied(receipt))
    }

    pub async fn perform_rest(&self, target: &TargetContext) -> Result<RestOutcome> {
        let result = self.try_perform_rest(target).await;
        if let Err(err) = &result {
            self.report(err);
        }
        result
    }

    async fn try_perform_rest(&self, target: &TargetContext) -> Result<RestOutcome> {
        let id = target.resolve()?;
        let before = self.host.snapshot(&id).await?;
        let had_toll = ledger::load(&self.host, &id, before.hp.max).await?.is_some();
        let budget = self.host.rest_profile(&id).await?.healing_budget();
        debug!(
            "starting rest for {}: hp={:?} budget={} had_toll={}",
            before.name, before.hp, budget, had_toll
        );

        // The game system's own rest never gates the toll accounting.
        match self.host.rest_for_the_night(&id).await {
            Ok(()) => debug!("standard rest completed for {}", before.name),
            Err(err) => warn!("standard rest failed for {}: {}", before.name, err),
        }

        let conversion = if had_toll {
            self.convert_toll_on_rest(&id, budget).await?
        } else {
            self.notifier.notify(Notification::info(
                "Rest completed. This character has not paid a Vestige's Toll.",
            ));
            None
        };

        let after = self.host.snapshot(&id).await?;
        let remaining = ledger::total_toll(&self.host, &id).await?;
        let report = RestReport::new(before.name, before.hp, after.hp, had_toll, remaining);
        info!(
            "rest finished for {}: hp {:+} temp {:+} remaining toll {}",
            report.character_name,
            report.hp_change(),
            report.temp_change(),
            remaining
        );
        self.notifier.whisper(&report);

        Ok(RestOutcome { report, conversion })
    }

    async fn convert_toll_on_rest(&self, id: &CharacterId, budget: i32) -> Result<Option<RestConversion>> {
        // Read again: the standard rest may have changed hit points.
        let snapshot = self.host.snapshot(id).await?;
        let Some(current) = ledger::load(&self.host, id, snapshot.hp.max).await? else {
            return Ok(None);
        };

        let conversion = rest::compute_rest(snapshot.hp, &current, budget);
        debug!("rest conversion for {}: {:?}", snapshot.name, conversion);

        if conversion.discharges() {
            ledger::clear(&self.host, id).await?;
        } else {
            ledger::store(&self.host, id, &conversion.ledger()).await?;
        }
        self.host
            .update_hit_points(
                id,
                HpUpdate::new(conversion.new_hp, conversion.new_temp_hp),
                UpdateTag::Rest,
            )
            .await?;

        if conversion.discharges() {
            self.remove_marker(id).await;
            self.notifier
                .notify(Notification::info("Vestige's Toll has been fully paid off."));
        } else {
            self.refresh_marker(id).await;
            self.notifier.notify(Notification::info(format!(
                "Vestige Rest: Restored {} HP and converted {} temporary HP. Remaining toll: {}",
                conversion.regular_healing, conversion.conversion, conversion.new_total_toll
            )));
        }
        Ok(Some(conversion))
    }

    // Repays the whole toll at once. Without an outstanding toll this only reports.
    pub async fn discharge(&self, target: &TargetContext) -> Result<DischargeOutcome> {
        let result = self.try_discharge(target).await;
        if let Err(err) = &result {
            self.report(err);
        }
        result
    }

    async fn try_discharge(&self, target: &TargetContext) -> Result<DischargeOutcome> {
        let id = target.resolve()?;
        let snapshot = self.host.snapshot(&id).await?;
        let current = ledger::load(&self.host, &id, snapshot.hp.max).await?;

        let Some(current) = current.filter(TollLedger::is_outstanding) else {
            if current.is_some() {
                // Presence flag left behind with a zero toll.
                ledger::clear(&self.host, &id).await?;
                self.remove_marker(&id).await;
            }
            self.notifier.notify(Notification::info(format!(
                "{} has no toll to pay",
                snapshot.name
            )));
            return Ok(DischargeOutcome::NoToll);
        };

        let plan = rest::compute_discharge(snapshot.hp, &current);
        ledger::clear(&self.host, &id).await?;
        self.host
            .update_hit_points(
                &id,
                HpUpdate::new(plan.new_hp, plan.new_temp_hp),
                UpdateTag::Rest,
            )
            .await?;
        self.remove_marker(&id).await;

        info!("{} discharged a toll of {}", snapshot.name, current.total_toll);
        self.notifier
            .notify(Notification::info("Vestige's Toll has been fully paid off."));
        Ok(DischargeOutcome::Discharged(plan))
    }

    /// Best effort: a failure is reported but never undoes the ledger change
    /// that triggered the refresh.
    pub async fn refresh_marker(&self, id: &CharacterId) -> Option<MarkerState> {
        match marker::refresh(&self.host, &self.host, &self.settings, id).await {
            Ok(state) => Some(state),
            Err(err) => {
                self.report(&err);
                None
            }
        }
    }

    async fn remove_marker(&self, id: &CharacterId) {
        if let Err(err) = marker::remove(&self.host, id).await {
            self.report(&err);
        }
    }

    fn report(&self, err: &VestigeError) {
        error!("{}: {:?}", err.headline(), err);
        let notification = match err {
            VestigeError::NoTargetSelected | VestigeError::InvalidInput(_) => {
                Notification::warn(err.to_string())
            }
            _ => Notification::error(format!("{}: {}", err.headline(), err)),
        };
        self.notifier.notify(notification);
    }
}
