//! # Low-Level Monitor
//!
//! Sweeps the tanks for levels under their safety floor and shuts the
//! active ones off.
//!
//! ```text
//!   for each tank:
//!     current < min ?
//!       ├── no  → skip
//!       └── yes → report it
//!                 active? → disable + log ToggleCistern(auto_disable)
//! ```
//!
//! The sweep only runs when called; nothing schedules it.

use tracing::{debug, warn};

use crate::error::LedgerResult;
use crate::ledger::{log_rejection, Ledger, Staged};
use crate::status::CisternStatus;
use crate::store::StationStore;
use crate::types::{Cistern, OperationDetails, OperationKind, ToggleAction};

/// Result of one sweep over a tank list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LowLevelSweep {
    /// Every tank under its floor, after the sweep was applied.
    pub below_threshold: Vec<Cistern>,
    /// Ids of the tanks this sweep switched off.
    pub auto_disabled: Vec<String>,
}

/// Disables every active tank below its floor, in place.
pub fn sweep(cisterns: &mut [Cistern]) -> LowLevelSweep {
    let mut result = LowLevelSweep::default();

    for cistern in cisterns.iter_mut().filter(|c| c.is_below_min()) {
        if cistern.is_active {
            cistern.is_active = false;
            result.auto_disabled.push(cistern.id.clone());
        }
        result.below_threshold.push(cistern.clone());
    }

    result
}

impl<S: StationStore> Ledger<S> {
    /// Runs the low-level sweep and returns every tank below its floor,
    /// including ones that were already off.
    ///
    /// Each newly disabled tank gets its own log entry; all of them are
    /// committed together. A sweep that disables nothing writes nothing.
    pub async fn check_low_levels(&mut self) -> LedgerResult<Vec<Cistern>> {
        let mut cisterns = self.cisterns.clone();
        let LowLevelSweep {
            below_threshold,
            auto_disabled,
        } = sweep(&mut cisterns);

        if auto_disabled.is_empty() {
            debug!(below = below_threshold.len(), "Low-level sweep: nothing to disable");
            return Ok(below_threshold);
        }

        let mut staged = Staged {
            cisterns: Some(cisterns),
            ..Staged::default()
        };
        let timestamp = self.next_timestamp();
        for id in &auto_disabled {
            self.stage_operation(
                &mut staged,
                timestamp,
                format!("Automatic shutdown of cistern {} (low level)", id),
                OperationDetails::ToggleCistern {
                    cistern_id: id.clone(),
                    action: ToggleAction::AutoDisable,
                },
            );
        }
        self.apply(staged)
            .await
            .inspect_err(|e| log_rejection(OperationKind::ToggleCistern, e))?;

        for id in &auto_disabled {
            warn!(cistern = %id, "Cistern disabled: level below minimum");
        }

        Ok(below_threshold)
    }

    /// The tank status view, taken right after a low-level sweep.
    pub async fn inspect_cisterns(&mut self) -> LedgerResult<Vec<CisternStatus>> {
        self.check_low_levels().await?;
        Ok(self.cistern_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StationConfig;
    use crate::error::FailureKind;
    use crate::seed::{self, AI_92_TANK, AI_95_TANK_2};
    use crate::store::MemoryStore;

    async fn station_with(cisterns: Vec<Cistern>) -> Ledger<MemoryStore> {
        let store = MemoryStore::with_state(
            cisterns,
            seed::default_columns(),
            seed::default_statistics(),
        );
        Ledger::open(store, StationConfig::default()).await.unwrap()
    }

    #[test]
    fn test_sweep_is_pure_on_healthy_fleet() {
        let mut cisterns = seed::default_cisterns();
        let before = cisterns.clone();
        let result = sweep(&mut cisterns);

        assert!(result.below_threshold.is_empty());
        assert!(result.auto_disabled.is_empty());
        assert_eq!(cisterns, before);
    }

    #[test]
    fn test_sweep_skips_tank_exactly_at_floor() {
        let mut cisterns = seed::default_cisterns();
        cisterns[0].current_volume = 1000.0;
        assert!(sweep(&mut cisterns).below_threshold.is_empty());
        assert!(cisterns[0].is_active);
    }

    #[tokio::test]
    async fn test_low_level_scenario() {
        let mut cisterns = seed::default_cisterns();
        cisterns[0].current_volume = 800.0;
        let mut ledger = station_with(cisterns).await;

        let below = ledger.check_low_levels().await.unwrap();

        assert_eq!(below.len(), 1);
        assert_eq!(below[0].id, AI_92_TANK);
        assert!(!below[0].is_active);
        assert!(!ledger.cistern(AI_92_TANK).unwrap().is_active);

        let history = ledger.history(0);
        assert_eq!(history.len(), 1);
        assert_eq!(
            history[0].details,
            OperationDetails::ToggleCistern {
                cistern_id: AI_92_TANK.to_string(),
                action: ToggleAction::AutoDisable,
            }
        );
    }

    #[tokio::test]
    async fn test_already_disabled_tank_is_reported_not_logged() {
        let mut cisterns = seed::default_cisterns();
        cisterns[2].current_volume = 500.0; // AI-95 #2, seeded inactive
        let mut ledger = station_with(cisterns).await;

        let below = ledger.check_low_levels().await.unwrap();

        assert_eq!(below.len(), 1);
        assert_eq!(below[0].id, AI_95_TANK_2);
        assert!(ledger.history(0).is_empty());
        assert!(ledger.store().snapshot().unwrap().sequences.is_none());
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent() {
        let mut cisterns = seed::default_cisterns();
        cisterns[0].current_volume = 10.0;
        cisterns[4].current_volume = 10.0;
        let mut ledger = station_with(cisterns).await;

        assert_eq!(ledger.check_low_levels().await.unwrap().len(), 2);
        assert_eq!(ledger.history(0).len(), 2);

        assert_eq!(ledger.check_low_levels().await.unwrap().len(), 2);
        assert_eq!(ledger.history(0).len(), 2);
    }

    #[tokio::test]
    async fn test_status_view_runs_sweep() {
        let mut cisterns = seed::default_cisterns();
        cisterns[4].current_volume = 1100.0; // DT #1, floor 1200
        let mut ledger = station_with(cisterns).await;

        let status = ledger.inspect_cisterns().await.unwrap();
        assert_eq!(status[4].to_string(), "DT #1 | 1,100 / 25,000 L | OFF (below threshold)");
        assert_eq!(ledger.history(0).len(), 1);
    }

    #[tokio::test]
    async fn test_sweep_store_failure() {
        let mut cisterns = seed::default_cisterns();
        cisterns[0].current_volume = 10.0;
        let mut ledger = station_with(cisterns).await;
        ledger.store().set_fail_commits(true);

        let err = ledger.check_low_levels().await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Infrastructure);
        assert!(ledger.cistern(AI_92_TANK).unwrap().is_active);
    }
}
