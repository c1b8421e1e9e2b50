//! # Status Queries
//!
//! Read-only views over the ledger. Nothing here mutates state or touches
//! the store.
//!
//! ## Views
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cistern_status()  AI-92 #1 | 12,400 / 20,000 L | ON                    │
//! │                    AI-95 #2 | 500 / 20,000 L | OFF (below threshold)    │
//! │                                                                         │
//! │  column_status()   Column 5: AI-92 (AI-92 #1), AI-95 (AI-95 #2)         │
//! │                              - UNAVAILABLE                              │
//! │                                                                         │
//! │  history(n)        last n operations, oldest first (0 = all)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::ledger::Ledger;
use crate::money::Money;
use crate::store::StationStore;
use crate::types::{Cistern, FuelType, Operation, Statistics};
use crate::validation::validate_liters;
use crate::error::LedgerResult;

// =============================================================================
// Projections
// =============================================================================

/// One tank line of the status screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CisternStatus {
    pub id: String,
    pub fuel_type: FuelType,
    pub current_volume: f64,
    pub max_volume: f64,
    pub is_active: bool,
    /// Disabled and under the safety floor.
    pub below_threshold: bool,
}

impl From<&Cistern> for CisternStatus {
    fn from(cistern: &Cistern) -> Self {
        CisternStatus {
            id: cistern.id.clone(),
            fuel_type: cistern.fuel_type.clone(),
            current_volume: cistern.current_volume,
            max_volume: cistern.max_volume,
            is_active: cistern.is_active,
            below_threshold: !cistern.is_active && cistern.is_below_min(),
        }
    }
}

impl fmt::Display for CisternStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} / {} L | {}",
            self.id,
            group_thousands(self.current_volume),
            group_thousands(self.max_volume),
            if self.is_active { "ON" } else { "OFF" }
        )?;
        if self.below_threshold {
            write!(f, " (below threshold)")?;
        }
        Ok(())
    }
}

/// One fuel offered by a column and whether it can be sold right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FuelRoute {
    pub fuel_type: FuelType,
    pub cistern_id: String,
    /// False when the backing tank is missing or disabled.
    pub available: bool,
}

/// One column line of the status screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ColumnStatus {
    pub id: u32,
    pub is_active: bool,
    pub routes: Vec<FuelRoute>,
}

impl fmt::Display for ColumnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Column {}:", self.id)?;
        for (i, route) in self.routes.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}{} ({})", sep, route.fuel_type, route.cistern_id)?;
            if !route.available {
                write!(f, " - UNAVAILABLE")?;
            }
        }
        Ok(())
    }
}

/// Price preview for a prospective sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quote {
    pub price_per_liter: Money,
    pub total: Money,
}

/// Formats a volume rounded to whole liters with `,` thousands separators.
pub fn group_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

// =============================================================================
// Queries
// =============================================================================

impl<S: StationStore> Ledger<S> {
    pub fn cistern_status(&self) -> Vec<CisternStatus> {
        self.cisterns.iter().map(CisternStatus::from).collect()
    }

    pub fn column_status(&self) -> Vec<ColumnStatus> {
        self.columns
            .iter()
            .map(|column| ColumnStatus {
                id: column.id,
                is_active: column.is_active,
                routes: column
                    .available_fuels
                    .iter()
                    .map(|(fuel_type, cistern_id)| FuelRoute {
                        fuel_type: fuel_type.clone(),
                        cistern_id: cistern_id.clone(),
                        available: self.cistern(cistern_id).is_some_and(|c| c.is_active),
                    })
                    .collect(),
            })
            .collect()
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// The last `limit` operations in log order. `0` returns the whole log.
    pub fn history(&self, limit: usize) -> &[Operation] {
        if limit == 0 || limit >= self.history.len() {
            &self.history
        } else {
            &self.history[self.history.len() - limit..]
        }
    }

    /// [`Ledger::history`] with the configured page size.
    pub fn recent_history(&self) -> &[Operation] {
        self.history(self.config.history_limit)
    }

    pub fn disabled_cisterns(&self) -> Vec<&Cistern> {
        self.cisterns.iter().filter(|c| !c.is_active).collect()
    }

    /// Tanks that can give fuel: active and not empty.
    pub fn transfer_sources(&self) -> Vec<&Cistern> {
        self.cisterns
            .iter()
            .filter(|c| c.is_active && c.current_volume > 0.0)
            .collect()
    }

    /// Other tanks holding the same fuel as `source_id`. Empty when the
    /// source does not exist.
    pub fn transfer_targets(&self, source_id: &str) -> Vec<&Cistern> {
        let Some(source) = self.cistern(source_id) else {
            return Vec::new();
        };
        self.cisterns
            .iter()
            .filter(|c| c.id != source.id && c.fuel_type == source.fuel_type)
            .collect()
    }

    /// Disabled tanks at or above their floor.
    pub fn enable_candidates(&self) -> Vec<&Cistern> {
        self.cisterns
            .iter()
            .filter(|c| !c.is_active && !c.is_below_min())
            .collect()
    }

    pub fn disable_candidates(&self) -> Vec<&Cistern> {
        self.cisterns.iter().filter(|c| c.is_active).collect()
    }

    /// What a sale of `liters` of `fuel_type` would cost at current prices.
    pub fn quote(&self, fuel_type: &FuelType, liters: f64) -> LedgerResult<Quote> {
        validate_liters(liters)?;
        let price_per_liter = self.config.prices.price_for(fuel_type);
        Ok(Quote {
            price_per_liter,
            total: price_per_liter.for_liters(liters),
        })
    }
}
