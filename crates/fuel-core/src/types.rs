//! # Domain Types
//!
//! The station's records: tanks, columns, sales, the operation log and
//! aggregate statistics. Pure data plus the invariants each record carries.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Cistern      │◄──│     Column      │   │   Transaction   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (String)    │   │  id (1..N)      │   │  id (1, 2, ..)  │       │
//! │  │  fuel_type      │   │  fuel → tank id │   │  liters         │       │
//! │  │  volumes        │   │  is_active      │   │  price snapshot │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │   Operation     │   │   Statistics    │                              │
//! │  │  ─────────────  │   │  ─────────────  │                              │
//! │  │  id (1, 2, ..)  │   │  cars served    │                              │
//! │  │  details (enum) │   │  income         │                              │
//! │  └─────────────────┘   │  per-fuel tally │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Transactions and operations are append-only: once created they are never
//! edited, reordered or compacted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Fuel Type
// =============================================================================

/// Known fuel grades of the default fleet.
pub mod fuel {
    pub const AI_92: &str = "AI-92";
    pub const AI_95: &str = "AI-95";
    pub const AI_98: &str = "AI-98";
    pub const DIESEL: &str = "DT";

    /// All grades the station is seeded with, in display order.
    pub const KNOWN: [&str; 4] = [AI_92, AI_95, AI_98, DIESEL];
}

/// A fuel grade identifier such as `AI-95`.
///
/// Open-ended: a grade not in [`fuel::KNOWN`] is still a valid fuel type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct FuelType(String);

impl FuelType {
    pub fn new(name: impl Into<String>) -> Self {
        FuelType(name.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FuelType {
    fn from(name: &str) -> Self {
        FuelType(name.to_string())
    }
}

impl From<String> for FuelType {
    fn from(name: String) -> Self {
        FuelType(name)
    }
}

// =============================================================================
// Cistern
// =============================================================================

/// A storage tank holding a single fuel type.
///
/// ## Invariant
/// `0 <= current_volume <= max_volume`. Every operation checks the bounds
/// before it changes a volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cistern {
    /// Unique tank identifier, e.g. `AI-95 #2`.
    pub id: String,
    pub fuel_type: FuelType,
    /// Capacity in liters.
    pub max_volume: f64,
    /// Current stock in liters.
    pub current_volume: f64,
    /// Safety floor in liters. Below it the tank cannot be enabled.
    pub min_level: f64,
    /// Whether the tank may dispense or be a transfer source.
    pub is_active: bool,
}

impl Cistern {
    /// Liters the tank can still take before reaching `max_volume`.
    #[inline]
    pub fn headroom(&self) -> f64 {
        self.max_volume - self.current_volume
    }

    /// True when the stock is under the safety floor.
    #[inline]
    pub fn is_below_min(&self) -> bool {
        self.current_volume < self.min_level
    }

    /// True when the tank could supply `liters`.
    #[inline]
    pub fn can_supply(&self, liters: f64) -> bool {
        self.current_volume >= liters
    }

    /// True when the tank could take `liters` without overflowing.
    #[inline]
    pub fn can_accept(&self, liters: f64) -> bool {
        self.current_volume + liters <= self.max_volume
    }
}

// =============================================================================
// Column
// =============================================================================

/// A dispensing point.
///
/// Each offered fuel type is routed to exactly one tank; several columns may
/// share a tank. The routing is fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Column {
    /// Column number, 1..N.
    pub id: u32,
    /// Fuel type → backing cistern id.
    pub available_fuels: BTreeMap<FuelType, String>,
    pub is_active: bool,
}

impl Column {
    /// Returns the tank id the column draws `fuel_type` from.
    pub fn cistern_for(&self, fuel_type: &FuelType) -> Option<&str> {
        self.available_fuels.get(fuel_type).map(String::as_str)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A completed sale.
///
/// Uses the snapshot pattern: the price per liter is frozen at sale time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transaction {
    /// Monotonic, 1-based, never reused.
    pub id: u64,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    pub column_id: u32,
    pub fuel_type: FuelType,
    pub liters: f64,
    pub price_per_liter: Money,
    pub total_price: Money,
}

// =============================================================================
// Operation Log
// =============================================================================

/// The five kinds of state-changing actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Sale,
    Refuel,
    Transfer,
    ToggleCistern,
    Emergency,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Sale => "sale",
            OperationKind::Refuel => "refuel",
            OperationKind::Transfer => "transfer",
            OperationKind::ToggleCistern => "toggle_cistern",
            OperationKind::Emergency => "emergency",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a tank's activation changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ToggleAction {
    Enable,
    Disable,
    /// Disabled by the low-level sweep, not by an operator.
    AutoDisable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyAction {
    EmergencyActivated,
    EmergencyDisabled,
}

/// Kind-specific payload of an [`Operation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "operation_type", rename_all = "snake_case")]
pub enum OperationDetails {
    Sale {
        column_id: u32,
        fuel_type: FuelType,
        liters: f64,
        total_price: Money,
    },
    Refuel {
        cistern_id: String,
        liters: f64,
    },
    Transfer {
        source_id: String,
        target_id: String,
        liters: f64,
        fuel_type: FuelType,
    },
    ToggleCistern {
        cistern_id: String,
        action: ToggleAction,
    },
    Emergency {
        action: EmergencyAction,
    },
}

impl OperationDetails {
    pub fn kind(&self) -> OperationKind {
        match self {
            OperationDetails::Sale { .. } => OperationKind::Sale,
            OperationDetails::Refuel { .. } => OperationKind::Refuel,
            OperationDetails::Transfer { .. } => OperationKind::Transfer,
            OperationDetails::ToggleCistern { .. } => OperationKind::ToggleCistern,
            OperationDetails::Emergency { .. } => OperationKind::Emergency,
        }
    }
}

/// An audit-log entry for one state-changing action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Operation {
    /// Strictly increasing in insertion order.
    pub id: u64,
    /// Non-decreasing in insertion order.
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub details: OperationDetails,
}

impl Operation {
    #[inline]
    pub fn operation_type(&self) -> OperationKind {
        self.details.kind()
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Sales aggregate for one fuel type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FuelTally {
    pub liters: f64,
    pub income: Money,
}

/// Aggregate sales counters. Both totals only ever grow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Statistics {
    pub total_cars_served: u64,
    pub total_income: Money,
    pub fuel_stats: BTreeMap<FuelType, FuelTally>,
}

impl Statistics {
    /// Zeroed statistics keyed by the given fuel types.
    pub fn zeroed<I, F>(fuel_types: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FuelType>,
    {
        Statistics {
            total_cars_served: 0,
            total_income: Money::zero(),
            fuel_stats: fuel_types
                .into_iter()
                .map(|f| (f.into(), FuelTally::default()))
                .collect(),
        }
    }

    /// Counts one served car. Unseen fuel types get a fresh tally.
    pub fn record_sale(&mut self, fuel_type: &FuelType, liters: f64, total: Money) {
        self.total_cars_served += 1;
        self.total_income += total;

        let tally = self.fuel_stats.entry(fuel_type.clone()).or_default();
        tally.liters += liters;
        tally.income += total;
    }
}

impl Default for Statistics {
    fn default() -> Self {
        Statistics::zeroed(fuel::KNOWN)
    }
}

// =============================================================================
// Id Sequences
// =============================================================================

/// Next ids to hand out. Persisted so ids are never reused, even if old
/// records are pruned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sequences {
    pub next_operation_id: u64,
    pub next_transaction_id: u64,
}

impl Sequences {
    /// Derives the sequences from loaded records (`max(id) + 1`).
    pub fn following(history: &[Operation], transactions: &[Transaction]) -> Self {
        Sequences {
            next_operation_id: history.iter().map(|o| o.id).max().unwrap_or(0) + 1,
            next_transaction_id: transactions.iter().map(|t| t.id).max().unwrap_or(0) + 1,
        }
    }
}

impl Default for Sequences {
    fn default() -> Self {
        Sequences {
            next_operation_id: 1,
            next_transaction_id: 1,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tank(current: f64) -> Cistern {
        Cistern {
            id: "T1".to_string(),
            fuel_type: FuelType::from("X"),
            max_volume: 20000.0,
            current_volume: current,
            min_level: 1000.0,
            is_active: true,
        }
    }

    #[test]
    fn test_cistern_bounds() {
        let t = tank(12400.0);
        assert_eq!(t.headroom(), 7600.0);
        assert!(t.can_supply(12400.0));
        assert!(!t.can_supply(12400.5));
        assert!(t.can_accept(7600.0));
        assert!(!t.can_accept(7600.1));
        assert!(!t.is_below_min());
        assert!(tank(800.0).is_below_min());
    }

    #[test]
    fn test_statistics_default_has_known_fuels() {
        let stats = Statistics::default();
        assert_eq!(stats.fuel_stats.len(), 4);
        assert!(stats.fuel_stats.contains_key(&FuelType::from(fuel::DIESEL)));
        assert_eq!(stats.total_cars_served, 0);
    }

    #[test]
    fn test_record_sale_extends_unknown_fuel() {
        let mut stats = Statistics::default();
        let lpg = FuelType::from("LPG");
        stats.record_sale(&lpg, 20.0, Money::zero());
        stats.record_sale(&lpg, 5.5, Money::zero());

        assert_eq!(stats.total_cars_served, 2);
        assert_eq!(stats.fuel_stats[&lpg].liters, 25.5);
        assert_eq!(stats.fuel_stats.len(), 5);
    }

    #[test]
    fn test_sequences_following() {
        let seq = Sequences::following(&[], &[]);
        assert_eq!(seq, Sequences::default());

        let op = Operation {
            id: 7,
            timestamp: Utc::now(),
            description: "x".to_string(),
            details: OperationDetails::Emergency {
                action: EmergencyAction::EmergencyActivated,
            },
        };
        let seq = Sequences::following(&[op], &[]);
        assert_eq!(seq.next_operation_id, 8);
        assert_eq!(seq.next_transaction_id, 1);
    }

    #[test]
    fn test_operation_details_are_tagged() {
        let details = OperationDetails::ToggleCistern {
            cistern_id: "T1".to_string(),
            action: ToggleAction::AutoDisable,
        };
        assert_eq!(details.kind(), OperationKind::ToggleCistern);

        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["operation_type"], "toggle_cistern");
        assert_eq!(json["action"], "auto_disable");
    }
}
