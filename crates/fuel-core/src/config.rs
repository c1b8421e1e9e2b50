//! # Station Configuration
//!
//! Values the ledger needs but does not own: the price table, the currency
//! symbol used in messages and the default history page size.
//!
//! The configuration is injected when the ledger is opened, so tests and
//! deployments can vary prices without touching the ledger.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{fuel, FuelType};

/// Default number of operations returned by a history query.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

// =============================================================================
// Price Table
// =============================================================================

/// Fuel type → price per liter.
///
/// Unknown fuel types price at zero: a sale of an unlisted grade goes
/// through at no charge instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceTable(BTreeMap<FuelType, Money>);

impl PriceTable {
    pub fn new() -> Self {
        PriceTable(BTreeMap::new())
    }

    /// Sets the price of a fuel type, returning the table for chaining.
    pub fn with_price(mut self, fuel_type: impl Into<FuelType>, price: Money) -> Self {
        self.0.insert(fuel_type.into(), price);
        self
    }

    pub fn set_price(&mut self, fuel_type: impl Into<FuelType>, price: Money) {
        self.0.insert(fuel_type.into(), price);
    }

    /// Price per liter, zero when the fuel type is not listed.
    pub fn price_for(&self, fuel_type: &FuelType) -> Money {
        self.0.get(fuel_type).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FuelType, &Money)> {
        self.0.iter()
    }
}

impl Default for PriceTable {
    /// The station's list prices.
    fn default() -> Self {
        PriceTable::new()
            .with_price(fuel::AI_92, Money::from_major_minor(57, 47))
            .with_price(fuel::AI_95, Money::from_major_minor(58, 30))
            .with_price(fuel::AI_98, Money::from_major_minor(64, 50))
            .with_price(fuel::DIESEL, Money::from_major_minor(52, 0))
    }
}

/// Parses `"AI-92=57.47,AI-95=58.30"`.
///
/// ## Example
/// ```rust
/// use fuel_core::config::PriceTable;
/// use fuel_core::FuelType;
///
/// let table: PriceTable = "AI-92=57.47, DT=52".parse().unwrap();
/// assert_eq!(table.price_for(&FuelType::from("DT")).minor_units(), 5200);
/// ```
impl FromStr for PriceTable {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut table = PriceTable::new();

        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, price) = entry
                .split_once('=')
                .ok_or_else(|| ValidationError::InvalidFormat {
                    field: "price table".to_string(),
                    reason: format!("expected FUEL=PRICE, got '{}'", entry),
                })?;

            let name = name.trim();
            if name.is_empty() {
                return Err(ValidationError::Required {
                    field: "fuel type".to_string(),
                });
            }

            table.set_price(name, price.parse()?);
        }

        Ok(table)
    }
}

// =============================================================================
// Station Configuration
// =============================================================================

/// Ledger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    /// Display name of the station.
    pub station_name: String,

    pub prices: PriceTable,

    /// Appended to amounts in result messages.
    pub currency_symbol: String,

    /// Operations returned by [`crate::Ledger::recent_history`].
    pub history_limit: usize,
}

impl StationConfig {
    pub fn with_prices(mut self, prices: PriceTable) -> Self {
        self.prices = prices;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Formats an amount with the configured currency symbol.
    pub fn format_money(&self, amount: Money) -> String {
        format!("{} {}", amount, self.currency_symbol)
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        StationConfig {
            station_name: "SeverNeft".to_string(),
            prices: PriceTable::default(),
            currency_symbol: "₽".to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prices() {
        let prices = PriceTable::default();
        assert_eq!(prices.price_for(&FuelType::from(fuel::AI_92)).minor_units(), 5747);
        assert_eq!(prices.price_for(&FuelType::from(fuel::AI_98)).minor_units(), 6450);
    }

    #[test]
    fn test_unknown_fuel_prices_at_zero() {
        let prices = PriceTable::default();
        assert!(prices.price_for(&FuelType::from("LPG")).is_zero());
    }

    #[test]
    fn test_parse_price_table() {
        let table: PriceTable = "AI-92=60.10,AI-95=61".parse().unwrap();
        assert_eq!(table.price_for(&FuelType::from("AI-92")).minor_units(), 6010);
        assert_eq!(table.price_for(&FuelType::from("AI-95")).minor_units(), 6100);
        assert_eq!(table.iter().count(), 2);

        assert!("AI-92".parse::<PriceTable>().is_err());
        assert!("=10".parse::<PriceTable>().is_err());
        assert!("AI-92=ten".parse::<PriceTable>().is_err());
    }

    #[test]
    fn test_format_money() {
        let config = StationConfig::default();
        assert_eq!(config.format_money(Money::from_minor(2_873_500)), "28735.00 ₽");
    }
}
