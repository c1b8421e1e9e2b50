//! # Default Fleet
//!
//! The state a gateway supplies when nothing has been persisted yet.
//!
//! ## Routing Table
//! ```text
//! ┌──────────┬──────────────┬──────────────┬──────────────┬──────────────┐
//! │  Column  │    AI-92     │    AI-95     │    AI-98     │      DT      │
//! ├──────────┼──────────────┼──────────────┼──────────────┼──────────────┤
//! │   1, 2   │  AI-92 #1    │  AI-95 #1    │      -       │      -       │
//! │   3, 4   │  AI-92 #1    │  AI-95 #1    │  AI-98 #1    │    DT #1     │
//! │   5, 6   │  AI-92 #1    │  AI-95 #2    │  AI-98 #1    │    DT #1     │
//! │   7, 8   │      -       │  AI-95 #2    │      -       │    DT #1     │
//! └──────────┴──────────────┴──────────────┴──────────────┴──────────────┘
//! ```

use std::collections::BTreeMap;

use crate::types::{fuel, Cistern, Column, FuelType, Statistics};

pub const AI_92_TANK: &str = "AI-92 #1";
pub const AI_95_TANK_1: &str = "AI-95 #1";
pub const AI_95_TANK_2: &str = "AI-95 #2";
pub const AI_98_TANK: &str = "AI-98 #1";
pub const DIESEL_TANK: &str = "DT #1";

/// Number of columns in the default fleet.
pub const COLUMN_COUNT: u32 = 8;

fn cistern(id: &str, fuel_type: &str, max: f64, current: f64, min: f64, active: bool) -> Cistern {
    Cistern {
        id: id.to_string(),
        fuel_type: FuelType::from(fuel_type),
        max_volume: max,
        current_volume: current,
        min_level: min,
        is_active: active,
    }
}

/// The five seed tanks.
pub fn default_cisterns() -> Vec<Cistern> {
    vec![
        cistern(AI_92_TANK, fuel::AI_92, 20000.0, 12400.0, 1000.0, true),
        cistern(AI_95_TANK_1, fuel::AI_95, 20000.0, 9800.0, 1000.0, true),
        cistern(AI_95_TANK_2, fuel::AI_95, 20000.0, 1200.0, 1000.0, false),
        cistern(AI_98_TANK, fuel::AI_98, 15000.0, 10000.0, 800.0, false),
        cistern(DIESEL_TANK, fuel::DIESEL, 25000.0, 15600.0, 1200.0, true),
    ]
}

/// The eight seed columns, all active.
pub fn default_columns() -> Vec<Column> {
    (1..=COLUMN_COUNT)
        .map(|id| {
            let mut fuels = BTreeMap::new();

            let ai_95_tank = if id <= 4 { AI_95_TANK_1 } else { AI_95_TANK_2 };
            fuels.insert(FuelType::from(fuel::AI_95), ai_95_tank.to_string());

            if id <= 6 {
                fuels.insert(FuelType::from(fuel::AI_92), AI_92_TANK.to_string());
            }
            if (3..=6).contains(&id) {
                fuels.insert(FuelType::from(fuel::AI_98), AI_98_TANK.to_string());
            }
            if id >= 3 {
                fuels.insert(FuelType::from(fuel::DIESEL), DIESEL_TANK.to_string());
            }

            Column {
                id,
                available_fuels: fuels,
                is_active: true,
            }
        })
        .collect()
}

/// Zeroed statistics for the four known fuel types.
pub fn default_statistics() -> Statistics {
    Statistics::zeroed(fuel::KNOWN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fleet_shape() {
        assert_eq!(default_cisterns().len(), 5);
        assert_eq!(default_columns().len(), 8);
        assert_eq!(default_statistics().fuel_stats.len(), 4);
    }

    #[test]
    fn test_routing_references_existing_tanks() {
        let tanks = default_cisterns();
        for column in default_columns() {
            for (fuel_type, tank_id) in &column.available_fuels {
                let tank = tanks.iter().find(|t| &t.id == tank_id).unwrap();
                assert_eq!(&tank.fuel_type, fuel_type);
            }
        }
    }

    #[test]
    fn test_routing_table() {
        let columns = default_columns();
        let ai_95 = FuelType::from(fuel::AI_95);
        let ai_98 = FuelType::from(fuel::AI_98);

        assert_eq!(columns[0].available_fuels.len(), 2);
        assert_eq!(columns[3].cistern_for(&ai_95), Some(AI_95_TANK_1));
        assert_eq!(columns[4].cistern_for(&ai_95), Some(AI_95_TANK_2));
        assert_eq!(columns[5].cistern_for(&ai_98), Some(AI_98_TANK));
        assert_eq!(columns[6].cistern_for(&ai_98), None);
        assert_eq!(columns[7].available_fuels.len(), 2);
    }
}
