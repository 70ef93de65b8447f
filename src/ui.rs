//! HUD text formatting
//!
//! The DOM widgets themselves belong to the host; these helpers produce the
//! strings they display so the wording stays testable.

/// `Distance Travelled: <n> units`, distance floored to whole units
pub fn distance_text(distance: f64) -> String {
    format!("Distance Travelled: {} units", distance.max(0.0).floor() as u64)
}

/// `Fuel: <n.n>%`, never negative
pub fn fuel_text(fuel: f64) -> String {
    format!("Fuel: {:.1}%", fuel.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_text() {
        assert_eq!(distance_text(0.0), "Distance Travelled: 0 units");
        assert_eq!(distance_text(12.98), "Distance Travelled: 12 units");
    }

    #[test]
    fn test_fuel_text() {
        assert_eq!(fuel_text(100.0), "Fuel: 100.0%");
        assert_eq!(fuel_text(37.26), "Fuel: 37.3%");
        assert_eq!(fuel_text(-0.05), "Fuel: 0.0%");
    }
}
