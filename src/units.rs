//! Distance units for measurement display.
//!
//! Tracking reports positions in meters. A [`Unit`] turns a meter distance
//! into the value and label shown to the user; [`Meters`] keeps raw
//! distances from being mixed up with already-converted values.

use serde::{Deserialize, Serialize};

use crate::world::{METERS_TO_CENTIMETERS, METERS_TO_INCHES};

/// Number of decimals shown for every formatted distance.
pub const DISPLAY_DECIMALS: usize = 2;

/// Unit a measurement is displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Centimeter,
    Inch,
    Meter,
}

impl Unit {
    /// All units in menu order.
    pub const ALL: [Unit; 3] = [Unit::Centimeter, Unit::Inch, Unit::Meter];

    /// Multiplier from meters to this unit.
    pub fn scale(self) -> f64 {
        match self {
            Unit::Centimeter => METERS_TO_CENTIMETERS,
            Unit::Inch => METERS_TO_INCHES,
            Unit::Meter => 1.0,
        }
    }

    /// Short label appended to formatted values.
    pub fn label(self) -> &'static str {
        match self {
            Unit::Centimeter => "cm",
            Unit::Inch => "in",
            Unit::Meter => "m",
        }
    }

    /// Menu title for the unit picker.
    pub fn title(self) -> &'static str {
        match self {
            Unit::Centimeter => "Centimeter",
            Unit::Inch => "Inch",
            Unit::Meter => "Meter",
        }
    }

    /// Convert a distance in meters to this unit.
    ///
    /// Input is not validated; geometric distances are non-negative by
    /// construction.
    pub fn convert(self, distance_meters: f64) -> (f64, &'static str) {
        (distance_meters * self.scale(), self.label())
    }

    /// Format a distance in meters for display, e.g. `"42.50 cm"`.
    pub fn format(self, distance_meters: f64) -> String {
        let (value, label) = self.convert(distance_meters);
        format!("{:.*} {}", DISPLAY_DECIMALS, value, label)
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Raw distance in meters, as reported by tracking.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Meters(pub f64);

impl Meters {
    /// Numeric value in the given unit.
    pub fn in_unit(self, unit: Unit) -> f64 {
        unit.convert(self.0).0
    }

    /// Display string in the given unit.
    pub fn format(self, unit: Unit) -> String {
        unit.format(self.0)
    }
}

impl std::fmt::Display for Meters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Unit::Meter.format(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_unit_is_centimeter() {
        assert_eq!(Unit::default(), Unit::Centimeter);
    }

    #[test]
    fn test_format_uses_two_decimals_and_label() {
        assert_eq!(Unit::Centimeter.format(0.425), "42.50 cm");
        assert_eq!(Unit::Meter.format(1.0), "1.00 m");
        assert_eq!(Unit::Inch.format(1.0), "39.37 in");
    }

    #[test]
    fn test_zero_formats_to_zero_in_every_unit() {
        for unit in Unit::ALL {
            assert_eq!(unit.format(0.0), format!("0.00 {}", unit.label()));
        }
    }

    #[test]
    fn test_conversion_ratios_against_meter() {
        for meters in [0.0, 0.013, 0.5, 1.0, 2.75, 12.0] {
            let (m, _) = Unit::Meter.convert(meters);
            let (cm, _) = Unit::Centimeter.convert(meters);
            let (inch, _) = Unit::Inch.convert(meters);
            assert!((cm - m * 100.0).abs() < 1e-9);
            assert!((inch - m * 39.3701).abs() < 1e-9);
        }
    }

    #[test]
    fn test_conversion_is_monotonic() {
        for unit in Unit::ALL {
            let mut last = f64::NEG_INFINITY;
            for step in 0..50 {
                let (value, _) = unit.convert(step as f64 * 0.1);
                assert!(value >= last);
                last = value;
            }
        }
    }

    #[test]
    fn test_unit_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Unit::Inch).unwrap(), "\"inch\"");
        let unit: Unit = serde_json::from_str("\"meter\"").unwrap();
        assert_eq!(unit, Unit::Meter);
    }

    #[test]
    fn test_meters_display_and_in_unit() {
        let d = Meters(1.5);
        assert_eq!(d.to_string(), "1.50 m");
        assert!((d.in_unit(Unit::Centimeter) - 150.0).abs() < 1e-9);
        assert_eq!(d.format(Unit::Centimeter), "150.00 cm");
    }
}
