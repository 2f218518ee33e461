use serde::{Deserialize, Serialize};
use std::fmt;

/// Text shown for a metric that could not be computed
pub const NOT_AVAILABLE: &str = "N/A";

/// A single KPI cell: a rounded number or the "not available" sentinel.
///
/// Serialized as a JSON number, or `null` for the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum MetricValue {
    Numeric(f64),
    NotAvailable,
}

/// Round to one decimal place.
///
/// Goes through exact decimal formatting, so ties are decided on the stored
/// binary value (`0.35` is slightly below the tie and becomes `0.3`).
pub fn round1(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.1}", value).parse().unwrap_or(value)
}

impl MetricValue {
    /// Rounds to one decimal. Non-finite input becomes the sentinel.
    pub fn numeric(value: f64) -> Self {
        let rounded = round1(value);
        if rounded.is_finite() {
            MetricValue::Numeric(rounded)
        } else {
            MetricValue::NotAvailable
        }
    }

    /// `numerator / denominator`, or the sentinel unless the denominator is
    /// present and strictly positive.
    pub fn ratio(numerator: f64, denominator: Option<f64>) -> Self {
        Self::guarded(denominator, |d| numerator / d)
    }

    /// `numerator / denominator * 100`, with the same guard as [`ratio`](Self::ratio)
    pub fn percentage(numerator: f64, denominator: Option<f64>) -> Self {
        Self::guarded(denominator, |d| numerator / d * 100.0)
    }

    fn guarded(denominator: Option<f64>, compute: impl FnOnce(f64) -> f64) -> Self {
        match denominator {
            Some(d) if d > 0.0 => MetricValue::numeric(compute(d)),
            _ => MetricValue::NotAvailable,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, MetricValue::Numeric(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Numeric(v) => Some(*v),
            MetricValue::NotAvailable => None,
        }
    }
}

impl From<Option<f64>> for MetricValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(MetricValue::NotAvailable, MetricValue::numeric)
    }
}

impl From<MetricValue> for Option<f64> {
    fn from(value: MetricValue) -> Self {
        value.as_f64()
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Numeric(v) => write!(f, "{:.1}", v),
            MetricValue::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_rounds_to_one_decimal() {
        assert_eq!(MetricValue::numeric(25.04), MetricValue::Numeric(25.0));
        assert_eq!(MetricValue::numeric(12.36), MetricValue::Numeric(12.4));
        assert_eq!(MetricValue::numeric(-3.26), MetricValue::Numeric(-3.3));
    }

    #[test]
    fn test_ties_round_on_stored_value() {
        assert_eq!(MetricValue::numeric(0.35), MetricValue::Numeric(0.3));
        assert_eq!(MetricValue::numeric(0.25), MetricValue::Numeric(0.2));
        assert_eq!(MetricValue::numeric(1.15), MetricValue::Numeric(1.1));
        assert_eq!(MetricValue::numeric(2.675), MetricValue::Numeric(2.7));
        assert_eq!(round1(-0.25), -0.2);
    }

    #[test]
    fn test_non_finite_becomes_sentinel() {
        assert_eq!(MetricValue::numeric(f64::NAN), MetricValue::NotAvailable);
        assert_eq!(MetricValue::numeric(f64::INFINITY), MetricValue::NotAvailable);
    }

    #[test]
    fn test_ratio_guards_denominator() {
        assert_eq!(MetricValue::ratio(50.0, Some(2.0)), MetricValue::Numeric(25.0));
        assert_eq!(MetricValue::ratio(50.0, Some(0.0)), MetricValue::NotAvailable);
        assert_eq!(MetricValue::ratio(50.0, Some(-4.0)), MetricValue::NotAvailable);
        assert_eq!(MetricValue::ratio(50.0, None), MetricValue::NotAvailable);
    }

    #[test]
    fn test_percentage_guards_denominator() {
        assert_eq!(MetricValue::percentage(1.0, Some(8.0)), MetricValue::Numeric(12.5));
        assert_eq!(MetricValue::percentage(1.0, Some(0.0)), MetricValue::NotAvailable);
        assert_eq!(MetricValue::percentage(1.0, Some(-8.0)), MetricValue::NotAvailable);
        assert_eq!(MetricValue::percentage(1.0, None), MetricValue::NotAvailable);
    }

    #[test]
    fn test_display() {
        assert_eq!(MetricValue::Numeric(25.0).to_string(), "25.0");
        assert_eq!(MetricValue::Numeric(1234.5).to_string(), "1234.5");
        assert_eq!(MetricValue::NotAvailable.to_string(), "N/A");
    }

    #[test]
    fn test_json_uses_null_for_sentinel() {
        let json = serde_json::to_string(&vec![MetricValue::Numeric(1.5), MetricValue::NotAvailable]).unwrap();
        assert_eq!(json, "[1.5,null]");

        let parsed: Vec<MetricValue> = serde_json::from_str("[2.0,null]").unwrap();
        assert_eq!(parsed, vec![MetricValue::Numeric(2.0), MetricValue::NotAvailable]);
    }
}
