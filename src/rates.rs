// Participation and segregation rates.
//
// Every division in the engine happens here. A zero or negative
// denominator yields `0`, never `NaN` or `Infinity`.
use crate::types::LogRecord;
use crate::util::round_to;

/// Precision of rates shown on the dashboard.
pub const SCREEN_PRECISION: u32 = 1;
/// Precision of rates written to the exported report.
pub const EXPORT_PRECISION: u32 = 2;

/// Households that handed over waste, or `0` on a service-gap day.
pub fn effective_giving(record: &LogRecord) -> f64 {
    if record.no_collection {
        0.0
    } else {
        clean(record.households_giving)
    }
}

/// Households that segregated their waste, or `0` on a service-gap day.
pub fn effective_segregating(record: &LogRecord) -> f64 {
    if record.no_collection {
        0.0
    } else {
        clean(record.households_segregating)
    }
}

/// Covered households are counted whether or not collection happened.
pub fn covered(record: &LogRecord) -> f64 {
    clean(record.households_covered)
}

pub fn participation_rate(covered: f64, giving: f64, precision: u32) -> f64 {
    percentage(giving, covered, precision)
}

pub fn segregation_rate(giving: f64, segregating: f64, precision: u32) -> f64 {
    percentage(segregating, giving, precision)
}

fn percentage(part: f64, whole: f64, precision: u32) -> f64 {
    if !whole.is_finite() || whole <= 0.0 || !part.is_finite() {
        return 0.0;
    }
    round_to(part / whole * 100.0, precision)
}

// Records built in code bypass the loader, so guard once more here.
fn clean(n: f64) -> f64 {
    if n.is_finite() && n > 0.0 {
        n
    } else {
        0.0
    }
}
