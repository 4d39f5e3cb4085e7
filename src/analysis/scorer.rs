//! Accuracy scoring for predicted draws.

use serde::{Deserialize, Serialize};

use crate::domain::SCORED_SLOTS;

/// Match counts for one predicted/actual pair.
///
/// `correct_numbers` is set membership of the predicted mains in the actual
/// six, not positional. The percentage denominator is always seven (six
/// mains plus the extra), even when the actual extra duplicates a main.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyScore {
    pub correct_numbers: u32,
    pub correct_extra: u32,
    pub percentage: f64,
}

pub fn score(
    predicted_numbers: &[u8],
    predicted_extra: u8,
    actual_numbers: &[u8],
    actual_extra: u8,
) -> AccuracyScore {
    let correct_numbers = predicted_numbers
        .iter()
        .filter(|n| actual_numbers.contains(n))
        .count() as u32;
    let correct_extra = u32::from(predicted_extra == actual_extra);
    let percentage = f64::from(correct_numbers + correct_extra) / f64::from(SCORED_SLOTS) * 100.0;

    AccuracyScore {
        correct_numbers,
        correct_extra,
        percentage,
    }
}
