use super::valuation::valuate;
use crate::item::Item;
use serde::Serialize;
use strum::Display;

pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosetGrade {
    #[strum(serialize = "EXCELLENT")]
    Excellent,
    #[strum(serialize = "GOOD")]
    Good,
    #[strum(serialize = "FAIR")]
    Fair,
    #[strum(serialize = "POOR")]
    Poor,
}

impl ClosetGrade {
    pub const EXCELLENT_THRESHOLD: u8 = 80;
    pub const GOOD_THRESHOLD: u8 = 60;
    pub const FAIR_THRESHOLD: u8 = 40;

    pub fn from_score(score: u8) -> Self {
        if score >= Self::EXCELLENT_THRESHOLD {
            ClosetGrade::Excellent
        } else if score >= Self::GOOD_THRESHOLD {
            ClosetGrade::Good
        } else if score >= Self::FAIR_THRESHOLD {
            ClosetGrade::Fair
        } else {
            ClosetGrade::Poor
        }
    }
}

/// Mean item valuation, truncated toward zero and clamped into `0..=100`.
/// An empty collection scores 0.
pub fn aggregate_score<'a, I>(items: I) -> u8
where
    I: IntoIterator<Item = &'a Item>,
{
    let (sum, count) = items
        .into_iter()
        .fold((0i64, 0i64), |(sum, count), item| {
            (sum + i64::from(valuate(item)), count + 1)
        });

    if count == 0 {
        return 0;
    }

    (sum / count).clamp(MIN_SCORE, MAX_SCORE) as u8
}
