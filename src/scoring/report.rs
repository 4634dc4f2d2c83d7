use super::aggregate::{aggregate_score, ClosetGrade};
use super::statistics::{statistics, Statistics};
use super::valuation::valuate;
use crate::item::{ClosetSnapshot, ItemStatus};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemContribution {
    pub item_id: i32,
    pub name: String,
    pub status: ItemStatus,
    pub valuation: i32,
}

/// Everything the presentation layer shows for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosetReport {
    pub score: u8,
    pub grade: ClosetGrade,
    pub statistics: Statistics,
    /// Weakest items first.
    pub contributions: Vec<ItemContribution>,
}

impl Default for ClosetReport {
    fn default() -> Self {
        Self::evaluate(&ClosetSnapshot::default())
    }
}

impl ClosetReport {
    pub fn evaluate(snapshot: &ClosetSnapshot) -> Self {
        let score = aggregate_score(snapshot.items());

        let mut contributions: Vec<ItemContribution> = snapshot
            .stored()
            .iter()
            .map(|stored| ItemContribution {
                item_id: stored.id,
                name: stored.name.clone(),
                status: stored.item.status,
                valuation: valuate(&stored.item),
            })
            .collect();
        contributions.sort_by_key(|c| (c.valuation, c.item_id));

        Self {
            score,
            grade: ClosetGrade::from_score(score),
            statistics: statistics(snapshot.items()),
            contributions,
        }
    }

    pub fn weakest(&self, n: usize) -> &[ItemContribution] {
        &self.contributions[..n.min(self.contributions.len())]
    }

    pub fn strongest(&self) -> Option<&ItemContribution> {
        self.contributions.last()
    }
}
