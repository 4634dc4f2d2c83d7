use crate::item::Item;
use serde::Serialize;

/// Summary figures for a collection, computed independently of the score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Statistics {
    pub item_count: usize,
    pub total_wears: u64,
    /// Share of second-hand items, `0.0..=100.0`.
    pub thrift_percentage: f64,
    /// Mean price; `0.0` for an empty collection.
    pub average_price: f64,
}

pub fn statistics<'a, I>(items: I) -> Statistics
where
    I: IntoIterator<Item = &'a Item>,
{
    let mut item_count = 0usize;
    let mut second_hand = 0usize;
    let mut total_wears = 0u64;
    let mut total_price = 0.0f64;

    for item in items {
        item_count += 1;
        total_wears += u64::from(item.wear_count);
        total_price += item.price;
        if item.is_second_hand {
            second_hand += 1;
        }
    }

    if item_count == 0 {
        return Statistics::default();
    }

    Statistics {
        item_count,
        total_wears,
        thrift_percentage: second_hand as f64 / item_count as f64 * 100.0,
        average_price: total_price / item_count as f64,
    }
}
