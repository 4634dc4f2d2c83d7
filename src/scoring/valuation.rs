use crate::item::{BrandType, Item, ItemStatus, Material};
use serde::Serialize;

pub const BASE_SCORE: i32 = 50;

pub const BONUS_SECOND_HAND: i32 = 20;

pub const BONUS_ECO_BRAND: i32 = 15;
pub const PENALTY_FAST_FASHION: i32 = 20;

pub const BONUS_NATURAL_MATERIAL: i32 = 10;
pub const PENALTY_SYNTHETIC_MATERIAL: i32 = 10;
pub const PENALTY_MIXED_MATERIAL: i32 = 5;

pub const WEARS_PER_POINT: u32 = 3;

pub const BONUS_RESPONSIBLE_DISPOSAL: i32 = 10;
pub const PENALTY_LOST: i32 = 1;

/// Wear counts above this make trashing an item penalty-free.
pub const TRASHED_WORN_OUT_WEARS: u32 = 50;
/// Wear counts above this soften the trashing penalty.
pub const TRASHED_WELL_WORN_WEARS: u32 = 30;
pub const PENALTY_TRASHED_WELL_WORN: i32 = 10;
pub const PENALTY_TRASHED: i32 = 50;

pub fn second_hand_bonus(is_second_hand: bool) -> i32 {
    if is_second_hand {
        BONUS_SECOND_HAND
    } else {
        0
    }
}

pub fn brand_adjustment(brand_type: BrandType) -> i32 {
    match brand_type {
        BrandType::EcoSustainable => BONUS_ECO_BRAND,
        BrandType::Standard => 0,
        BrandType::FastFashion => -PENALTY_FAST_FASHION,
    }
}

pub fn material_adjustment(material: Material) -> i32 {
    match material {
        Material::Natural => BONUS_NATURAL_MATERIAL,
        Material::Synthetic => -PENALTY_SYNTHETIC_MATERIAL,
        Material::Mixed => -PENALTY_MIXED_MATERIAL,
    }
}

pub fn wear_bonus(wear_count: u32) -> i32 {
    // u32::MAX / 3 still fits in i32.
    (wear_count / WEARS_PER_POINT) as i32
}

pub fn status_adjustment(status: ItemStatus, wear_count: u32) -> i32 {
    match status {
        ItemStatus::Trashed if wear_count > TRASHED_WORN_OUT_WEARS => 0,
        ItemStatus::Trashed if wear_count > TRASHED_WELL_WORN_WEARS => -PENALTY_TRASHED_WELL_WORN,
        ItemStatus::Trashed => -PENALTY_TRASHED,
        ItemStatus::Sold | ItemStatus::Donated => BONUS_RESPONSIBLE_DISPOSAL,
        ItemStatus::Active => 0,
        ItemStatus::Lost => -PENALTY_LOST,
    }
}

/// Raw score contribution of one item. Unbounded: it can go below 0 or above 100.
pub fn valuate(item: &Item) -> i32 {
    BASE_SCORE
        + second_hand_bonus(item.is_second_hand)
        + brand_adjustment(item.brand_type)
        + material_adjustment(item.material)
        + wear_bonus(item.wear_count)
        + status_adjustment(item.status, item.wear_count)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValuationBreakdown {
    pub base: i32,
    pub second_hand: i32,
    pub brand: i32,
    pub material: i32,
    pub wear: i32,
    pub status: i32,
    pub total: i32,
    pub boost_reasons: Vec<String>,
    pub penalty_reasons: Vec<String>,
}

impl Default for ValuationBreakdown {
    fn default() -> Self {
        Self {
            base: BASE_SCORE,
            second_hand: 0,
            brand: 0,
            material: 0,
            wear: 0,
            status: 0,
            total: BASE_SCORE,
            boost_reasons: Vec::new(),
            penalty_reasons: Vec::new(),
        }
    }
}

fn push_reason(boosts: &mut Vec<String>, penalties: &mut Vec<String>, label: String, delta: i32) {
    if delta > 0 {
        boosts.push(format!("{label} (+{delta})"));
    } else if delta < 0 {
        penalties.push(format!("{label} ({delta})"));
    }
}

/// Same terms as [`valuate`], itemized for diagnostics.
pub fn explain_valuation(item: &Item) -> ValuationBreakdown {
    let mut boosts = Vec::new();
    let mut penalties = Vec::new();

    let second_hand = second_hand_bonus(item.is_second_hand);
    push_reason(&mut boosts, &mut penalties, "second-hand".into(), second_hand);

    let brand = brand_adjustment(item.brand_type);
    push_reason(
        &mut boosts,
        &mut penalties,
        format!("{} brand", item.brand_type),
        brand,
    );

    let material = material_adjustment(item.material);
    push_reason(
        &mut boosts,
        &mut penalties,
        format!("{} material", item.material),
        material,
    );

    let wear = wear_bonus(item.wear_count);
    push_reason(
        &mut boosts,
        &mut penalties,
        format!("{} wears", item.wear_count),
        wear,
    );

    let status = status_adjustment(item.status, item.wear_count);
    push_reason(
        &mut boosts,
        &mut penalties,
        format!("{}", item.status),
        status,
    );

    ValuationBreakdown {
        base: BASE_SCORE,
        second_hand,
        brand,
        material,
        wear,
        status,
        total: BASE_SCORE + second_hand + brand + material + wear + status,
        boost_reasons: boosts,
        penalty_reasons: penalties,
    }
}
