use serde::Serialize;
use std::sync::Arc;
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, Serialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum BrandType {
    #[strum(to_string = "eco_sustainable", serialize = "eco")]
    EcoSustainable,
    #[default]
    #[strum(to_string = "standard")]
    Standard,
    #[strum(to_string = "fast_fashion", serialize = "fast")]
    FastFashion,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, Serialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    Natural,
    Synthetic,
    #[default]
    Mixed,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, Serialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Active,
    Sold,
    Donated,
    Trashed,
    Lost,
}

impl ItemStatus {
    /// Whether the item has left the wardrobe, for whatever reason.
    pub fn is_gone(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// A single piece of clothing as seen by the scoring engine.
///
/// Values are taken as-is: `price` is expected to be finite and non-negative,
/// which the item store enforces on write.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Item {
    pub is_second_hand: bool,
    pub brand_type: BrandType,
    pub material: Material,
    pub wear_count: u32,
    pub status: ItemStatus,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredItem {
    pub id: i32,
    pub name: String,
    pub item: Item,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Immutable point-in-time view of every stored item.
///
/// Clones share the underlying slice.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosetSnapshot {
    items: Arc<[StoredItem]>,
}

impl ClosetSnapshot {
    pub fn new(items: Vec<StoredItem>) -> Self {
        Self {
            items: items.into(),
        }
    }

    pub fn stored(&self) -> &[StoredItem] {
        &self.items
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items.iter().map(|stored| &stored.item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for ClosetSnapshot {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<Vec<StoredItem>> for ClosetSnapshot {
    fn from(items: Vec<StoredItem>) -> Self {
        Self::new(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_enum_text_forms() {
        assert_eq!(BrandType::EcoSustainable.to_string(), "eco_sustainable");
        assert_eq!(BrandType::FastFashion.to_string(), "fast_fashion");
        assert_eq!(Material::Synthetic.to_string(), "synthetic");
        assert_eq!(ItemStatus::Donated.to_string(), "donated");
    }

    #[test]
    fn test_enum_parsing_accepts_aliases() {
        assert_eq!(BrandType::from_str("eco"), Ok(BrandType::EcoSustainable));
        assert_eq!(BrandType::from_str("Fast"), Ok(BrandType::FastFashion));
        assert_eq!(Material::from_str("NATURAL"), Ok(Material::Natural));
        assert_eq!(ItemStatus::from_str("trashed"), Ok(ItemStatus::Trashed));
        assert!(ItemStatus::from_str("burned").is_err());
    }

    #[test]
    fn test_snapshot_views() {
        let snapshot = ClosetSnapshot::new(vec![StoredItem {
            id: 7,
            name: "linen shirt".into(),
            item: Item {
                wear_count: 4,
                ..Default::default()
            },
            created_at: 0,
            updated_at: 0,
        }]);

        assert_eq!(snapshot.len(), 1);
        assert!(!snapshot.is_empty());
        assert_eq!(snapshot.items().next().map(|i| i.wear_count), Some(4));

        let shared = snapshot.clone();
        assert_eq!(shared, snapshot);
        assert!(ClosetSnapshot::default().is_empty());
    }

    #[test]
    fn test_status_is_gone() {
        assert!(!ItemStatus::Active.is_gone());
        assert!(ItemStatus::Sold.is_gone());
        assert!(ItemStatus::Lost.is_gone());
    }
}
