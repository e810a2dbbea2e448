//! Item type definitions, the configuration input of the arena.

use crate::id::ItemType;

/// Static definition of one item type.
///
/// The ordered list of definitions passed to the arena assigns type IDs:
/// the n-th definition is `ItemType(n)`.
///
/// # Examples
///
/// ```
/// use satchel_core::{ItemType, TypeDef};
///
/// // A bag with 4 slots that refuses other bags.
/// let bag = TypeDef::container(1, 4).rejecting([ItemType(0)]);
/// assert!(bag.is_invert);
/// assert_eq!(bag.filters, vec![ItemType(0)]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TypeDef {
    /// Stack capacity of a single slot (maximum `count` of one item).
    pub count: u32,
    /// Number of child slots an item of this type offers.
    pub capacity: u32,
    /// Route `filters` into the negative (blacklist) table.
    pub is_invert: bool,
    /// Child types allowed (or, with `is_invert`, refused).
    pub filters: Vec<ItemType>,
    /// Types accepted in place of this one by containment queries.
    pub fungibles: Vec<ItemType>,
}

impl TypeDef {
    /// A stackable leaf type with no child slots.
    pub fn stack(count: u32) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    /// A container type with `capacity` child slots.
    pub fn container(count: u32, capacity: u32) -> Self {
        Self {
            count,
            capacity,
            ..Self::default()
        }
    }

    /// Only accept the listed child types.
    pub fn accepting(mut self, types: impl IntoIterator<Item = ItemType>) -> Self {
        self.is_invert = false;
        self.filters = types.into_iter().collect();
        self
    }

    /// Accept every child type except the listed ones.
    pub fn rejecting(mut self, types: impl IntoIterator<Item = ItemType>) -> Self {
        self.is_invert = true;
        self.filters = types.into_iter().collect();
        self
    }

    /// Let containment queries for this type also match the listed types.
    pub fn with_fungibles(mut self, types: impl IntoIterator<Item = ItemType>) -> Self {
        self.fungibles = types.into_iter().collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_route_filters() {
        let pouch = TypeDef::container(1, 2).accepting([ItemType(3)]);
        assert!(!pouch.is_invert);
        assert_eq!(pouch.filters, vec![ItemType(3)]);

        let coin = TypeDef::stack(50).with_fungibles([ItemType(7)]);
        assert_eq!(coin.capacity, 0);
        assert_eq!(coin.fungibles, vec![ItemType(7)]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_with_defaults() {
        let defs: Vec<TypeDef> = serde_json::from_str(
            r#"[{"count": 1, "capacity": 4, "is_invert": true, "filters": [0]},
                {"count": 20}]"#,
        )
        .unwrap();
        assert_eq!(defs[0].filters, vec![ItemType(0)]);
        assert!(defs[0].is_invert);
        assert_eq!(defs[1], TypeDef::stack(20));
    }
}
