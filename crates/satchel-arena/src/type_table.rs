//! Registered type definitions and their derived filter tables.
//!
//! The filter and fungible lists of each [`TypeDef`] are flattened into
//! lookup maps once, when the table is built; they are immutable after.

use indexmap::IndexMap;

use satchel_core::{ItemType, TypeDef, TypeList};

use crate::error::TypeTableError;

/// Per-type accept/reject and fungibility lookups.
#[derive(Clone, Debug, Default)]
pub struct FilterTables {
    positive: IndexMap<ItemType, TypeList>,
    negative: IndexMap<ItemType, TypeList>,
    fungible: IndexMap<ItemType, TypeList>,
}

impl FilterTables {
    fn build(defs: &[TypeDef]) -> Self {
        let mut tables = Self::default();
        for (id, def) in defs.iter().enumerate() {
            let ty = ItemType(id as u32);
            if !def.filters.is_empty() {
                let list: TypeList = def.filters.iter().copied().collect();
                if def.is_invert {
                    tables.negative.insert(ty, list);
                } else {
                    tables.positive.insert(ty, list);
                }
            }
            if !def.fungibles.is_empty() {
                tables
                    .fungible
                    .insert(ty, def.fungibles.iter().copied().collect());
            }
        }
        tables
    }

    /// Whether a container of type `parent` may hold an item of type `child`.
    ///
    /// A positive list admits only its members; a negative list admits
    /// everything else. A type with neither accepts anything.
    pub fn accepts(&self, parent: ItemType, child: ItemType) -> bool {
        if let Some(allowed) = self.positive.get(&parent) {
            if !allowed.contains(&child) {
                return false;
            }
        }
        match self.negative.get(&parent) {
            Some(denied) => !denied.contains(&child),
            None => true,
        }
    }

    /// Whether an item of type `item` satisfies a query for `query`.
    pub fn matches(&self, query: ItemType, item: ItemType) -> bool {
        query == item
            || self
                .fungible
                .get(&query)
                .is_some_and(|list| list.contains(&item))
    }
}

/// The immutable type registry an arena is built with.
#[derive(Clone, Debug)]
pub struct TypeTable {
    defs: Vec<TypeDef>,
    filters: FilterTables,
}

impl TypeTable {
    /// Build a table; type IDs are positions in `defs`.
    pub fn new(defs: Vec<TypeDef>) -> Result<Self, TypeTableError> {
        if defs.is_empty() {
            return Err(TypeTableError::Empty);
        }
        let known = |t: ItemType| (t.0 as usize) < defs.len();
        for (id, def) in defs.iter().enumerate() {
            let owner = ItemType(id as u32);
            if let Some(&referenced) = def.filters.iter().find(|&&t| !known(t)) {
                return Err(TypeTableError::UnknownFilterType { owner, referenced });
            }
            if let Some(&referenced) = def.fungibles.iter().find(|&&t| !known(t)) {
                return Err(TypeTableError::UnknownFungibleType { owner, referenced });
            }
        }
        let filters = FilterTables::build(&defs);
        Ok(Self { defs, filters })
    }

    /// Definition of `item_type`, if registered.
    pub fn get(&self, item_type: ItemType) -> Option<&TypeDef> {
        self.defs.get(item_type.0 as usize)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Always `false`; a table holds at least one type.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// The derived filter tables.
    pub fn filters(&self) -> &FilterTables {
        &self.filters
    }

    /// Iterate over `(type, definition)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (ItemType, &TypeDef)> {
        self.defs
            .iter()
            .enumerate()
            .map(|(i, d)| (ItemType(i as u32), d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TypeTable {
        TypeTable::new(vec![
            TypeDef::container(1, 4).accepting([ItemType(2)]),
            TypeDef::container(1, 4).rejecting([ItemType(3)]),
            TypeDef::stack(20).with_fungibles([ItemType(3)]),
            TypeDef::stack(20),
            TypeDef::container(1, 2),
        ])
        .unwrap()
    }

    #[test]
    fn positive_filter_admits_only_members() {
        let t = table();
        assert!(t.filters().accepts(ItemType(0), ItemType(2)));
        assert!(!t.filters().accepts(ItemType(0), ItemType(3)));
    }

    #[test]
    fn negative_filter_excludes_members() {
        let t = table();
        assert!(t.filters().accepts(ItemType(1), ItemType(2)));
        assert!(!t.filters().accepts(ItemType(1), ItemType(3)));
    }

    #[test]
    fn unfiltered_type_accepts_everything() {
        let t = table();
        for ty in 0..5 {
            assert!(t.filters().accepts(ItemType(4), ItemType(ty)));
        }
    }

    #[test]
    fn fungible_matching_is_one_way() {
        let t = table();
        assert!(t.filters().matches(ItemType(2), ItemType(2)));
        assert!(t.filters().matches(ItemType(2), ItemType(3)));
        assert!(!t.filters().matches(ItemType(3), ItemType(2)));
    }

    #[test]
    fn empty_table_rejected() {
        assert_eq!(TypeTable::new(vec![]).unwrap_err(), TypeTableError::Empty);
    }

    #[test]
    fn dangling_references_rejected() {
        let err = TypeTable::new(vec![TypeDef::container(1, 1).accepting([ItemType(9)])])
            .unwrap_err();
        assert_eq!(
            err,
            TypeTableError::UnknownFilterType {
                owner: ItemType(0),
                referenced: ItemType(9)
            }
        );
        let err = TypeTable::new(vec![TypeDef::stack(1).with_fungibles([ItemType(1)])])
            .unwrap_err();
        assert!(matches!(err, TypeTableError::UnknownFungibleType { .. }));
    }
}
