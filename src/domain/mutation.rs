//! Structural mutation: insert under a parent, remove whole subtrees.

use std::collections::HashMap;

use generational_arena::Index;
use tracing::{debug, instrument, warn};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::item::{ItemId, TaxonomyItem};
use crate::domain::taxonomy::Taxonomy;

/// Where an inserted item is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRef {
    Item(Index),
    Id(ItemId),
}

impl From<Index> for ParentRef {
    fn from(idx: Index) -> Self {
        ParentRef::Item(idx)
    }
}

impl From<ItemId> for ParentRef {
    fn from(id: ItemId) -> Self {
        ParentRef::Id(id)
    }
}

/// An item paired with its declared parent.
#[derive(Debug, Clone)]
pub struct Insertion {
    pub item: TaxonomyItem,
    pub parent: ParentRef,
}

impl Insertion {
    pub fn new(item: TaxonomyItem, parent: impl Into<ParentRef>) -> Self {
        Self {
            item,
            parent: parent.into(),
        }
    }
}

impl Taxonomy {
    /// Append each item to the end of its parent's children.
    ///
    /// All parents are resolved before the tree is touched, so an unknown
    /// parent leaves the taxonomy unchanged. Id uniqueness against the rest
    /// of the tree is the caller's responsibility.
    #[instrument(level = "debug", skip(self, insertions))]
    pub fn insert(&mut self, insertions: Vec<Insertion>) -> DomainResult<Vec<Index>> {
        let wanted: Vec<ItemId> = insertions
            .iter()
            .filter_map(|ins| match ins.parent {
                ParentRef::Id(id) => Some(id),
                ParentRef::Item(_) => None,
            })
            .collect();
        let by_id: HashMap<ItemId, Index> = if wanted.is_empty() {
            HashMap::new()
        } else {
            wanted
                .iter()
                .copied()
                .zip(self.search_by_id(&wanted)?)
                .collect()
        };

        let mut parents = Vec::with_capacity(insertions.len());
        for ins in &insertions {
            let parent = match ins.parent {
                ParentRef::Id(id) => by_id
                    .get(&id)
                    .copied()
                    .ok_or_else(|| DomainError::IdNotFound(vec![id]))?,
                ParentRef::Item(idx) if self.contains(idx) => idx,
                ParentRef::Item(_) => return Err(DomainError::ItemNotInTaxonomy),
            };
            parents.push(parent);
        }

        let inserted = insertions
            .into_iter()
            .zip(parents)
            .map(|(ins, parent)| self.attach(ins.item, parent))
            .collect::<Vec<_>>();
        debug!("inserted {} items", inserted.len());
        Ok(inserted)
    }

    pub fn insert_one(
        &mut self,
        item: TaxonomyItem,
        parent: impl Into<ParentRef>,
    ) -> DomainResult<Index> {
        let mut inserted = self.insert(vec![Insertion::new(item, parent)])?;
        inserted.pop().ok_or(DomainError::ItemNotInTaxonomy)
    }

    /// Remove each item together with everything below it.
    ///
    /// Descendants are released children-first, then the item is detached
    /// from its parent. Items that are already gone (for example because an
    /// ancestor earlier in `items` took them along) are skipped. Removing
    /// the root empties the taxonomy. Returns the number of released items.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_subtree(&mut self, items: &[Index]) -> usize {
        let mut released = 0;

        for &item in items {
            let Some(parent) = self.get(item).map(|it| it.parent()) else {
                debug!("skipping item no longer in taxonomy: {:?}", item);
                continue;
            };

            let doomed: Vec<Index> = self.iter_postorder_from(item).map(|(idx, _)| idx).collect();
            for idx in doomed {
                if self.release(idx).is_some() {
                    released += 1;
                }
            }

            if let Some(parent_idx) = parent {
                let siblings: Vec<Index> = self
                    .get(parent_idx)
                    .map(|p| p.children().to_vec())
                    .unwrap_or_default();
                match siblings.iter().position(|&c| c == item) {
                    Some(pos) => {
                        let mut remaining = siblings;
                        remaining.remove(pos);
                        self.set_children(parent_idx, remaining);
                    }
                    None => warn!("item {:?} missing from its parent's children", item),
                }
            }
        }

        debug!("released {} items", released);
        released
    }

    /// Resolve `ids` then remove their subtrees. Unknown ids fail before
    /// anything is removed.
    pub fn remove_by_id(&mut self, ids: &[ItemId]) -> DomainResult<usize> {
        let items = self.search_by_id(ids)?;
        Ok(self.remove_subtree(&items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Taxonomy {
        let mut t = Taxonomy::with_root(TaxonomyItem::new(0, "Root"), "t", "1");
        let root = t.root().unwrap();
        let env = t.attach(TaxonomyItem::new(1, "Environment"), root);
        t.attach(TaxonomyItem::new(2, "Air"), env);
        t.attach(TaxonomyItem::new(3, "Water"), env);
        t.attach(TaxonomyItem::new(4, "Social"), root);
        t
    }

    #[test]
    fn given_parent_by_id_when_insert_then_appended_last_with_backlink() {
        let mut t = small();
        let idx = t
            .insert_one(TaxonomyItem::new(10, "Soil"), ItemId(1))
            .unwrap();
        let env = t.find(ItemId(1)).unwrap();
        assert_eq!(t.get(env).unwrap().children().last(), Some(&idx));
        assert_eq!(t.get(idx).unwrap().parent(), Some(env));
    }

    #[test]
    fn given_leaf_parent_when_insert_then_leaf_becomes_internal() {
        let mut t = small();
        let social = t.find(ItemId(4)).unwrap();
        assert!(t.get(social).unwrap().is_leaf());
        t.insert_one(TaxonomyItem::new(11, "Labour"), social).unwrap();
        assert_eq!(t.get(social).unwrap().children().len(), 1);
    }

    #[test]
    fn given_one_unknown_parent_when_insert_then_nothing_changes() {
        let mut t = small();
        let before = t.len();
        let result = t.insert(vec![
            Insertion::new(TaxonomyItem::new(10, "a"), ItemId(1)),
            Insertion::new(TaxonomyItem::new(11, "b"), ItemId(99)),
        ]);
        assert_eq!(result, Err(DomainError::IdNotFound(vec![ItemId(99)])));
        assert_eq!(t.len(), before);
    }

    #[test]
    fn given_internal_item_when_remove_subtree_then_descendants_released() {
        let mut t = small();
        let env = t.find(ItemId(1)).unwrap();
        assert_eq!(t.remove_subtree(&[env]), 3);
        assert_eq!(t.len(), 2);
        assert_eq!(t.get(t.root().unwrap()).unwrap().children().len(), 1);
    }

    #[test]
    fn given_ancestor_and_descendant_when_removed_together_then_descendant_skipped() {
        let mut t = small();
        let items = t.search_by_id(&[ItemId(1), ItemId(2)]).unwrap();
        assert_eq!(t.remove_subtree(&items), 3);
    }

    #[test]
    fn given_root_when_removed_then_taxonomy_empty() {
        let mut t = small();
        let root = t.root().unwrap();
        assert_eq!(t.remove_subtree(&[root]), 5);
        assert!(t.is_empty());
        assert_eq!(t.len(), 0);
    }
}
