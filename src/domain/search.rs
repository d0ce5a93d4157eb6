//! Id lookup, name search and sibling queries.
//!
//! Nothing here is cached: every query walks the live tree.

use std::collections::{HashMap, HashSet};

use generational_arena::Index;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::item::ItemId;
use crate::domain::taxonomy::Taxonomy;

impl Taxonomy {
    /// id -> index over the current tree. On duplicate ids the first in
    /// pre-order wins.
    fn id_index(&self) -> HashMap<ItemId, Index> {
        let mut index = HashMap::with_capacity(self.len());
        for (idx, item) in self.iter() {
            index.entry(item.id()).or_insert(idx);
        }
        index
    }

    /// Items for `ids`, in the order requested.
    ///
    /// Fails with `IdNotFound` listing only the ids that are absent.
    #[instrument(level = "debug", skip(self))]
    pub fn search_by_id(&self, ids: &[ItemId]) -> DomainResult<Vec<Index>> {
        self.require_root()?;
        let index = self.id_index();

        let missing: Vec<ItemId> = ids
            .iter()
            .filter(|id| !index.contains_key(*id))
            .unique()
            .copied()
            .collect();
        if !missing.is_empty() {
            debug!("missing ids: {:?}", missing);
            return Err(DomainError::IdNotFound(missing));
        }

        Ok(ids.iter().filter_map(|id| index.get(id).copied()).collect())
    }

    /// Single-id lookup.
    pub fn find(&self, id: ItemId) -> DomainResult<Index> {
        self.search_by_id(&[id])?
            .first()
            .copied()
            .ok_or_else(|| DomainError::IdNotFound(vec![id]))
    }

    /// One group per term: items whose name contains the term, ignoring case.
    pub fn search_by_name(&self, terms: &[&str]) -> DomainResult<Vec<Vec<Index>>> {
        Ok(self.search_by_name_from(self.require_root()?, terms))
    }

    /// Flat form of [`search_by_name`](Self::search_by_name) for a single term.
    pub fn search_by_term(&self, term: &str) -> DomainResult<Vec<Index>> {
        let mut groups = self.search_by_name(&[term])?;
        Ok(groups.pop().unwrap_or_default())
    }

    /// Name search restricted to the subtree below `start`, in `items_from` order.
    #[instrument(level = "debug", skip(self))]
    pub fn search_by_name_from(&self, start: Index, terms: &[&str]) -> Vec<Vec<Index>> {
        let items: Vec<(Index, String)> = self
            .items_from(start)
            .into_iter()
            .filter_map(|idx| self.name_of(idx).map(|name| (idx, name.to_lowercase())))
            .collect();

        terms
            .iter()
            .map(|term| {
                let needle = term.to_lowercase();
                items
                    .iter()
                    .filter(|(_, name)| name.contains(&needle))
                    .map(|(idx, _)| *idx)
                    .collect()
            })
            .collect()
    }

    /// Like [`search_by_name`](Self::search_by_name) but yields the matching names.
    pub fn similar_names(&self, terms: &[&str]) -> DomainResult<Vec<Vec<String>>> {
        let groups = self.search_by_name(terms)?;
        Ok(groups
            .into_iter()
            .map(|group| {
                group
                    .into_iter()
                    .filter_map(|idx| self.name_of(idx).map(str::to_string))
                    .collect()
            })
            .collect())
    }

    /// All children of `item`'s parent, `item` included. Empty for the root.
    pub fn siblings(&self, item: Index) -> Vec<Index> {
        self.get(item)
            .and_then(|it| it.parent())
            .and_then(|parent| self.get(parent))
            .map(|parent| parent.children().to_vec())
            .unwrap_or_default()
    }

    /// Children lists of the distinct parents of `items`, first-seen order.
    /// Parentless items (the root) are skipped.
    pub fn similar_items(&self, items: &[Index]) -> Vec<Vec<Index>> {
        let mut seen = HashSet::new();
        items
            .iter()
            .filter_map(|&idx| self.get(idx).and_then(|item| item.parent()))
            .filter(|parent| seen.insert(*parent))
            .filter_map(|parent| self.get(parent).map(|p| p.children().to_vec()))
            .collect()
    }

    pub fn similar_items_by_id(&self, ids: &[ItemId]) -> DomainResult<Vec<Vec<Index>>> {
        let items = self.search_by_id(ids)?;
        Ok(self.similar_items(&items))
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::item::TaxonomyItem;

    use super::*;

    fn small() -> Taxonomy {
        let mut t = Taxonomy::with_root(TaxonomyItem::new(0, "Root"), "t", "1");
        let root = t.root().unwrap();
        let env = t.attach(TaxonomyItem::new(1, "Environment"), root);
        t.attach(TaxonomyItem::new(2, "Climate risk"), env);
        t.attach(TaxonomyItem::new(3, "Water"), env);
        let soc = t.attach(TaxonomyItem::new(4, "Social"), root);
        t.attach(TaxonomyItem::new(5, "CLIMATE justice"), soc);
        t
    }

    #[test]
    fn given_ids_when_search_by_id_then_returns_request_order() {
        let t = small();
        let found = t.search_by_id(&[ItemId(5), ItemId(1)]).unwrap();
        let names: Vec<_> = found.iter().map(|&i| t.name_of(i).unwrap()).collect();
        assert_eq!(names, vec!["CLIMATE justice", "Environment"]);
    }

    #[test]
    fn given_some_unknown_ids_when_search_by_id_then_reports_only_missing() {
        let t = small();
        let err = t
            .search_by_id(&[ItemId(1), ItemId(30), ItemId(31), ItemId(30)])
            .unwrap_err();
        assert_eq!(err, DomainError::IdNotFound(vec![ItemId(30), ItemId(31)]));
    }

    #[test]
    fn given_empty_taxonomy_when_search_then_empty_error() {
        let t = Taxonomy::default();
        assert_eq!(t.search_by_id(&[ItemId(1)]), Err(DomainError::EmptyTaxonomy));
        assert_eq!(t.search_by_term("x"), Err(DomainError::EmptyTaxonomy));
    }

    #[test]
    fn given_mixed_case_names_when_search_by_term_then_case_insensitive() {
        let t = small();
        assert_eq!(t.search_by_term("climate").unwrap().len(), 2);
        assert_eq!(t.search_by_term("ClImAtE").unwrap().len(), 2);
    }

    #[test]
    fn given_root_when_siblings_then_empty() {
        let t = small();
        assert!(t.siblings(t.root().unwrap()).is_empty());
        assert!(t.similar_items(&[t.root().unwrap()]).is_empty());
    }

    #[test]
    fn given_items_sharing_parent_when_similar_items_then_parent_listed_once() {
        let t = small();
        let items = t.search_by_id(&[ItemId(2), ItemId(3), ItemId(5)]).unwrap();
        let groups = t.similar_items(&items);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 1);
    }
}
