//! Taxonomy builder: wires flat records into a tree.

use std::collections::{HashMap, HashSet};

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::item::{ItemId, TaxonomyItem};
use crate::domain::record::ItemRecord;
use crate::domain::taxonomy::Taxonomy;

/// Id of the synthesized root every loaded taxonomy hangs from.
pub const ROOT_ID: ItemId = ItemId(0);

/// Constructs taxonomies from pre-ordered records.
///
/// Records must list every parent before its children. A record without a
/// parent attaches under a synthesized root named after the taxonomy label.
/// When a parent declares its child ids, children are ordered by that
/// declaration regardless of arrival order.
pub struct TaxonomyBuilder {
    label: String,
    version: String,
    include_metadata: bool,
}

impl TaxonomyBuilder {
    pub fn new(label: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            version: version.into(),
            include_metadata: false,
        }
    }

    /// Keep each record's metadata bag (dropped by default).
    pub fn include_metadata(mut self, include: bool) -> Self {
        self.include_metadata = include;
        self
    }

    #[instrument(level = "debug", skip(self, records), fields(label = %self.label))]
    pub fn build(&self, records: &[ItemRecord]) -> DomainResult<Taxonomy> {
        let mut taxonomy = Taxonomy::with_root(
            TaxonomyItem::new(ROOT_ID, self.label.clone()),
            self.label.clone(),
            self.version.clone(),
        );
        let root = taxonomy.require_root()?;

        let mut loaded: HashMap<ItemId, Index> = HashMap::with_capacity(records.len() + 1);
        loaded.insert(ROOT_ID, root);
        let mut declared: HashMap<Index, Vec<ItemId>> = HashMap::new();

        for record in records {
            if loaded.contains_key(&record.id) {
                return Err(DomainError::DuplicateId(record.id));
            }

            let parent_idx = match record.parent {
                None => root,
                Some(parent_id) => *loaded.get(&parent_id).ok_or_else(|| {
                    DomainError::InvalidRecord {
                        id: record.id,
                        reason: format!("parent {} not loaded before its child", parent_id),
                    }
                })?,
            };

            if let Some(slots) = declared.get(&parent_idx) {
                if !slots.contains(&record.id) {
                    return Err(DomainError::InvalidRecord {
                        id: record.id,
                        reason: "not declared among its parent's children".to_string(),
                    });
                }
            }

            let mut item = record.to_item();
            if !self.include_metadata {
                item.metadata.clear();
            }
            let idx = taxonomy.attach(item, parent_idx);
            loaded.insert(record.id, idx);

            if let Some(children) = record.children.as_ref().filter(|c| !c.is_empty()) {
                let mut seen = HashSet::with_capacity(children.len());
                if let Some(dup) = children.iter().find(|c| !seen.insert(**c)) {
                    return Err(DomainError::InvalidRecord {
                        id: record.id,
                        reason: format!("child {} declared twice", dup),
                    });
                }
                declared.insert(idx, children.clone());
            }
        }

        for (parent_idx, slots) in declared {
            Self::order_children(&mut taxonomy, parent_idx, &slots)?;
        }

        debug!("built taxonomy with {} items", taxonomy.len());
        Ok(taxonomy)
    }

    /// Put a parent's children into declared order, requiring every slot to be filled.
    fn order_children(
        taxonomy: &mut Taxonomy,
        parent_idx: Index,
        slots: &[ItemId],
    ) -> DomainResult<()> {
        let arrived: HashMap<ItemId, Index> = taxonomy
            .get(parent_idx)
            .map(|p| p.children().to_vec())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|c| taxonomy.id_of(c).map(|id| (id, c)))
            .collect();

        let mut ordered = Vec::with_capacity(slots.len());
        for id in slots {
            match arrived.get(id) {
                Some(&idx) => ordered.push(idx),
                None => {
                    return Err(DomainError::InvalidRecord {
                        id: taxonomy.id_of(parent_idx).unwrap_or(ROOT_ID),
                        reason: format!("declared child {} never supplied", id),
                    })
                }
            }
        }
        taxonomy.set_children(parent_idx, ordered);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::item::Metadata;

    use super::*;

    fn record(id: i64, name: &str, parent: Option<i64>, children: Option<Vec<i64>>) -> ItemRecord {
        ItemRecord {
            id: ItemId(id),
            name: name.to_string(),
            level: 0,
            grouping: None,
            parent: parent.map(ItemId),
            weight: 1.0,
            score: 0.0,
            children: children.map(|c| c.into_iter().map(ItemId).collect()),
            metadata: Metadata::new(),
        }
    }

    #[test]
    fn given_parentless_records_when_building_then_hang_from_synthesized_root() {
        let records = vec![record(1, "Environment", None, None), record(2, "Social", None, None)];
        let t = TaxonomyBuilder::new("ESG", "1.0").build(&records).unwrap();
        let root = t.get(t.root().unwrap()).unwrap();
        assert_eq!(root.id(), ROOT_ID);
        assert_eq!(root.name, "ESG");
        assert_eq!(root.children().len(), 2);
    }

    #[test]
    fn given_declared_order_when_children_arrive_shuffled_then_declared_order_wins() {
        let records = vec![
            record(1, "Environment", None, Some(vec![3, 2])),
            record(2, "Air", Some(1), None),
            record(3, "Water", Some(1), None),
        ];
        let t = TaxonomyBuilder::new("ESG", "1.0").build(&records).unwrap();
        assert_eq!(t.terms(), vec!["ESG", "Environment", "Water", "Air"]);
    }

    #[test]
    fn given_child_before_parent_when_building_then_invalid_record() {
        let records = vec![record(2, "Air", Some(1), None), record(1, "Environment", None, None)];
        let err = TaxonomyBuilder::new("ESG", "1.0").build(&records).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRecord { id: ItemId(2), .. }));
    }

    #[test]
    fn given_undeclared_child_when_building_then_invalid_record() {
        let records = vec![
            record(1, "Environment", None, Some(vec![2])),
            record(3, "Water", Some(1), None),
        ];
        let err = TaxonomyBuilder::new("ESG", "1.0").build(&records).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRecord { id: ItemId(3), .. }));
    }

    #[test]
    fn given_missing_declared_child_when_building_then_invalid_record() {
        let records = vec![record(1, "Environment", None, Some(vec![2, 3])), record(2, "Air", Some(1), None)];
        let err = TaxonomyBuilder::new("ESG", "1.0").build(&records).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRecord { id: ItemId(1), .. }));
    }

    #[test]
    fn given_child_declared_twice_when_building_then_invalid_record() {
        let records = vec![
            record(1, "Environment", None, Some(vec![2, 2])),
            record(2, "Air", Some(1), None),
        ];
        let err = TaxonomyBuilder::new("ESG", "1.0").build(&records).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidRecord {
                id: ItemId(1),
                reason: "child 2 declared twice".to_string(),
            }
        );
    }

    #[test]
    fn given_duplicate_id_when_building_then_rejected() {
        let records = vec![record(1, "a", None, None), record(1, "b", None, None)];
        let err = TaxonomyBuilder::new("ESG", "1.0").build(&records).unwrap_err();
        assert_eq!(err, DomainError::DuplicateId(ItemId(1)));
    }

    #[test]
    fn given_metadata_when_not_included_then_dropped() {
        let mut r = record(1, "a", None, None);
        r.metadata.insert("source".into(), "EU".into());
        let records = vec![r];

        let without = TaxonomyBuilder::new("ESG", "1.0").build(&records).unwrap();
        let with = TaxonomyBuilder::new("ESG", "1.0")
            .include_metadata(true)
            .build(&records)
            .unwrap();

        let id = ItemId(1);
        assert!(without.get(without.find(id).unwrap()).unwrap().metadata.is_empty());
        assert_eq!(with.get(with.find(id).unwrap()).unwrap().metadata.len(), 1);
    }
}
