//! Flat and nested projections used by the file readers and writers.

use std::fmt;

use generational_arena::Index;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainResult;
use crate::domain::item::{ItemId, Metadata, TaxonomyItem};
use crate::domain::taxonomy::Taxonomy;

fn default_weight() -> f64 {
    1.0
}

/// One item as a flat attribute map; links are projected to ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub grouping: Option<String>,
    #[serde(default)]
    pub parent: Option<ItemId>,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub score: f64,
    /// `None` for leaves
    #[serde(default)]
    pub children: Option<Vec<ItemId>>,
    #[serde(default, alias = "meta_data")]
    pub metadata: Metadata,
}

impl ItemRecord {
    /// Detached item carrying this record's attributes.
    pub fn to_item(&self) -> TaxonomyItem {
        let mut item = TaxonomyItem::new(self.id, self.name.clone())
            .with_level(self.level)
            .with_score(self.score)
            .with_weight(self.weight);
        item.grouping = self.grouping.clone();
        item.metadata = self.metadata.clone();
        item
    }
}

impl fmt::Display for ItemRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "name: {}", self.name)?;
        writeln!(f, "id: {}", self.id)?;
        writeln!(f, "level: {}", self.level)?;
        match &self.children {
            Some(ids) => writeln!(f, "children: [{}]", ids.iter().join(", "))?,
            None => writeln!(f, "children: -")?,
        }
        match self.parent {
            Some(id) => writeln!(f, "parent: {}", id)?,
            None => writeln!(f, "parent: -")?,
        }
        writeln!(f, "score: {}", self.score)?;
        writeln!(f, "weight: {}", self.weight)?;
        write!(
            f,
            "metadata: {{{}}}",
            self.metadata
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .join(", ")
        )
    }
}

/// Record whose `children` hold nested projections instead of ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedRecord {
    pub id: ItemId,
    pub name: String,
    pub level: u32,
    pub grouping: Option<String>,
    pub parent: Option<ItemId>,
    pub weight: f64,
    pub score: f64,
    pub children: Option<Vec<Nested>>,
    pub metadata: Metadata,
}

impl NestedRecord {
    fn from_record(record: ItemRecord, children: Option<Vec<Nested>>) -> Self {
        Self {
            id: record.id,
            name: record.name,
            level: record.level,
            grouping: record.grouping,
            parent: record.parent,
            weight: record.weight,
            score: record.score,
            children,
            metadata: record.metadata,
        }
    }
}

/// Hierarchical projection.
///
/// A leaf projects to a one-element `Group`; an internal item to a `Node`
/// whose children are the projections of its children. A single child that
/// is itself internal is wrapped in a one-element list, a single leaf child
/// contributes its group directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Nested {
    Node(NestedRecord),
    Group(Vec<Nested>),
}

impl Nested {
    /// Every record in the projection, depth-first.
    pub fn records(&self) -> Vec<&NestedRecord> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(current) = stack.pop() {
            match current {
                Nested::Node(record) => {
                    out.push(record);
                    if let Some(children) = &record.children {
                        stack.extend(children.iter().rev());
                    }
                }
                Nested::Group(members) => stack.extend(members.iter().rev()),
            }
        }
        out
    }
}

impl Taxonomy {
    /// Flat record for `idx`, `None` if the item is gone.
    pub fn to_record(&self, idx: Index) -> Option<ItemRecord> {
        let item = self.get(idx)?;
        let children = if item.is_leaf() {
            None
        } else {
            Some(
                item.children()
                    .iter()
                    .filter_map(|&c| self.id_of(c))
                    .collect(),
            )
        };
        Some(ItemRecord {
            id: item.id(),
            name: item.name.clone(),
            level: item.level,
            grouping: item.grouping.clone(),
            parent: item.parent().and_then(|p| self.id_of(p)),
            weight: item.weight,
            score: item.score,
            children,
            metadata: item.metadata.clone(),
        })
    }

    pub fn items_to_records(&self) -> DomainResult<Vec<ItemRecord>> {
        Ok(self.items_to_records_from(self.require_root()?))
    }

    /// Records in `items_from` order (root first, breadth-first).
    pub fn items_to_records_from(&self, start: Index) -> Vec<ItemRecord> {
        self.items_from(start)
            .into_iter()
            .filter_map(|idx| self.to_record(idx))
            .collect()
    }

    pub fn tree_to_nested(&self) -> DomainResult<Nested> {
        Ok(self.tree_to_nested_from(self.require_root()?))
    }

    pub fn tree_to_nested_from(&self, start: Index) -> Nested {
        let Some(record) = self.to_record(start) else {
            return Nested::Group(Vec::new());
        };
        let children: Vec<Index> = self
            .get(start)
            .map(|item| item.children().to_vec())
            .unwrap_or_default();

        match children.as_slice() {
            [] => Nested::Group(vec![Nested::Node(NestedRecord::from_record(record, None))]),
            [only] => {
                let nested = match self.tree_to_nested_from(*only) {
                    Nested::Group(members) => members,
                    node => vec![node],
                };
                Nested::Node(NestedRecord::from_record(record, Some(nested)))
            }
            many => {
                let nested = many.iter().map(|&c| self.tree_to_nested_from(c)).collect();
                Nested::Node(NestedRecord::from_record(record, Some(nested)))
            }
        }
    }
}
