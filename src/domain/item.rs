//! Taxonomy items: identity, attributes and ownership links

use std::collections::BTreeMap;
use std::fmt;

use generational_arena::Index;
use serde::{Deserialize, Serialize};

/// Externally assigned, tree-unique item identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ItemId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Scalar value stored in an item's metadata bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl Scalar {
    /// Interpret a raw text cell: empty is `Null`, then bool, integer, float, text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Scalar::Null;
        }
        match trimmed {
            "true" | "True" | "TRUE" => return Scalar::Bool(true),
            "false" | "False" | "FALSE" => return Scalar::Bool(false),
            _ => {}
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Scalar::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Scalar::Float(f);
        }
        Scalar::Text(trimmed.to_string())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Text(s) => write!(f, "{}", s),
            Scalar::Null => Ok(()),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

/// Open, dataset-specific attributes. Opaque to the engine.
pub type Metadata = BTreeMap<String, Scalar>;

/// One category or leaf entry of a taxonomy.
///
/// `parent` and `children` are arena indices owned by the enclosing
/// [`Taxonomy`](crate::domain::Taxonomy). They are only rewired by its
/// mutation operations; a freshly constructed item is detached.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomyItem {
    id: ItemId,
    /// Display label, not unique
    pub name: String,
    /// Stored depth hint (root = 0), not kept in sync with the structure
    pub level: u32,
    /// Free-form classification tag
    pub grouping: Option<String>,
    /// Raw input for leaves, aggregated total for internal items
    pub score: f64,
    /// Multiplier applied at leaf evaluation only
    pub weight: f64,
    pub metadata: Metadata,
    pub(crate) parent: Option<Index>,
    pub(crate) children: Vec<Index>,
}

impl TaxonomyItem {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level: 0,
            grouping: None,
            score: 0.0,
            weight: 1.0,
            metadata: Metadata::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_grouping(mut self, grouping: impl Into<String>) -> Self {
        self.grouping = Some(grouping.into());
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn parent(&self) -> Option<Index> {
        self.parent
    }

    pub fn children(&self) -> &[Index] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Leaf contribution to its ancestors' totals.
    pub fn weighted_score(&self) -> f64 {
        self.score * self.weight
    }

    /// Copy of the attributes without any links, ready for re-insertion.
    pub fn detached(&self) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            ..self.clone()
        }
    }
}
