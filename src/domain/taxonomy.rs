use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::item::{ItemId, TaxonomyItem};

pub const DEFAULT_LABEL: &str = "Standard Taxonomy";
pub const DEFAULT_VERSION: &str = "0.1.0";

/// Arena-based taxonomy tree.
///
/// Items live in a generational arena; `children` indices own the subtree
/// below an item, `parent` is a plain back reference. A stale index (an item
/// removed earlier) resolves to nothing rather than to a recycled slot.
/// Each taxonomy has at most one root.
#[derive(Debug)]
pub struct Taxonomy {
    /// Arena storage for all items
    arena: Arena<TaxonomyItem>,
    /// Index of the root item, None for empty taxonomies
    root: Option<Index>,
    label: String,
    version: String,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL, DEFAULT_VERSION)
    }
}

impl Taxonomy {
    /// Empty taxonomy.
    pub fn new(label: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            label: label.into(),
            version: version.into(),
        }
    }

    /// Taxonomy seeded with `root`; any links the item carries are dropped.
    pub fn with_root(
        root: TaxonomyItem,
        label: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        let mut taxonomy = Self::new(label, version);
        let idx = taxonomy.arena.insert(root.detached());
        taxonomy.root = Some(idx);
        taxonomy
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    /// Root index or `EmptyTaxonomy`.
    pub fn require_root(&self) -> DomainResult<Index> {
        self.root.ok_or(DomainError::EmptyTaxonomy)
    }

    pub fn get(&self, idx: Index) -> Option<&TaxonomyItem> {
        self.arena.get(idx)
    }

    /// Mutable access to an item's attributes. Links are not reachable from here.
    pub fn get_mut(&mut self, idx: Index) -> Option<&mut TaxonomyItem> {
        self.arena.get_mut(idx)
    }

    pub fn contains(&self, idx: Index) -> bool {
        self.arena.contains(idx)
    }

    /// Number of live items.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn attach(&mut self, item: TaxonomyItem, parent: Index) -> Index {
        let mut item = item.detached();
        item.parent = Some(parent);
        let idx = self.arena.insert(item);
        if let Some(p) = self.arena.get_mut(parent) {
            p.children.push(idx);
        }
        idx
    }

    pub(crate) fn release(&mut self, idx: Index) -> Option<TaxonomyItem> {
        if self.root == Some(idx) {
            self.root = None;
        }
        self.arena.remove(idx)
    }

    pub(crate) fn set_children(&mut self, idx: Index, children: Vec<Index>) {
        if let Some(item) = self.arena.get_mut(idx) {
            item.children = children;
        }
    }

    pub fn id_of(&self, idx: Index) -> Option<ItemId> {
        self.get(idx).map(|item| item.id())
    }

    pub fn name_of(&self, idx: Index) -> Option<&str> {
        self.get(idx).map(|item| item.name.as_str())
    }

    /// Pre-order traversal of the whole taxonomy.
    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self, self.root)
    }

    /// Pre-order traversal of the subtree below `start`.
    pub fn iter_from(&self, start: Index) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self, Some(start))
    }

    /// Post-order (children before parent) traversal of the whole taxonomy.
    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, self.root)
    }

    pub fn iter_postorder_from(&self, start: Index) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, Some(start))
    }

    /// Number of levels of the whole taxonomy, 0 when empty.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.root.map(|root| self.depth_from(root)).unwrap_or(0)
    }

    /// Longest path from `start` down to any leaf, counted in items.
    ///
    /// A leaf has depth 1; an internal item has one more than its deepest
    /// child, so unbalanced branches are measured by their longest arm.
    #[instrument(level = "trace", skip(self))]
    pub fn depth_from(&self, start: Index) -> usize {
        if let Some(node) = self.get(start) {
            1 + node
                .children
                .iter()
                .map(|&child| self.depth_from(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Items grouped by distance from the root.
    pub fn items_by_level(&self) -> DomainResult<Vec<Vec<Index>>> {
        Ok(self.items_by_level_from(self.require_root()?))
    }

    /// Breadth-first partition of the subtree below `start`.
    ///
    /// Group 0 is `[start]`; each following group concatenates, in order,
    /// the children of every item of the previous group. Exactly
    /// `depth_from(start)` groups are produced.
    #[instrument(level = "debug", skip(self))]
    pub fn items_by_level_from(&self, start: Index) -> Vec<Vec<Index>> {
        let depth = self.depth_from(start);
        let mut levels = Vec::with_capacity(depth);
        let mut current = vec![start];

        for _ in 0..depth {
            let next: Vec<Index> = current
                .iter()
                .filter_map(|&idx| self.get(idx))
                .flat_map(|item| item.children.iter().copied())
                .collect();
            levels.push(current);
            current = next;
        }

        debug!("partitioned {} levels", levels.len());
        levels
    }

    /// Items at absolute depth `level` (0 = root).
    pub fn level_items(&self, level: usize) -> DomainResult<Vec<Index>> {
        let mut levels = self.items_by_level()?;
        let depth = levels.len();
        if level >= depth {
            return Err(DomainError::LevelOutOfRange { level, depth });
        }
        Ok(levels.swap_remove(level))
    }

    pub fn all_ids(&self) -> DomainResult<Vec<Vec<ItemId>>> {
        Ok(self.all_ids_from(self.require_root()?))
    }

    /// Level partition projected to ids.
    pub fn all_ids_from(&self, start: Index) -> Vec<Vec<ItemId>> {
        self.items_by_level_from(start)
            .into_iter()
            .map(|level| level.into_iter().filter_map(|idx| self.id_of(idx)).collect())
            .collect()
    }

    /// All items, root first and breadth-first overall. Empty for an empty taxonomy.
    pub fn items(&self) -> Vec<Index> {
        self.root.map(|root| self.items_from(root)).unwrap_or_default()
    }

    pub fn items_from(&self, start: Index) -> Vec<Index> {
        self.items_by_level_from(start).into_iter().flatten().collect()
    }

    /// Item names in `items()` order.
    pub fn terms(&self) -> Vec<String> {
        self.root.map(|root| self.terms_from(root)).unwrap_or_default()
    }

    pub fn terms_from(&self, start: Index) -> Vec<String> {
        self.items_from(start)
            .into_iter()
            .filter_map(|idx| self.name_of(idx).map(str::to_string))
            .collect()
    }

    /// Collects all leaf items (items with no children), left to right.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_items(&self) -> Vec<Index> {
        self.iter()
            .filter(|(_, item)| item.is_leaf())
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// Depth-first, parent before children, children left to right.
pub struct PreOrderIterator<'a> {
    taxonomy: &'a Taxonomy,
    stack: Vec<Index>,
}

impl<'a> PreOrderIterator<'a> {
    #[instrument(level = "trace", skip(taxonomy))]
    fn new(taxonomy: &'a Taxonomy, start: Option<Index>) -> Self {
        Self {
            taxonomy,
            stack: start.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (Index, &'a TaxonomyItem);

    #[instrument(level = "trace", skip(self))]
    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.taxonomy.get(current_idx) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev());
                return Some((current_idx, node));
            }
        }
        None
    }
}

/// Depth-first, children before parent. Drives score aggregation and removal.
pub struct PostOrderIterator<'a> {
    taxonomy: &'a Taxonomy,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    #[instrument(level = "trace", skip(taxonomy))]
    fn new(taxonomy: &'a Taxonomy, start: Option<Index>) -> Self {
        Self {
            taxonomy,
            stack: start.map(|idx| (idx, false)).into_iter().collect(),
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TaxonomyItem);

    #[instrument(level = "trace", skip(self))]
    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.taxonomy.get(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
