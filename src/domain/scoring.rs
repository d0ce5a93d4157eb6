//! Bottom-up weighted score aggregation.
//!
//! Leaves contribute `score * weight`. Every internal item gets its `score`
//! overwritten with the unweighted sum of its children's contributions;
//! later readers (level scores, summaries, display) rely on those stamps.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::error::DomainResult;
use crate::domain::taxonomy::Taxonomy;

/// Overview of a taxonomy after a fresh aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomySummary {
    pub label: String,
    pub version: String,
    pub item_count: usize,
    pub leaf_count: usize,
    pub root_score: f64,
    pub levels: usize,
    /// Name and aggregated score of each top-level item
    pub top_level: Vec<(String, f64)>,
}

impl fmt::Display for TaxonomySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.label, self.version)?;
        writeln!(f, "Number of items: {}", self.item_count)?;
        writeln!(f, "Number of leaves: {}", self.leaf_count)?;
        writeln!(f, "Overall weighted score: {}", self.root_score)?;
        write!(f, "Number of levels: {}", self.levels)?;
        for (name, score) in &self.top_level {
            write!(f, "\n  {}: {}", name, score)?;
        }
        Ok(())
    }
}

/// One line of a hierarchy drawing, in pre-order.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub idx: Index,
    pub name: String,
    pub score: f64,
    /// Distance from the drawing's start item
    pub depth: usize,
    /// Last child of its parent (always true for the start item)
    pub is_last: bool,
}

impl Taxonomy {
    /// Aggregate the whole taxonomy and return the root total.
    pub fn compute_scores(&mut self) -> DomainResult<f64> {
        let root = self.require_root()?;
        Ok(self.compute_scores_from(root))
    }

    /// Aggregate the subtree below `start` and return its total.
    ///
    /// Runs as an explicit post-order walk. Items outside the subtree are
    /// not touched and leaf scores are never written. A stale `start`
    /// yields 0.
    #[instrument(level = "debug", skip(self))]
    pub fn compute_scores_from(&mut self, start: Index) -> f64 {
        let order: Vec<Index> = self.iter_postorder_from(start).map(|(idx, _)| idx).collect();
        let mut totals: HashMap<Index, f64> = HashMap::with_capacity(order.len());

        for idx in order {
            let Some(item) = self.get(idx) else { continue };
            if item.is_leaf() {
                totals.insert(idx, item.weighted_score());
                continue;
            }
            let sum: f64 = item
                .children()
                .iter()
                .map(|child| totals.get(child).copied().unwrap_or(0.0))
                .sum();
            if let Some(item) = self.get_mut(idx) {
                item.score = sum;
            }
            totals.insert(idx, sum);
        }

        let total = totals.get(&start).copied().unwrap_or(0.0);
        debug!("aggregated score: {}", total);
        total
    }

    /// Aggregate, then map each item name at `level` to its score.
    /// Same-named items on one level: the later one wins.
    pub fn level_scores(&mut self, level: usize) -> DomainResult<BTreeMap<String, f64>> {
        self.compute_scores()?;
        let items = self.level_items(level)?;
        Ok(items
            .into_iter()
            .filter_map(|idx| self.get(idx).map(|item| (item.name.clone(), item.score)))
            .collect())
    }

    #[instrument(level = "debug", skip(self))]
    pub fn summary(&mut self) -> DomainResult<TaxonomySummary> {
        let root_score = self.compute_scores()?;
        let root = self.require_root()?;
        let top_level = self
            .get(root)
            .map(|r| r.children().to_vec())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|idx| self.get(idx).map(|item| (item.name.clone(), item.score)))
            .collect();

        Ok(TaxonomySummary {
            label: self.label().to_string(),
            version: self.version().to_string(),
            item_count: self.len(),
            leaf_count: self.leaf_items().len(),
            root_score,
            levels: self.depth(),
            top_level,
        })
    }

    /// Rows for drawing the subtree below `start`, scores freshly aggregated.
    pub fn display_rows(&mut self, start: Index) -> DomainResult<Vec<DisplayRow>> {
        self.require_root()?;
        self.compute_scores_from(start);

        let mut rows = Vec::new();
        let mut stack = vec![(start, 0usize, true)];
        while let Some((idx, depth, is_last)) = stack.pop() {
            let Some(item) = self.get(idx) else { continue };
            rows.push(DisplayRow {
                idx,
                name: item.name.clone(),
                score: item.score,
                depth,
                is_last,
            });
            let count = item.children().len();
            for (pos, &child) in item.children().iter().enumerate().rev() {
                stack.push((child, depth + 1, pos + 1 == count));
            }
        }
        Ok(rows)
    }
}
