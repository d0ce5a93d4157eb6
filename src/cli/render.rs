//! Hierarchy drawing via termtree.

use termtree::Tree;
use tracing::instrument;

use crate::domain::{DisplayRow, DomainResult, Index, Taxonomy};

pub trait TaxonomyConvert {
    /// Drawing of the subtree below `start`, labelled `name : score`.
    fn to_tree_string(&mut self, start: Index, precision: usize) -> DomainResult<Tree<String>>;
}

impl TaxonomyConvert for Taxonomy {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&mut self, start: Index, precision: usize) -> DomainResult<Tree<String>> {
        let rows = self.display_rows(start)?;
        Ok(rows_to_tree(&rows, precision))
    }
}

fn label(row: &DisplayRow, precision: usize) -> String {
    format!("{} : {:.*}", row.name, precision, row.score)
}

/// Fold pre-order rows into a tree: the stack holds the open ancestors of
/// the current row, closed subtrees are pushed into their parent.
fn rows_to_tree(rows: &[DisplayRow], precision: usize) -> Tree<String> {
    let mut stack: Vec<Tree<String>> = Vec::new();

    for row in rows {
        while stack.len() > row.depth.max(1) {
            close_top(&mut stack);
        }
        stack.push(Tree::new(label(row, precision)));
    }
    while stack.len() > 1 {
        close_top(&mut stack);
    }
    stack
        .pop()
        .unwrap_or_else(|| Tree::new("Empty taxonomy".to_string()))
}

fn close_top(stack: &mut Vec<Tree<String>>) {
    if let Some(done) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.push(done);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::TaxonomyItem;

    use super::*;

    #[test]
    fn given_scored_tree_when_drawn_then_nests_children_with_scores() {
        let mut t = Taxonomy::with_root(TaxonomyItem::new(0, "ESG"), "ESG", "1");
        let root = t.root().unwrap();
        let env = t.attach(TaxonomyItem::new(1, "Environment"), root);
        t.attach(TaxonomyItem::new(2, "Air").with_score(4.0), env);
        t.attach(TaxonomyItem::new(3, "Water").with_score(2.0), env);
        t.attach(TaxonomyItem::new(4, "Social").with_score(1.0), root);

        let tree = t.to_tree_string(root, 1).unwrap();

        assert_eq!(tree.root, "ESG : 7.0");
        assert_eq!(tree.leaves.len(), 2);
        assert_eq!(tree.leaves[0].root, "Environment : 6.0");
        assert_eq!(tree.leaves[0].leaves.len(), 2);
        assert_eq!(tree.leaves[1].root, "Social : 1.0");
        assert!(tree.to_string().contains("Water : 2.0"));
    }

    #[test]
    fn given_no_rows_when_folding_then_placeholder() {
        assert_eq!(rows_to_tree(&[], 2).root, "Empty taxonomy");
    }
}
