//! Inserting items and removing subtrees

use rstest::{fixture, rstest};

use taxotree::domain::{DomainError, Insertion, ItemId, ParentRef, Taxonomy, TaxonomyItem};
use taxotree::util::testing::{esg_taxonomy, init_test_setup};

#[fixture]
fn esg() -> Taxonomy {
    init_test_setup();
    esg_taxonomy()
}

// ============================================================
// insert()
// ============================================================

#[rstest]
fn given_parents_by_id_and_index_when_insert_then_appended_in_order(mut esg: Taxonomy) {
    let biodiversity = esg.find(ItemId(10)).unwrap();
    let inserted = esg
        .insert(vec![
            Insertion::new(TaxonomyItem::new(24, "Water quality"), ItemId(2)),
            Insertion::new(TaxonomyItem::new(25, "Species loss"), biodiversity),
        ])
        .unwrap();

    assert_eq!(inserted.len(), 2);
    assert_eq!(esg.len(), 26);

    let air = esg.find(ItemId(2)).unwrap();
    let last = *esg.get(air).unwrap().children().last().unwrap();
    assert_eq!(last, inserted[0]);
    assert_eq!(esg.get(inserted[0]).unwrap().parent(), Some(air));
    assert_eq!(esg.get(inserted[1]).unwrap().parent(), Some(biodiversity));
}

#[rstest]
fn given_unknown_parent_id_when_insert_then_nothing_changes(mut esg: Taxonomy) {
    let err = esg
        .insert(vec![
            Insertion::new(TaxonomyItem::new(24, "ok"), ItemId(2)),
            Insertion::new(TaxonomyItem::new(25, "orphan"), ItemId(99)),
        ])
        .unwrap_err();

    assert_eq!(err, DomainError::IdNotFound(vec![ItemId(99)]));
    assert_eq!(esg.len(), 24);
}

#[rstest]
fn given_removed_parent_index_when_insert_one_then_item_not_in_taxonomy(mut esg: Taxonomy) {
    let deforestation = esg.find(ItemId(11)).unwrap();
    esg.remove_subtree(&[deforestation]);

    let err = esg
        .insert_one(TaxonomyItem::new(30, "late"), ParentRef::Item(deforestation))
        .unwrap_err();
    assert_eq!(err, DomainError::ItemNotInTaxonomy);
}

#[rstest]
fn given_new_leaf_when_inserted_then_depth_grows(mut esg: Taxonomy) {
    esg.insert_one(TaxonomyItem::new(24, "Ground-level ozone"), ItemId(4))
        .unwrap();
    assert_eq!(esg.depth(), 5);
    assert_eq!(esg.level_items(4).unwrap().len(), 1);
}

// ============================================================
// remove_subtree()
// ============================================================

#[rstest]
fn given_environment_when_removed_then_whole_branch_gone(mut esg: Taxonomy) {
    let removed = esg.remove_by_id(&[ItemId(1)]).unwrap();

    assert_eq!(removed, 12);
    assert_eq!(esg.len(), 12);
    assert!(esg.search_by_term("climate").unwrap().is_empty());
    let root = esg.root().unwrap();
    assert_eq!(esg.get(root).unwrap().children().len(), 1);
}

#[rstest]
fn given_item_and_its_descendant_when_removed_together_then_descendant_skipped(mut esg: Taxonomy) {
    let removed = esg.remove_by_id(&[ItemId(5), ItemId(7)]).unwrap();
    assert_eq!(removed, 5);
    assert_eq!(esg.len(), 19);
}

#[rstest]
fn given_unknown_id_when_remove_by_id_then_nothing_removed(mut esg: Taxonomy) {
    let err = esg.remove_by_id(&[ItemId(3), ItemId(42)]).unwrap_err();
    assert_eq!(err, DomainError::IdNotFound(vec![ItemId(42)]));
    assert_eq!(esg.len(), 24);
}

#[rstest]
fn given_root_when_removed_then_taxonomy_empty(mut esg: Taxonomy) {
    let root = esg.root().unwrap();
    assert_eq!(esg.remove_subtree(&[root]), 24);
    assert!(esg.is_empty());
    assert_eq!(esg.root(), None);
    assert_eq!(esg.depth(), 0);
    assert_eq!(esg.items_by_level(), Err(DomainError::EmptyTaxonomy));
}

// ============================================================
// Properties
// ============================================================

#[rstest]
fn given_insert_when_removed_again_then_parent_children_restored(mut esg: Taxonomy) {
    let climate = esg.find(ItemId(5)).unwrap();
    let before = esg.get(climate).unwrap().children().len();

    let added = esg
        .insert_one(TaxonomyItem::new(24, "Net zero"), climate)
        .unwrap();
    assert_eq!(esg.get(climate).unwrap().children().len(), before + 1);

    esg.remove_subtree(&[added]);
    assert_eq!(esg.get(climate).unwrap().children().len(), before);
}

#[rstest]
#[case(3)]
#[case(14)]
fn given_removed_id_when_searched_then_id_not_found(mut esg: Taxonomy, #[case] id: i64) {
    esg.remove_by_id(&[ItemId(id)]).unwrap();
    assert_eq!(
        esg.search_by_id(&[ItemId(id)]),
        Err(DomainError::IdNotFound(vec![ItemId(id)]))
    );
}
