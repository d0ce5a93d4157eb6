//! Traversal, levels and search over the reference ESG taxonomy

use rstest::{fixture, rstest};

use taxotree::domain::{DomainError, ItemId, Taxonomy};
use taxotree::util::testing::{esg_taxonomy, init_test_setup};

#[fixture]
fn esg() -> Taxonomy {
    init_test_setup();
    esg_taxonomy()
}

fn names(t: &Taxonomy, items: &[taxotree::domain::Index]) -> Vec<String> {
    items
        .iter()
        .filter_map(|&idx| t.name_of(idx).map(str::to_string))
        .collect()
}

// ============================================================
// Levels and depth
// ============================================================

#[rstest]
fn given_esg_when_partitioned_by_level_then_sizes_match(esg: Taxonomy) {
    let levels = esg.items_by_level().unwrap();
    let sizes: Vec<usize> = levels.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![1, 2, 5, 16]);
    assert_eq!(esg.depth(), 4);
    assert_eq!(levels.iter().map(Vec::len).sum::<usize>(), esg.len());
}

#[rstest]
#[case(2, 2)]
#[case(11, 1)]
#[case(1, 3)]
#[case(0, 4)]
fn given_item_when_depth_from_then_counts_levels_below(
    esg: Taxonomy,
    #[case] id: i64,
    #[case] expected: usize,
) {
    let start = esg.find(ItemId(id)).unwrap();
    assert_eq!(esg.depth_from(start), expected);
}

#[rstest]
fn given_environment_when_listing_subtree_then_twelve_items(esg: Taxonomy) {
    let env = esg.find(ItemId(1)).unwrap();
    let items = esg.items_from(env);
    assert_eq!(items.len(), 12);
    assert_eq!(esg.terms_from(env)[0], "Environment");

    let ids = esg.all_ids_from(env);
    assert_eq!(ids[0], vec![ItemId(1)]);
    assert_eq!(ids[1], vec![ItemId(2), ItemId(5), ItemId(10)]);
}

#[rstest]
fn given_level_one_when_level_items_then_top_level_names(esg: Taxonomy) {
    let items = esg.level_items(1).unwrap();
    assert_eq!(names(&esg, &items), vec!["Environment", "Social"]);
}

#[rstest]
fn given_level_beyond_depth_when_level_items_then_out_of_range(esg: Taxonomy) {
    assert_eq!(
        esg.level_items(4),
        Err(DomainError::LevelOutOfRange { level: 4, depth: 4 })
    );
}

#[rstest]
fn given_esg_when_iterating_then_preorder_and_postorder_agree_on_size(esg: Taxonomy) {
    let pre: Vec<ItemId> = esg.iter().map(|(_, item)| item.id()).collect();
    let post: Vec<ItemId> = esg.iter_postorder().map(|(_, item)| item.id()).collect();

    assert_eq!(pre.len(), 24);
    assert_eq!(post.len(), 24);
    assert_eq!(pre[..4], [ItemId(0), ItemId(1), ItemId(2), ItemId(3)]);
    assert_eq!(post.first(), Some(&ItemId(3)));
    assert_eq!(post.last(), Some(&ItemId(0)));
}

#[rstest]
fn given_esg_when_collecting_leaves_then_sixteen(esg: Taxonomy) {
    assert_eq!(esg.leaf_items().len(), 16);
}

// ============================================================
// Search
// ============================================================

#[rstest]
fn given_terms_when_search_by_name_then_grouped_per_term(esg: Taxonomy) {
    let groups = esg.search_by_name(&["climate", "impact"]).unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(
        names(&esg, &groups[0]),
        vec!["Climate change", "Climate adaptation", "Climate mitigation"]
    );
    assert_eq!(
        names(&esg, &groups[1]),
        vec!["Social impact", "Impact investing"]
    );
}

#[rstest]
fn given_unmatched_term_when_search_by_term_then_empty(esg: Taxonomy) {
    assert!(esg.search_by_term("nuclear").unwrap().is_empty());
}

#[rstest]
fn given_known_ids_when_search_by_id_then_request_order_kept(esg: Taxonomy) {
    let found = esg.search_by_id(&[ItemId(21), ItemId(3)]).unwrap();
    assert_eq!(names(&esg, &found), vec!["Community engagement", "Air pollution"]);
}

#[rstest]
fn given_every_id_reversed_when_search_by_id_then_all_items_in_request_order(esg: Taxonomy) {
    let mut requested: Vec<ItemId> = esg.all_ids().unwrap().into_iter().flatten().collect();
    requested.reverse();

    let found = esg.search_by_id(&requested).unwrap();

    assert_eq!(found.len(), esg.len());
    let ids: Vec<ItemId> = found.iter().map(|&idx| esg.id_of(idx).unwrap()).collect();
    assert_eq!(ids, requested);
}

#[rstest]
fn given_unknown_ids_when_search_by_id_then_lists_missing_only(esg: Taxonomy) {
    let err = esg
        .search_by_id(&[ItemId(3), ItemId(30), ItemId(31)])
        .unwrap_err();
    assert_eq!(err, DomainError::IdNotFound(vec![ItemId(30), ItemId(31)]));
    assert_eq!(err.to_string(), "ids not found in taxonomy: 30, 31");
}

#[rstest]
fn given_items_in_two_families_when_similar_items_then_two_groups(esg: Taxonomy) {
    let groups = esg.similar_items_by_id(&[ItemId(21), ItemId(11)]).unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(
        names(&esg, &groups[0]),
        vec!["Community engagement", "Donations", "Impact investing"]
    );
    assert_eq!(names(&esg, &groups[1]), vec!["Deforestation", "Habitat loss"]);
}

#[rstest]
fn given_siblings_of_one_family_when_similar_items_then_single_group(esg: Taxonomy) {
    let groups = esg.similar_items_by_id(&[ItemId(11), ItemId(12)]).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[rstest]
fn given_terms_when_similar_names_then_names_returned(esg: Taxonomy) {
    let names = esg.similar_names(&["air"]).unwrap();
    assert_eq!(names, vec![vec!["Air quality", "Air pollution"]]);
}

#[test]
fn given_empty_taxonomy_when_searching_then_empty_taxonomy_error() {
    let t = Taxonomy::default();
    assert_eq!(t.search_by_name(&["x"]), Err(DomainError::EmptyTaxonomy));
    assert_eq!(t.search_by_id(&[ItemId(1)]), Err(DomainError::EmptyTaxonomy));
    assert_eq!(t.items_by_level(), Err(DomainError::EmptyTaxonomy));
}
