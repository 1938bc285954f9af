use repcount_formats::{format_gr, parse_gr, parse_td};
use proptest::prelude::*;

fn edge(max_vertex: u32) -> impl Strategy<Value = Vec<u32>> {
    proptest::collection::btree_set(0..max_vertex, 1..=4).prop_map(|s| s.into_iter().collect())
}

fn bags() -> impl Strategy<Value = Vec<Vec<u32>>> {
    proptest::collection::vec(
        proptest::collection::btree_set(0u32..12, 0..=5).prop_map(|s| s.into_iter().collect()),
        1..=6,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn formatted_hypergraphs_parse_back(edges in proptest::collection::vec(edge(20), 0..12)) {
        let text = format_gr("hg", 20, &edges);
        let parsed = parse_gr(&text).expect("parse");
        prop_assert_eq!(parsed.declared_vertices, Some(20));
        prop_assert_eq!(parsed.declared_edges, Some(edges.len() as u32));
        prop_assert_eq!(&parsed.edges, &edges);
        prop_assert_eq!(parsed.vertex_bound(), 20);
    }

    #[test]
    fn td_root_is_first_largest_bag(bags in bags()) {
        let mut text = String::new();
        for (i, bag) in bags.iter().enumerate() {
            let ids: Vec<String> = bag.iter().map(|v| (v + 1).to_string()).collect();
            text.push_str(&format!("b {} {}\n", i + 1, ids.join(" ")));
        }
        for i in 1..bags.len() {
            text.push_str(&format!("{} {}\n", i, i + 1));
        }

        let td = parse_td(&text).expect("parse");
        let max = bags.iter().map(Vec::len).max().unwrap_or(0);
        let expected_root = bags.iter().position(|b| b.len() == max).unwrap() as u32 + 1;
        prop_assert_eq!(td.root, expected_root);
        prop_assert_eq!(td.treewidth(), max.saturating_sub(1));
        prop_assert_eq!(td.edges.len(), bags.len() - 1);
    }
}
