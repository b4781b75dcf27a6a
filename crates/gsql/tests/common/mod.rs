//! Shared test model: a node graph with pointers, slices, slices of
//! pointers and maps.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};

use gsql::{Query, Record, Registry};

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct Node {
    pub string: String,
    pub int32: i32,
    pub uint32: u32,
    pub float64: f64,
    pub enabled: bool,
    pub string_slice: Vec<String>,
    pub sub_node: Option<SubNode>,
    pub sub_node_slice: Vec<Option<SubNode>>,
    pub sub_node2_slice: Vec<SubNode2>,
    pub map_primary: HashMap<String, SubNode>,
    pub labels: BTreeMap<String, String>,
    #[gsql(skip)]
    pub cache: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct SubNode {
    pub string: String,
    pub int32: i32,
    pub subs: HashMap<String, SubSubNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct SubNode2 {
    pub string: String,
    pub slice_in_slice: Vec<SubNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Record)]
pub struct SubSubNode {
    pub string: String,
}

pub fn registry() -> Registry {
    let registry = Registry::new();
    registry.register::<Node>();
    registry
}

pub fn compile(text: &str) -> Query {
    Query::compile(text, &registry()).unwrap()
}

pub fn sub(i: i32, j: i32) -> SubNode {
    SubNode {
        string: format!("sub-{}-{}", i, j),
        int32: j,
        subs: HashMap::from([(
            format!("ss{}", j),
            SubSubNode {
                string: format!("subsub-{}-{}", i, j),
            },
        )]),
    }
}

/// A fully populated node. `i` must not be negative.
pub fn node(i: i32) -> Node {
    Node {
        string: format!("node-{}", i),
        int32: i,
        uint32: (i * 10) as u32,
        float64: i as f64 + 0.5,
        enabled: i % 2 == 0,
        string_slice: vec![format!("s{}-0", i), format!("s{}-1", i)],
        sub_node: Some(sub(i, 0)),
        sub_node_slice: vec![Some(sub(i, 1)), None, Some(sub(i, 2))],
        sub_node2_slice: vec![SubNode2 {
            string: format!("n2-{}-0", i),
            slice_in_slice: vec![sub(i, 3)],
        }],
        map_primary: HashMap::from([("k1".to_string(), sub(i, 4)), ("k2".to_string(), sub(i, 5))]),
        labels: BTreeMap::from([("Env".to_string(), "prod".to_string())]),
        cache: 99,
    }
}

pub fn nodes(count: i32) -> Vec<Node> {
    (0..count).map(node).collect()
}
