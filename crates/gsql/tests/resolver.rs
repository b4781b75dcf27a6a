//! Binding paths and reading or writing through them.

mod common;

use common::{node, sub, Node, SubNode2};
use gsql::{
    assign, ensure_path, project, resolve, resolve_values, Number, PropertyPath, Record,
    ResolutionError, Value,
};

fn path(text: &str) -> PropertyPath {
    PropertyPath::bind(text, Node::schema()).unwrap()
}

// ============================================================================
// Binding
// ============================================================================

#[test]
fn bind_normalizes_names() {
    assert_eq!(path("Sub_Node_Slice.String").id(), "node.subnodeslice.string");
    assert_eq!(path("node.MapPrimary[Key1].string").id(), "node.mapprimary[Key1].string");
    assert_eq!(path("subnode2slice").segments().len(), 1);
}

#[test]
fn bind_errors() {
    let schema = Node::schema();
    assert!(matches!(
        PropertyPath::bind("nosuch", schema),
        Err(ResolutionError::UnknownField { .. })
    ));
    assert!(matches!(
        PropertyPath::bind("subnode.nosuch", schema),
        Err(ResolutionError::UnknownField { ty, .. }) if ty == "SubNode"
    ));
    assert!(matches!(
        PropertyPath::bind("subnodeslice[x].string", schema),
        Err(ResolutionError::InvalidIndex { .. })
    ));
    assert!(matches!(
        PropertyPath::bind("string[0]", schema),
        Err(ResolutionError::KeyOnScalar { .. })
    ));
    assert_eq!(
        PropertyPath::bind("string.more", schema),
        Err(ResolutionError::NotAStruct("string".into()))
    );
    assert!(PropertyPath::bind("cache", schema).is_err());
}

// ============================================================================
// Reading
// ============================================================================

#[test]
fn scalar_read() {
    let node = node(3);
    assert_eq!(resolve_values(&node, &path("string")), vec![Value::String("node-3")]);
    assert_eq!(
        resolve_values(&node, &path("uint32")),
        vec![Value::Number(Number::U64(30))]
    );
}

#[test]
fn fan_out_read() {
    let node = node(1);
    assert_eq!(
        resolve_values(&node, &path("subnodeslice.string")),
        vec![Value::String("sub-1-1"), Value::String("sub-1-2")]
    );
    assert_eq!(
        resolve_values(&node, &path("mapprimary.string")),
        vec![Value::String("sub-1-4"), Value::String("sub-1-5")]
    );
    assert_eq!(
        resolve_values(&node, &path("mapprimary.subs.string")),
        vec![Value::String("subsub-1-4"), Value::String("subsub-1-5")]
    );
}

#[test]
fn collection_leaf_flattens() {
    let node = node(1);
    assert_eq!(resolve(&node, &path("stringslice")).len(), 1);
    assert_eq!(
        resolve_values(&node, &path("stringslice")),
        vec![Value::String("s1-0"), Value::String("s1-1")]
    );
    assert_eq!(
        resolve_values(&node, &path("subnodeslice")),
        vec![Value::Pointer, Value::Pointer]
    );
}

#[test]
fn collection_leaf_skips_nil_elements() {
    let mut node = node(1);
    node.sub_node_slice = vec![None, None];
    assert_eq!(resolve(&node, &path("subnodeslice")).len(), 1);
    assert!(resolve_values(&node, &path("subnodeslice")).is_empty());
}

#[test]
fn keyed_read() {
    let node = node(1);
    assert_eq!(
        resolve_values(&node, &path("subnodeslice[2].int32")),
        vec![Value::Number(Number::I64(2))]
    );
    assert!(resolve_values(&node, &path("subnodeslice[1].int32")).is_empty());
    assert!(resolve_values(&node, &path("subnodeslice[9].int32")).is_empty());
    assert!(resolve_values(&node, &path("mapprimary[nope].string")).is_empty());
}

#[test]
fn nil_pointer_read() {
    let mut node = node(1);
    node.sub_node = None;
    assert_eq!(resolve_values(&node, &path("subnode")), vec![Value::Nil]);
    assert!(resolve_values(&node, &path("subnode.string")).is_empty());
}

// ============================================================================
// Writing
// ============================================================================

#[test]
fn assign_creates_map_entries() {
    let mut node = Node::default();
    assign(&mut node, &path("mapprimary[k1].string"), &"hello".to_string()).unwrap();
    assert_eq!(node.map_primary.len(), 1);
    assert_eq!(node.map_primary["k1"].string, "hello");
}

#[test]
fn assign_grows_nested_slices() {
    let mut node = Node::default();
    assign(
        &mut node,
        &path("subnode2slice[1].sliceinslice[1].string"),
        &"deep".to_string(),
    )
    .unwrap();
    assert_eq!(node.sub_node2_slice.len(), 2);
    assert_eq!(node.sub_node2_slice[0], SubNode2::default());
    assert_eq!(node.sub_node2_slice[1].slice_in_slice.len(), 2);
    assert_eq!(node.sub_node2_slice[1].slice_in_slice[1].string, "deep");
}

#[test]
fn assign_allocates_pointers() {
    let mut node = Node::default();
    assign(&mut node, &path("subnode.int32"), &7i32).unwrap();
    assert_eq!(node.sub_node.map(|s| s.int32), Some(7));
}

#[test]
fn keyless_slice_writes_first_element() {
    let mut node = Node::default();
    assign(&mut node, &path("subnodeslice.string"), &"first".to_string()).unwrap();
    assert_eq!(node.sub_node_slice.len(), 1);
    assert_eq!(node.sub_node_slice[0].as_ref().unwrap().string, "first");
}

#[test]
fn keyless_map_write_fails() {
    let mut node = Node::default();
    assert_eq!(
        assign(&mut node, &path("mapprimary.string"), &"x".to_string()),
        Err(ResolutionError::MissingMapKey("mapprimary".into()))
    );
}

#[test]
fn assign_rejects_other_types() {
    let mut node = Node::default();
    assert_eq!(
        assign(&mut node, &path("int32"), &"x".to_string()),
        Err(ResolutionError::TypeMismatch("node.int32".into()))
    );
    assert_eq!(node.int32, 0);
}

#[test]
fn ensure_path_returns_existing_values() {
    let mut node = node(2);
    let target = ensure_path(&mut node, &path("mapprimary[k2].int32")).unwrap();
    assert!(target.set_from(&42i32));
    assert_eq!(node.map_primary["k2"].int32, 42);
    assert_eq!(node.map_primary.len(), 2);
}

#[test]
fn whole_struct_assignment() {
    let mut node = Node::default();
    assign(&mut node, &path("mapprimary[a]"), &sub(5, 5)).unwrap();
    assert_eq!(node.map_primary["a"], sub(5, 5));
}

// ============================================================================
// Projection
// ============================================================================

#[test]
fn project_copies_one_branch() {
    let src = node(1);
    let mut dst = Node::default();
    project(&src, &mut dst, &path("mapprimary[k2].subs.string")).unwrap();

    assert_eq!(dst.map_primary.len(), 1);
    let k2 = &dst.map_primary["k2"];
    assert_eq!(k2.string, "");
    assert_eq!(k2.subs["ss5"].string, "subsub-1-5");
}

#[test]
fn project_skips_absent_branches() {
    let mut src = node(1);
    src.sub_node = None;
    let mut dst = Node::default();
    project(&src, &mut dst, &path("subnode.string")).unwrap();
    assert_eq!(dst.sub_node, None);
}
