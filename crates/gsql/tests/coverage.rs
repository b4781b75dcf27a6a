//! Additional tests to improve code coverage.

mod common;

use std::cmp::Ordering;

use common::{node, registry, Node, SubNode};
use gsql::{
    compare, compare_values, normalize_name, Conjunction, Dir, EvalError, Kind, Number, Operator,
    QueryOptions, Record, Reflect, Registry, SchemaProvider, Segment, Shape, Value, View,
};

// ============================================================================
// Value and Number
// ============================================================================

#[test]
fn value_extractors() {
    assert_eq!(Value::String("hello").as_str(), Some("hello"));
    assert_eq!(Value::String("hello").as_number(), None);
    assert_eq!(
        Value::Number(Number::I64(42)).as_number(),
        Some(Number::I64(42))
    );
    assert_eq!(Value::Bool(true).as_bool(), Some(true));
    assert_eq!(Value::Nil.as_bool(), None);
    assert!(Value::Nil.is_nil());
    assert!(!Value::Pointer.is_nil());
}

#[test]
fn value_display() {
    assert_eq!(Value::String("abc").to_string(), "abc");
    assert_eq!(Value::Number(Number::I64(-3)).to_string(), "-3");
    assert_eq!(Value::Bool(false).to_string(), "false");
    assert_eq!(Value::Nil.to_string(), "nil");
    assert_eq!(Value::Struct("Node").to_string(), "<Node>");
}

#[test]
fn number_comparisons_across_variants() {
    assert_eq!(Number::I64(-1).compare(Number::U64(1)), Some(Ordering::Less));
    assert_eq!(
        Number::U64(u64::MAX).compare(Number::I64(i64::MAX)),
        Some(Ordering::Greater)
    );
    assert_eq!(Number::F64(1.5).compare(Number::I64(1)), Some(Ordering::Greater));
    assert_eq!(Number::F64(f64::NAN).compare(Number::I64(1)), None);
    assert!(Number::I64(0).is_zero());
    assert!(Number::F64(0.0).is_zero());
    assert!(!Number::U64(3).is_zero());
    assert_eq!(Number::U64(42).to_f64(), 42.0);
}

#[test]
fn kind_display() {
    assert_eq!(Kind::Uint.to_string(), "uint");
    assert!(Kind::Float.is_numeric());
    assert!(!Kind::Bool.is_numeric());
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn operator_tokens() {
    assert_eq!(Operator::NotIn.token(), " not in ");
    assert_eq!(Operator::NotIn.as_str(), "not in");
    assert_eq!(Operator::GtEq.to_string(), ">=");
    assert!(Operator::In.is_membership());
    assert!(!Operator::Eq.is_membership());
}

#[test]
fn operator_support_table() {
    for op in Operator::SEARCH_ORDER {
        assert!(op.supports(Kind::String));
        assert!(op.supports(Kind::Int));
        assert!(!op.supports(Kind::Struct));
    }
    assert!(Operator::NotEq.supports(Kind::Pointer));
    assert!(!Operator::In.supports(Kind::Pointer));
    assert!(!Operator::LtEq.supports(Kind::Bool));
}

#[test]
fn operator_ordering() {
    assert!(Operator::LtEq.eval_ordering(Ordering::Equal));
    assert!(!Operator::Lt.eval_ordering(Ordering::Equal));
    assert!(!Operator::In.eval_ordering(Ordering::Equal));
}

#[test]
fn conjunction_identity() {
    assert!(Conjunction::identity(None));
    assert!(Conjunction::identity(Some(Conjunction::And)));
    assert!(!Conjunction::identity(Some(Conjunction::Or)));
    assert_eq!(Conjunction::Or.to_string(), "or");
}

#[test]
fn compare_is_public() {
    let left = [Value::String("a"), Value::String("b")];
    assert_eq!(
        compare(Operator::Eq, &left, &[Value::String("B")], false),
        Ok(true)
    );
    assert_eq!(
        compare(Operator::Lt, &[Value::Pointer], &[Value::String("x")], false),
        Err(EvalError::Unsupported {
            op: Operator::Lt,
            kind: Kind::Pointer
        })
    );
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn compare_values_by_kind() {
    assert_eq!(
        compare_values(&Value::String("a"), &Value::String("b")),
        Some(Ordering::Less)
    );
    assert_eq!(
        compare_values(&Value::Bool(true), &Value::Bool(false)),
        Some(Ordering::Greater)
    );
    assert_eq!(compare_values(&Value::Nil, &Value::Nil), None);
    assert_eq!(Dir::default(), Dir::Asc);
    assert_eq!(Dir::Desc.apply(Ordering::Greater), Ordering::Less);
}

// ============================================================================
// Schema and reflection
// ============================================================================

#[test]
fn derived_schema() {
    let schema = Node::schema();
    assert_eq!(schema.name, "Node");
    assert!(schema.field("subnode2slice").is_some());
    assert!(schema.field("cache").is_none());
    assert_eq!(
        schema.field("mapprimary").map(|f| f.name),
        Some("map_primary")
    );
    assert_eq!(Node::MAP_PRIMARY, "map_primary");
    assert_eq!(SubNode::SUBS, "subs");
}

#[test]
fn shapes() {
    let field = Node::schema().field("subnodeslice").unwrap();
    let shape = (field.shape)();
    assert!(shape.is_collection());
    assert!(matches!(shape.element(), Shape::Struct(s) if s.name == "SubNode"));
    assert_eq!(format!("{:?}", shape), "List(Pointer(Struct(SubNode)))");
    assert!(matches!(<Node as Reflect>::shape(), Shape::Struct(_)));
}

#[test]
fn derived_views() {
    let node = node(1);
    match node.view() {
        View::Struct(s) => {
            assert_eq!(s.struct_schema().name, "Node");
            assert!(s.field("string").is_some());
            assert!(s.field("cache").is_none());
        }
        _ => panic!("expected struct view"),
    }

    let mut copy = Node::default();
    assert!(copy.set_from(&node));
    assert_eq!(copy, node);
    assert!(!copy.set_from(&SubNode::default()));
}

#[test]
fn registry_lookup() {
    let registry = registry();
    assert_eq!(registry.len(), 4);
    assert!(!registry.is_empty());
    assert!(registry.contains("NODE"));
    assert!(registry.contains("sub_sub_node"));
    assert!(!registry.contains("other"));

    let path = registry.resolve_path("mapprimary[k1].string", "node").unwrap();
    assert_eq!(path.root(), "Node");
    assert_eq!(path.segments()[0], Segment::new("map_primary", Some("k1")));
    assert!(registry.resolve_path("string", "other").is_err());

    assert!(Registry::new().is_empty());
}

#[test]
fn registering_twice_is_harmless() {
    let registry = Registry::new();
    registry.register::<Node>().register::<Node>();
    registry.register::<SubNode>();
    assert_eq!(registry.len(), 4);
}

#[test]
fn names_normalize() {
    assert_eq!(normalize_name("Sub_Node_2"), "subnode2");
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn options_from_json() {
    let options: QueryOptions =
        serde_json::from_str(r#"{ "default_limit": 25, "match_case": true }"#).unwrap();
    assert_eq!(options.max_limit, QueryOptions::DEFAULT_MAX_LIMIT);
    assert_eq!(options.default_limit, 25);
    assert!(options.match_case);

    let empty: QueryOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, QueryOptions::default());
}

// ============================================================================
// Derive attributes
// ============================================================================

#[derive(Debug, Clone, Default, Record)]
struct Host {
    #[gsql(rename = "hostname")]
    name: String,
    #[gsql(skip)]
    secret: String,
}

#[test]
fn renamed_fields_are_queried_by_new_name() {
    let registry = Registry::new();
    registry.register::<Host>();
    let hosts = vec![
        Host {
            name: "db-1".into(),
            secret: "x".into(),
        },
        Host {
            name: "web-1".into(),
            secret: "y".into(),
        },
    ];

    let query = gsql::Query::compile("select * from host where hostname = db*", &registry).unwrap();
    let matched = query.execute(&hosts);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].name, "db-1");

    assert!(gsql::Query::compile("select * from host where name = db-1", &registry).is_err());
    assert!(gsql::Query::compile("select * from host where secret = x", &registry).is_err());
}
