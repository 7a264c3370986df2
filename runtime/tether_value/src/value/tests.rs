use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_runtime_types() {
    assert_eq!(Value::Null.runtime_type(), None);
    assert_eq!(Value::from(1.5).runtime_type(), Some(TypeId::FLOAT));
    assert_eq!(Value::from(3_i64).runtime_type(), Some(TypeId::INT));
    assert_eq!(Value::from("a").runtime_type(), Some(TypeId::STR));
    assert_eq!(Value::list(vec![]).runtime_type(), Some(TypeId::LIST));
    assert_eq!(Value::map(BTreeMap::new()).runtime_type(), Some(TypeId::MAP));
}

#[test]
fn test_accessors() {
    assert_eq!(Value::from(2.0).as_float(), Some(2.0));
    assert_eq!(Value::from(2_i64).as_float(), None);
    assert_eq!(Value::from("hi").as_str(), Some("hi"));
    assert_eq!(Value::from(true).as_bool(), Some(true));
    assert!(Value::Null.is_null());

    let list = Value::list(vec![Value::from(1_i64), Value::Null]);
    assert_eq!(list.as_list().map(<[Value]>::len), Some(2));
}

#[test]
fn test_display() {
    let value = Value::map_from([
        ("a", Value::list(vec![Value::from(1_i64), Value::Null])),
        ("b", Value::from("x")),
    ]);
    assert_eq!(value.to_string(), r#"{"a": [1, null], "b": "x"}"#);
}
