use lacon::{lacon, Map, Number, Value};

#[test]
fn test_lacon_macro_booleans() {
    assert_eq!(lacon!(true), Value::Bool(true));
    assert_eq!(lacon!(false), Value::Bool(false));
}

#[test]
fn test_lacon_macro_numbers() {
    assert_eq!(lacon!(42), Value::Number(Number::Integer(42)));
    assert_eq!(lacon!(3.5), Value::Number(Number::Float(3.5)));
    assert_eq!(lacon!(-123), Value::Number(Number::Integer(-123)));
    assert_eq!(lacon!(4.0), Value::Number(Number::Integer(4)));
}

#[test]
fn test_lacon_macro_strings() {
    assert_eq!(lacon!("hello"), Value::String("hello".to_string()));
    let owned = String::from("owned");
    assert_eq!(lacon!(owned), Value::String("owned".to_string()));
}

#[test]
fn test_lacon_macro_arrays() {
    assert_eq!(lacon!([]), Value::Array(vec![]));
    assert_eq!(
        lacon!([1, -2, -0.5, "x", [true]]),
        Value::Array(vec![
            Value::from(1),
            Value::from(-2),
            Value::from(-0.5),
            Value::from("x"),
            Value::Array(vec![Value::Bool(true)]),
        ])
    );
}

#[test]
fn test_lacon_macro_trailing_commas() {
    assert_eq!(lacon!([1, 2,]), lacon!([1, 2]));
    assert_eq!(lacon!({ "a": 1, }), lacon!({ "a": 1 }));
}

#[test]
fn test_lacon_macro_objects() {
    let value = lacon!({
        "name": "demo",
        "offset": -7,
        "nested": { "list": [{ "k": "v" }], "empty": {} }
    });

    let mut list_item = Map::new();
    list_item.insert("k".to_string(), Value::from("v"));
    let mut nested = Map::new();
    nested.insert("list".to_string(), Value::Array(vec![Value::Object(list_item)]));
    nested.insert("empty".to_string(), Value::Object(Map::new()));
    let mut expected = Map::new();
    expected.insert("name".to_string(), Value::from("demo"));
    expected.insert("offset".to_string(), Value::from(-7));
    expected.insert("nested".to_string(), Value::Object(nested));

    assert_eq!(value, Value::Object(expected));
}

#[test]
fn test_lacon_macro_preserves_key_order() {
    let value = lacon!({ "z": 1, "a": 2, "m": 3 });
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn test_lacon_macro_variables() {
    let port = 8080;
    let host = "localhost";
    let value = lacon!({ "host": host, "port": port });
    assert_eq!(value.pointer(&["host"]).and_then(Value::as_str), Some("localhost"));
    assert_eq!(value.pointer(&["port"]).and_then(Value::as_i64), Some(8080));
}
