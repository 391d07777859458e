/// Builds a [`Value`](crate::Value) from JSON-like literal syntax.
///
/// There is no `null`: the format has no null value.
///
/// # Examples
///
/// ```rust
/// use lacon::{lacon, Value};
///
/// let port = 8080;
/// let value = lacon!({
///     "name": "demo",
///     "port": port,
///     "ratio": -0.5,
///     "tags": ["a", "b"],
///     "tls": { "on": true }
/// });
///
/// assert_eq!(value.pointer(&["tls", "on"]), Some(&Value::Bool(true)));
/// assert_eq!(value.pointer(&["ratio"]).and_then(Value::as_f64), Some(-0.5));
/// ```
#[macro_export]
macro_rules! lacon {
    // Array elements, munched one at a time so negative literals work.
    (@array [$($elems:expr,)*]) => {
        vec![$($elems,)*]
    };
    (@array [$($elems:expr,)*] - $n:literal $(, $($rest:tt)*)?) => {
        $crate::lacon!(@array [$($elems,)* $crate::lacon!(-$n),] $($($rest)*)?)
    };
    (@array [$($elems:expr,)*] $next:tt $(, $($rest:tt)*)?) => {
        $crate::lacon!(@array [$($elems,)* $crate::lacon!($next),] $($($rest)*)?)
    };

    // Object entries.
    (@object $object:ident) => {};
    (@object $object:ident $key:literal : - $n:literal $(, $($rest:tt)*)?) => {
        $object.insert($key.to_string(), $crate::lacon!(-$n));
        $crate::lacon!(@object $object $($($rest)*)?);
    };
    (@object $object:ident $key:literal : $value:tt $(, $($rest:tt)*)?) => {
        $object.insert($key.to_string(), $crate::lacon!($value));
        $crate::lacon!(@object $object $($($rest)*)?);
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($tt:tt)+ ]) => {
        $crate::Value::Array($crate::lacon!(@array [] $($tt)+))
    };

    ({}) => {
        $crate::Value::Object($crate::Map::new())
    };

    ({ $($tt:tt)+ }) => {{
        let mut object = $crate::Map::new();
        $crate::lacon!(@object object $($tt)+);
        $crate::Value::Object(object)
    }};

    ($other:expr) => {
        $crate::Value::from($other)
    };
}
