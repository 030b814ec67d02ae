use std::collections::HashMap;

/// Parse a `key=value; key=value` cookie string. Pieces without `=` are ignored.
pub fn parse_cookie_str(cookie_str: &str) -> HashMap<String, String> {
    cookie_str
        .split(';')
        .filter_map(|piece| piece.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// Build request params for REST endpoints. `optional` entries are only added when `Some`.
/// ```ignore
/// let params = query! {
///     required count => page_size,
///     optional since_id,
/// };
/// ```
#[macro_export]
macro_rules! query {
    (
        $(
            $kind:ident $name:ident $( => $val:expr )?
        ),+ $(,)?
    ) => {
        {
            let mut params: Vec<(&'static str, String)> = Vec::new();
            $(
                $crate::query_param!(params, $kind, stringify!($name), $crate::query_value!($( $val )?, $name));
            )+
            params
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! query_param {
    ($vec:ident, required, $key:expr, $val:expr) => {
        $vec.push(($key, $val.to_string()));
    };
    ($vec:ident, optional, $key:expr, $val:expr) => {
        if let Some(ref v) = $val {
            $vec.push(($key, v.to_string()));
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! query_value {
    (, $default:ident) => {
        $default
    };
    ($value:expr, $default:ident) => {
        $value
    };
}
