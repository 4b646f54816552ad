//! URL-encoded form and query string decoding

use std::collections::HashMap;

use hyper::Uri;

/// Decode `application/x-www-form-urlencoded` data into a map.
///
/// When a key repeats, the first value wins. Malformed input decodes to an
/// empty map, so lookups simply miss.
pub fn parse_urlencoded(data: &[u8]) -> HashMap<String, String> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(data).unwrap_or_default();
    let mut map = HashMap::with_capacity(pairs.len());
    for (key, value) in pairs {
        map.entry(key).or_insert(value);
    }
    map
}

/// Decode the query string of `uri`
pub fn parse_query(uri: &Uri) -> HashMap<String, String> {
    uri.query()
        .map(|q| parse_urlencoded(q.as_bytes()))
        .unwrap_or_default()
}
