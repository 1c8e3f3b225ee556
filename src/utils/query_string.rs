use urlencoding::encode;

/// Join key/value pairs into a percent-encoded query string. Repeated keys
/// are kept in order.
pub fn build_query_string(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
