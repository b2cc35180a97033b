pub const PROJECT_QUERY_KEY: &str = "project";
pub const DEFAULT_PROJECT_ID: &str = "default";

/// Project id named by a query string such as `?project=world&x=1`, if any.
pub fn requested_project_id(query: &str) -> Option<String> {
    query
        .trim_start_matches('?')
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(key, _)| decode_component(key) == PROJECT_QUERY_KEY)
        .map(|(_, value)| decode_component(value))
        .filter(|value| !value.is_empty())
}

/// Like [`requested_project_id`], selecting the default project when the
/// query names none.
pub fn project_id_from_query(query: &str) -> String {
    requested_project_id(query).unwrap_or_else(|| DEFAULT_PROJECT_ID.to_string())
}

pub fn project_query(project_id: &str) -> String {
    format!("?{PROJECT_QUERY_KEY}={}", urlencoding::encode(project_id))
}

/// Form-style decoding: `+` is a space, malformed escapes are kept verbatim.
fn decode_component(value: &str) -> String {
    let spaced = value.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}
