use std::collections::HashMap;

/// Parse query parameters from a URI string. Values are URL-decoded; when a
/// key repeats, the last occurrence wins.
pub fn parse_query_params(uri: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    if let Some(query_start) = uri.find('?') {
        let query = &uri[query_start + 1..];
        for param in query.split('&') {
            if let Some(eq_idx) = param.find('=') {
                let key = &param[..eq_idx];
                let encoded_value = &param[eq_idx + 1..];
                let decoded = urlencoding::decode(encoded_value)
                    .unwrap_or(std::borrow::Cow::Borrowed(encoded_value))
                    .to_string();
                params.insert(key.to_string(), decoded);
            } else {
                // Flag parameter without value
                params.insert(param.to_string(), String::new());
            }
        }
    }

    params
}

pub fn get_string(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params.get(key).cloned()
}

pub fn get_bool_flag(params: &HashMap<String, String>, key: &str) -> bool {
    params.get(key).map(|v| v == "true").unwrap_or(false)
}

/// Page number from the query, clamped to at least 1.
pub fn get_page(params: &HashMap<String, String>) -> usize {
    params
        .get("page")
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1)
        .max(1)
}
