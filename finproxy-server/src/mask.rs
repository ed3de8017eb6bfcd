/// Mask upstream API key suitable for use in logs.
pub fn api_key(key: &str) -> String {
    const DEFAULT_MASK: &str = "************";
    if key.chars().count() < 8 {
        DEFAULT_MASK.to_string()
    } else {
        format!("{}{}", key.chars().take(4).collect::<String>(), DEFAULT_MASK)
    }
}

/// Upstream URL with its trailing API key masked.
pub fn upstream_url(base_url: &str, key: &str) -> String {
    format!("{}{}", base_url, api_key(key))
}
