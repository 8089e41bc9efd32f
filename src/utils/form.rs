use serde::{Deserialize, Deserializer};

/// Blank values become `None` without parsing; callers decide what an unknown value means.
pub fn blank_as_none<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(de)?;
    Ok(opt
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Only same-site absolute paths are followed after login.
pub fn safe_next(next: Option<&str>) -> Option<String> {
    let next = next?.trim();
    if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') {
        let parsed = url::Url::parse("http://localhost").ok()?.join(next).ok()?;
        if parsed.host_str() == Some("localhost") {
            return Some(next.to_string());
        }
    }
    None
}
