//! Model name display helpers
//!
//! Only used for presentation. Pricing always works on the raw identifier.

/// Strip the `claude-` prefix and a trailing `-YYYYMMDD` release date.
///
/// # Examples
/// ```
/// use ccdaily::services::normalizer::short_model_name;
///
/// assert_eq!(short_model_name("claude-opus-4-20250514"), "opus-4");
/// assert_eq!(short_model_name("gpt-4o"), "gpt-4o");
/// ```
pub fn short_model_name(model: &str) -> String {
    let name = model.strip_prefix("claude-").unwrap_or(model);

    // Pattern: ends with -YYYYMMDD where YYYYMMDD is 8 digits starting with 20
    if let Some(suffix_start) = name.rfind('-') {
        let suffix = &name[suffix_start + 1..];
        if suffix.len() == 8
            && suffix.starts_with("20")
            && suffix.chars().all(|c| c.is_ascii_digit())
        {
            return name[..suffix_start].to_string();
        }
    }

    name.to_string()
}

/// Family label: "Claude Opus", "Claude Sonnet", "Claude Haiku", or the name as-is.
pub fn model_family(model: &str) -> &str {
    if model.contains("opus") {
        "Claude Opus"
    } else if model.contains("sonnet") {
        "Claude Sonnet"
    } else if model.contains("haiku") {
        "Claude Haiku"
    } else {
        model
    }
}

/// Comma-separated short names, or `-` when there are none.
pub fn join_short_names(models: &[String]) -> String {
    if models.is_empty() {
        return "-".to_string();
    }
    models
        .iter()
        .map(|m| short_model_name(m))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name_strips_prefix_and_date() {
        assert_eq!(short_model_name("claude-sonnet-4-20250514"), "sonnet-4");
        assert_eq!(short_model_name("claude-3-7-sonnet-20250219"), "3-7-sonnet");
    }

    #[test]
    fn test_short_name_without_date() {
        assert_eq!(short_model_name("claude-opus-4-1"), "opus-4-1");
    }

    #[test]
    fn test_short_name_keeps_non_date_suffix() {
        // 8 digits but not starting with 20
        assert_eq!(short_model_name("model-12345678"), "model-12345678");
        // 7 digits
        assert_eq!(short_model_name("claude-x-2025051"), "x-2025051");
    }

    #[test]
    fn test_short_name_passthrough() {
        assert_eq!(short_model_name("<synthetic>"), "<synthetic>");
        assert_eq!(short_model_name(""), "");
    }

    #[test]
    fn test_model_family() {
        assert_eq!(model_family("claude-opus-4-20250514"), "Claude Opus");
        assert_eq!(model_family("claude-sonnet-4-20250514"), "Claude Sonnet");
        assert_eq!(model_family("claude-3-5-haiku-20241022"), "Claude Haiku");
        assert_eq!(model_family("gpt-4o"), "gpt-4o");
    }

    #[test]
    fn test_join_short_names() {
        assert_eq!(join_short_names(&[]), "-");
        assert_eq!(
            join_short_names(&[
                "claude-opus-4-20250514".to_string(),
                "claude-sonnet-4-20250514".to_string()
            ]),
            "opus-4, sonnet-4"
        );
    }
}
