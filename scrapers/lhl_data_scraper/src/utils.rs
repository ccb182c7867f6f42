/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn clean_space(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim a field and treat an empty result as absent.
pub fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Lenient integer coercion for table cells like "12" or "+7".
pub fn to_int(s: &str) -> i64 {
    s.trim().trim_start_matches('+').parse().unwrap_or(0)
}

/// Lenient float coercion for table cells like ".625" or "+0.5".
pub fn to_float(s: &str) -> f64 {
    s.trim().trim_start_matches('+').parse().unwrap_or(0.0)
}

/// Normalize a table header to snake_case, e.g. "W %" -> "w_pct".
pub fn normalize_header(header: &str) -> String {
    let lowered = header.trim().to_lowercase().replace('%', "pct");
    let mut out = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_space() {
        assert_eq!(clean_space("  North  Durham \n Warriors "), "North Durham Warriors");
        assert_eq!(clean_space(""), "");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank("  3 "), Some("3".to_string()));
        assert_eq!(non_blank("   "), None);
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Team Name"), "team_name");
        assert_eq!(normalize_header("W %"), "w_pct");
        assert_eq!(normalize_header("GF%"), "gfpct");
        assert_eq!(normalize_header("  Pts  "), "pts");
    }

    #[test]
    fn test_coercions() {
        assert_eq!(to_int("+7"), 7);
        assert_eq!(to_int("-3"), -3);
        assert_eq!(to_int("n/a"), 0);
        assert_eq!(to_float(".625"), 0.625);
        assert_eq!(to_float("junk"), 0.0);
    }
}
