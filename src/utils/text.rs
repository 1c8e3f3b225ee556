/// Lowercase, dash-separated form of a display name.
pub fn slugify(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                '-'
            }
        })
        .collect();
    slug.split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// `true` when the string holds anything besides whitespace.
pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Trimmed copy, or `None` when blank.
pub fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split a comma separated list, dropping blanks and duplicates.
pub fn parse_csv_list(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in raw.split(',') {
        if let Some(item) = non_blank(part) {
            if !out.contains(&item) {
                out.push(item);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Customer A"), "customer-a");
    }

    #[test]
    fn slugify_special_chars() {
        assert_eq!(slugify("Q4 2024 -- (EU) Dataset!!"), "q4-2024-eu-dataset");
    }

    #[test]
    fn whitespace_only_is_not_present() {
        assert!(!is_present(" \t\n"));
        assert!(is_present(" x "));
        assert_eq!(non_blank("  "), None);
        assert_eq!(non_blank(" a "), Some("a".to_string()));
    }

    #[test]
    fn csv_list_dedupes_and_trims() {
        assert_eq!(parse_csv_list(" a, b,,a ,c "), vec!["a", "b", "c"]);
    }
}
