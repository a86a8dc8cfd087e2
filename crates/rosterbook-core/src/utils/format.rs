use std::cmp::Ordering;

/// Format a Brazilian phone number for display.
/// Mobile numbers become (DD) 9XXXX-XXXX and landlines (DD) XXXX-XXXX;
/// a leading 55 country code is dropped.
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    let national = match digits.len() {
        12 | 13 if digits.starts_with("55") => &digits[2..],
        _ => digits.as_str(),
    };

    match national.len() {
        11 => format!("({}) {}-{}", &national[0..2], &national[2..7], &national[7..11]),
        10 => format!("({}) {}-{}", &national[0..2], &national[2..6], &national[6..10]),
        _ => phone.to_string(), // Return original if can't format
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Case-insensitive substring match
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Case-insensitive ordering, falling back to byte order so distinct
/// strings never compare equal.
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Percentage of `part` in `whole`, 0 when `whole` is 0
pub fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        0
    } else {
        ((part as f64 / whole as f64) * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("11999991111"), "(11) 99999-1111");
        assert_eq!(format_phone("(11) 99999-1111"), "(11) 99999-1111");
        assert_eq!(format_phone("11 3333-4444"), "(11) 3333-4444");
        assert_eq!(format_phone("+55 11 99999-1111"), "(11) 99999-1111");
        assert_eq!(format_phone("+55 (21) 2555-0101"), "(21) 2555-0101");
        assert_eq!(format_phone("99999-1111"), "99999-1111"); // No area code
        assert_eq!(format_phone("123"), "123"); // Too short, return as-is
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("João Silva", 10), "João Silva");
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Maria Santos", "santos"));
        assert!(contains_ignore_case("Maria Santos", ""));
        assert!(!contains_ignore_case("Maria Santos", "silva"));
    }

    #[test]
    fn test_cmp_ignore_case() {
        assert_eq!(cmp_ignore_case("ana", "Bruno"), Ordering::Less);
        assert_eq!(cmp_ignore_case("Ana", "ana"), Ordering::Less);
        assert_eq!(cmp_ignore_case("Ana", "Ana"), Ordering::Equal);
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(7, 14), 50);
        assert_eq!(percent(14, 14), 100);
        assert_eq!(percent(1, 3), 33);
    }
}
