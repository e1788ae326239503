/// Fixed-width, escaped preview of some text for trace output.
pub fn formatter_str(c: &str) -> String {
    let end = c
        .char_indices()
        .nth(33)
        .map(|(i, _)| i)
        .unwrap_or(c.len());
    let s = c[..end].escape_default().to_string();
    let s = s.replace("\\\"", "\"");
    let s = s.replace("\\\'", "\'");
    let s = &s[..s.len().min(33)];
    format!("{:<35}", "|".to_string() + s + "|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_formatter_str() {
        assert_eq!(formatter_str("ab").trim_end(), "|ab|");
        assert_eq!(formatter_str("a'b").trim_end(), "|a'b|");
        assert_eq!(formatter_str("a\tb").trim_end(), "|a\\tb|");
        assert_eq!(formatter_str("").len(), 35);
        // multibyte input is cut on a character boundary
        assert!(formatter_str(&"é".repeat(40)).starts_with("|\\u{e9}"));
    }
}
