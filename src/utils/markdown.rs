/// Utility functions for Telegram MarkdownV2 formatting
///
/// Every character with a meaning in MarkdownV2 must be escaped before user
/// or configuration text is embedded in a formatted message.
const SPECIAL: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!', '\\',
];

/// Escapes markdown special characters for MarkdownV2 parsing mode
///
/// # Example
/// ```
/// use setup_wizard_bot::utils::markdown::escape_markdown;
///
/// let text = "Pick a role for *Support* (1/3)";
/// let escaped = escape_markdown(text);
/// assert_eq!(escaped, "Pick a role for \\*Support\\* \\(1/3\\)");
/// ```
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Wraps already escaped text in bold markers
pub fn bold(escaped: &str) -> String {
    format!("*{escaped}*")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_basic_markdown() {
        assert_eq!(escape_markdown("Hello *world*"), "Hello \\*world\\*");
        assert_eq!(escape_markdown("_italic_"), "\\_italic\\_");
        assert_eq!(escape_markdown("`code`"), "\\`code\\`");
    }

    #[test]
    fn test_escape_mentions() {
        assert_eq!(escape_markdown("<#123>"), "<\\#123\\>");
        assert_eq!(escape_markdown("<@&456>"), "<@&456\\>");
    }

    #[test]
    fn test_escape_backslash() {
        assert_eq!(escape_markdown("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_escape_empty_and_plain_text() {
        assert_eq!(escape_markdown(""), "");
        assert_eq!(escape_markdown("plain text"), "plain text");
        assert_eq!(escape_markdown("123 ABC"), "123 ABC");
    }

    #[test]
    fn test_bold() {
        assert_eq!(bold(&escape_markdown("Step 1.")), "*Step 1\\.*");
    }
}
