use std::borrow::Cow;

use serde::Serialize;

use crate::alert::Alerter;
use crate::error::Result;

/// Escape text for safe insertion into HTML element content or a quoted
/// attribute value.
pub fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 16);
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Show `value` as indented JSON through `alerter`. Debugging aid only.
pub fn inspect<T: Serialize + ?Sized>(value: &T, alerter: &dyn Alerter) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    alerter.alert(&text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::MemoryAlerter;

    fn unescape(s: &str) -> String {
        s.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&")
    }

    #[test]
    fn escapes_markup_so_it_renders_literally() {
        let escaped = escape_html("<a>&\"</a>");
        assert_eq!(escaped, "&lt;a&gt;&amp;&quot;&lt;/a&gt;");
        assert!(!escaped.contains(['<', '>', '"']));
        assert_eq!(unescape(&escaped), "<a>&\"</a>");
    }

    #[test]
    fn borrows_plain_text() {
        assert!(matches!(escape_html("plain text 123"), Cow::Borrowed(_)));
    }

    #[test]
    fn inspect_alerts_pretty_json() {
        let alerter = MemoryAlerter::new();
        inspect(&serde_json::json!({"name": "smoke", "ok": true}), &alerter).unwrap();
        let messages = alerter.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("\n  \"name\": \"smoke\""));
    }
}
