//! HTML helper functions

/// Escape text for use inside an element
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for use inside a double- or single-quoted attribute
pub fn escape_attr(s: &str) -> String {
    escape_html(s).replace('"', "&quot;").replace('\'', "&#39;")
}

/// Render `name="value"` pairs, each preceded by a space
pub fn attributes<'a>(attrs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    attrs
        .into_iter()
        .map(|(name, value)| {
            if value.is_empty() {
                format!(" {}", name)
            } else {
                format!(r#" {}="{}""#, name, escape_attr(value))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_html("say \"hi\""), "say \"hi\"");
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr(r#"a"b'c<"#), "a&quot;b&#39;c&lt;");
    }

    #[test]
    fn test_attributes() {
        assert_eq!(
            attributes([("href", "/a?x=1&y=2"), ("open", "")]),
            r#" href="/a?x=1&amp;y=2" open"#
        );
    }
}
