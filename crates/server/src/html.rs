//! Minimal HTML page wrapper for the browser-facing diagnostic routes.

/// Escapes text for interpolation into HTML element content or attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = "body { font-family: sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; }
.status { padding: 15px; margin: 10px 0; border-radius: 8px; }
.success { background: #d4edda; color: #155724; border: 1px solid #c3e6cb; }
.warning { background: #fff3cd; color: #856404; border: 1px solid #ffeaa7; }
.error { background: #f8d7da; color: #721c24; border: 1px solid #f5c6cb; }
.token { background: #f5f5f5; padding: 10px; margin: 10px 0; border-radius: 4px; word-break: break-all; }
pre { background: #f8f9fa; padding: 10px; border-radius: 4px; overflow-x: auto; }
.btn { display: inline-block; padding: 10px 15px; margin: 5px; text-decoration: none; border-radius: 4px; color: white; background: #6441a5; }";

/// Wraps `body` (already escaped) in a complete document.
#[must_use]
pub fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape(title),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_page_wraps_body() {
        let html = page("Status", "<p>ok</p>");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Status</title>"));
        assert!(html.contains("<p>ok</p>"));
    }
}
