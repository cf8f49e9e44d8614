//! Complete HTML pages handed to a [`crate::Renderer`].

use std::path::Path;

use url::Url;

use crate::ConversionError;

const STYLE: &str = "body{font-family:sans-serif;line-height:1.5;margin:1em 2em;}\
pre{background:#f4f4f4;padding:0.5em;overflow:auto;}\
code{font-family:monospace;}\
blockquote{border-left:3px solid #ccc;margin-left:0;padding-left:1em;color:#555;}\
table{border-collapse:collapse;}th,td{border:1px solid #ccc;padding:0.2em 0.5em;}";

/// A full HTML document plus the base URL used to resolve relative references.
///
/// An empty `base_url` means there is no base.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Page {
    pub html: String,
    pub base_url: String,
}

impl Page {
    /// Wrap a converter fragment into a standalone document.
    pub fn from_fragment(fragment: &str, base_url: &str) -> Self {
        Self {
            html: wrap(fragment, base_url),
            base_url: base_url.to_owned(),
        }
    }

    /// The page shown in place of the preview when conversion fails.
    pub fn conversion_failed(err: &ConversionError, base_url: &str) -> Self {
        let fragment = format!(
            "<h1>Preview unavailable</h1>\n<pre><code>{}</code></pre>\n",
            escape_html(&err.to_string())
        );
        Self::from_fragment(&fragment, base_url)
    }
}

/// Wrap an HTML fragment in `<html>`/`<head>`/`<body>`.
pub fn wrap(fragment: &str, base_url: &str) -> String {
    let mut out = String::with_capacity(fragment.len() + STYLE.len() + 160);
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    if !base_url.is_empty() {
        out.push_str("<base href=\"");
        out.push_str(&escape_html(base_url));
        out.push_str("\">\n");
    }
    out.push_str("<style>");
    out.push_str(STYLE);
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str(fragment);
    out.push_str("</body>\n</html>\n");
    out
}

/// `file://` URL of the directory holding `path`, with a trailing slash.
pub fn base_url_for(path: &Path) -> Option<String> {
    let absolute = std::path::absolute(path).ok()?;
    let dir = absolute.parent()?;
    Url::from_directory_path(dir).ok().map(String::from)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_produces_full_document() {
        let html = wrap("<p>x</p>\n", "");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<body>\n<p>x</p>\n</body>"));
        assert!(!html.contains("<base"));
    }

    #[test]
    fn wrap_includes_base_when_set() {
        let html = wrap("", "file:///tmp/notes/");
        assert!(html.contains("<base href=\"file:///tmp/notes/\">"));
    }

    #[test]
    fn conversion_failure_page_escapes_message() {
        let page = Page::conversion_failed(&ConversionError("<bad>".into()), "");
        assert!(page.html.contains("Preview unavailable"));
        assert!(page.html.contains("&lt;bad&gt;"));
        assert!(!page.html.contains("<bad>"));
    }

    #[cfg(unix)]
    #[test]
    fn base_url_is_parent_directory() {
        let url = base_url_for(Path::new("/tmp/notes/readme.md"));
        assert_eq!(url.as_deref(), Some("file:///tmp/notes/"));

        let url = base_url_for(Path::new("/tmp/my notes/readme.md"));
        assert_eq!(url.as_deref(), Some("file:///tmp/my%20notes/"));
    }
}
