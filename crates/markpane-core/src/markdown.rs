use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};

use crate::ConversionError;

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options
}

/// Create a `pulldown-cmark` parser with our default options enabled.
pub fn parser(source: &str) -> Parser<'_> {
    Parser::new_ext(source, options())
}

/// Turns the whole text buffer into an HTML fragment.
///
/// Implementations must be pure: the same input always yields the same output.
pub trait Converter {
    fn convert(&self, source: &str) -> Result<String, ConversionError>;
}

/// The default converter, backed by `pulldown-cmark`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkdownConverter;

impl Converter for MarkdownConverter {
    fn convert(&self, source: &str) -> Result<String, ConversionError> {
        Ok(to_html(source))
    }
}

/// Render markdown to an HTML fragment (no `<html>`/`<body>` wrapper).
pub fn to_html(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + source.len() / 2);
    html::push_html(&mut out, parser(source));
    out
}

/// Plain-text rendering for the CLI's `text` output.
///
/// List items keep their `- ` / `1. ` / `[x] ` markers and table cells are
/// joined with ` | `.
pub fn plain_text(source: &str) -> String {
    let mut out = TextOut::new();
    // Next number for each open ordered list, `None` for bullet lists.
    let mut lists: Vec<Option<u64>> = Vec::new();

    for event in parser(source) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push(&text),
            Event::TaskListMarker(done) => out.push(if done { "[x] " } else { "[ ] " }),
            Event::SoftBreak | Event::HardBreak => out.end_line(),
            Event::Rule => {
                out.end_line();
                out.push("---");
                out.end_line();
            }
            Event::Start(Tag::List(first)) => {
                out.end_line();
                lists.push(first);
            }
            Event::Start(Tag::Item) => {
                out.end_line();
                out.push(&"  ".repeat(lists.len().saturating_sub(1)));
                match lists.last_mut() {
                    Some(Some(next)) => {
                        out.push(&format!("{next}. "));
                        *next = next.saturating_add(1);
                    }
                    _ => out.push("- "),
                }
            }
            Event::Start(Tag::TableCell) if !out.at_line_start => out.push(" | "),
            Event::End(TagEnd::List(_)) => {
                lists.pop();
                out.end_line();
            }
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::BlockQuote(_)
                | TagEnd::CodeBlock
                | TagEnd::Item
                | TagEnd::Table
                | TagEnd::TableHead
                | TagEnd::TableRow,
            ) => out.end_line(),
            _ => {}
        }
    }

    out.text
}

struct TextOut {
    text: String,
    at_line_start: bool,
}

impl TextOut {
    const fn new() -> Self {
        Self {
            text: String::new(),
            at_line_start: true,
        }
    }

    fn push(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.text.push_str(s);
        self.at_line_start = s.ends_with('\n');
    }

    fn end_line(&mut self) {
        if !self.at_line_start {
            self.text.push('\n');
            self.at_line_start = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_renders_h1() {
        assert_eq!(to_html("# Hi"), "<h1>Hi</h1>\n");
    }

    #[test]
    fn bold_renders_strong() {
        let html = to_html("**bold**");
        assert!(html.contains("<strong>bold</strong>"), "{html}");
    }

    #[test]
    fn empty_source_renders_nothing() {
        assert_eq!(MarkdownConverter.convert(""), Ok(String::new()));
    }

    #[test]
    fn common_blocks_render() {
        let md = "- a\n- b\n\n[x](https://example.com) *em*\n\n```rs\nlet x = 1;\n```\n";
        let html = to_html(md);
        assert!(html.contains("<ul>"));
        assert!(html.contains("<li>a</li>"));
        assert!(html.contains("<a href=\"https://example.com\">x</a>"));
        assert!(html.contains("<em>em</em>"));
        assert!(html.contains("<pre><code class=\"language-rs\">let x = 1;\n</code></pre>"));
    }

    #[test]
    fn extensions_are_enabled() {
        let html = to_html("~~gone~~\n\n| a |\n| - |\n| b |\n\n- [x] done\n");
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("type=\"checkbox\""));
    }

    #[test]
    fn plain_text_keeps_list_markers() {
        let md = "# Title\n\nHello **world**.\n\n- a\n- b\n";
        assert_eq!(plain_text(md), "Title\nHello world.\n- a\n- b\n");
    }

    #[test]
    fn plain_text_numbers_and_indents_lists() {
        let md = "1. one\n2. two\n   - inner\n\n- [x] done\n- [ ] todo\n";
        assert_eq!(
            plain_text(md),
            "1. one\n2. two\n  - inner\n- [x] done\n- [ ] todo\n"
        );
    }

    #[test]
    fn plain_text_joins_table_cells() {
        let md = "| a | b |\n| - | - |\n| `c` | d |\n";
        assert_eq!(plain_text(md), "a | b\nc | d\n");
    }

    #[test]
    fn plain_text_code_and_rule() {
        let md = "```rs\nlet x = 1;\n```\n\n***\n\nend\n";
        assert_eq!(plain_text(md), "let x = 1;\n---\nend\n");
    }
}
