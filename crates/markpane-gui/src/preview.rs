#![forbid(unsafe_code)]

use std::{fs, io, path::PathBuf};

use eframe::egui;
use markpane_core::{Page, Renderer};
use scraper::{ElementRef, Html, Node, node::Element};
use url::Url;

/// The right-hand pane: shows the last page it was handed.
#[derive(Default)]
pub(crate) struct PreviewPane {
    page: Page,
    doc: PreviewDoc,
    view: PreviewView,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum PreviewView {
    #[default]
    Rendered,
    Source,
}

impl Renderer for PreviewPane {
    fn show_page(&mut self, page: Page) {
        self.doc = parse(&page.html, &page.base_url);
        self.page = page;
    }
}

impl PreviewPane {
    pub(crate) const fn page(&self) -> &Page {
        &self.page
    }

    /// Draw the pane. Returns `true` when the user asked for the browser.
    pub(crate) fn ui(&mut self, ui: &mut egui::Ui) -> bool {
        let mut open_browser = false;
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.view, PreviewView::Rendered, "Preview");
            ui.selectable_value(&mut self.view, PreviewView::Source, "HTML");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                open_browser = ui.button("Open in browser").clicked();
            });
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("preview")
            .auto_shrink([false; 2])
            .show(ui, |ui| match self.view {
                PreviewView::Rendered => show(ui, &self.doc),
                PreviewView::Source => {
                    let mut source = self.page.html.as_str();
                    ui.add(
                        egui::TextEdit::multiline(&mut source)
                            .code_editor()
                            .desired_width(f32::INFINITY),
                    );
                }
            });

        open_browser
    }

    /// Write the page to the cache directory and hand it to the system browser.
    pub(crate) fn open_in_browser(&self) -> io::Result<PathBuf> {
        let dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("markpane");
        fs::create_dir_all(&dir)?;
        let path = dir.join("preview.html");
        fs::write(&path, &self.page.html)?;
        webbrowser::open(&path.to_string_lossy())?;
        Ok(path)
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct PreviewDoc {
    blocks: Vec<Block>,
}

#[derive(Clone, Debug, PartialEq)]
enum Block {
    QuoteStart,
    QuoteEnd,
    Heading {
        level: u8,
        spans: Vec<Span>,
    },
    Paragraph {
        spans: Vec<Span>,
    },
    ListItem {
        depth: usize,
        marker: ListMarker,
        spans: Vec<Span>,
    },
    Code {
        language: Option<String>,
        code: String,
    },
    Table {
        rows: Vec<TableRow>,
    },
    Image {
        url: Option<String>,
        alt: String,
    },
    Rule,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ListMarker {
    Bullet,
    Number(u64),
    Task(bool),
}

#[derive(Clone, Debug, PartialEq)]
struct TableRow {
    header: bool,
    cells: Vec<Vec<Span>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct SpanStyle {
    emphasis: bool,
    strong: bool,
    code: bool,
    strikethrough: bool,
    link: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
struct Span {
    text: String,
    style: SpanStyle,
}

#[derive(Clone, Copy, Debug)]
enum BlockKind {
    Heading(u8),
    Paragraph,
    ListItem { depth: usize, marker: ListMarker },
}

/// Walks the page's element tree and collects display blocks.
#[derive(Default)]
struct Builder {
    base: Option<Url>,
    blocks: Vec<Block>,

    kind: Option<BlockKind>,
    spans: Vec<Span>,

    lists: Vec<Option<u64>>,
    emphasis_depth: usize,
    strong_depth: usize,
    code_depth: usize,
    strikethrough_depth: usize,
    link_stack: Vec<String>,

    in_pre: bool,
    code_language: Option<String>,
    code_text: String,

    in_table: bool,
    in_table_head: bool,
    in_table_cell: bool,
    table_rows: Vec<TableRow>,
    table_row_cells: Vec<Vec<Span>>,
    table_cell_spans: Vec<Span>,
}

/// Read a page back into blocks egui can lay out.
pub(crate) fn parse(page: &str, base_url: &str) -> PreviewDoc {
    let document = Html::parse_document(page);
    let mut builder = Builder {
        base: Url::parse(base_url).ok(),
        ..Builder::default()
    };
    builder.walk(document.root_element());
    builder.finish_block();
    PreviewDoc {
        blocks: builder.blocks,
    }
}

impl Builder {
    fn walk(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();
        if matches!(name, "head" | "style" | "script" | "title") {
            return;
        }

        self.start(name, element.value());
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.text(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.walk(child);
                    }
                }
                _ => {}
            }
        }
        self.end(name);
    }

    fn start(&mut self, name: &str, element: &Element) {
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                if !self.in_table {
                    self.finish_block();
                    self.kind = Some(BlockKind::Heading(heading_level(name)));
                }
            }
            "p" => {
                if !self.in_table && self.kind.is_none() {
                    self.kind = Some(BlockKind::Paragraph);
                    self.spans.clear();
                }
            }
            "ul" => {
                self.finish_block();
                self.lists.push(None);
            }
            "ol" => {
                self.finish_block();
                let start = element
                    .attr("start")
                    .and_then(|start| start.trim().parse().ok())
                    .unwrap_or(1);
                self.lists.push(Some(start));
            }
            "li" => {
                if !self.in_table {
                    self.finish_block();
                    let marker = match self.lists.last_mut() {
                        Some(Some(next)) => {
                            let marker = ListMarker::Number(*next);
                            *next = next.saturating_add(1);
                            marker
                        }
                        _ => ListMarker::Bullet,
                    };
                    self.kind = Some(BlockKind::ListItem {
                        depth: self.lists.len(),
                        marker,
                    });
                }
            }
            "input" => {
                if element
                    .attr("type")
                    .is_some_and(|t| t.eq_ignore_ascii_case("checkbox"))
                    && let Some(BlockKind::ListItem { marker, .. }) = &mut self.kind
                {
                    *marker = ListMarker::Task(element.attr("checked").is_some());
                }
            }
            "blockquote" => {
                self.finish_block();
                self.blocks.push(Block::QuoteStart);
            }
            "pre" => {
                self.finish_block();
                self.in_pre = true;
                self.code_language = None;
                self.code_text.clear();
            }
            "code" => {
                if self.in_pre {
                    self.code_language = element.attr("class").and_then(|class| {
                        class
                            .split_ascii_whitespace()
                            .find_map(|c| c.strip_prefix("language-"))
                            .map(str::to_owned)
                    });
                } else {
                    self.code_depth += 1;
                }
            }
            "em" | "i" => self.emphasis_depth += 1,
            "strong" | "b" => self.strong_depth += 1,
            "del" | "s" | "strike" => self.strikethrough_depth += 1,
            "a" => {
                let href = element.attr("href").unwrap_or_default();
                let target =
                    resolve_url(href, self.base.as_ref()).unwrap_or_else(|| href.to_owned());
                self.link_stack.push(target);
            }
            "br" => self.push_text("\n"),
            "hr" => {
                self.finish_block();
                self.blocks.push(Block::Rule);
            }
            "img" => {
                let alt = element.attr("alt").unwrap_or_default().to_owned();
                let url = element
                    .attr("src")
                    .and_then(|src| resolve_url(src, self.base.as_ref()));
                self.flush_spans();
                self.blocks.push(Block::Image { url, alt });
            }
            "table" => {
                self.finish_block();
                self.in_table = true;
                self.table_rows.clear();
            }
            "thead" => self.in_table_head = true,
            "tr" => {
                if self.in_table {
                    self.table_row_cells.clear();
                }
            }
            "th" | "td" => {
                if self.in_table {
                    self.in_table_cell = true;
                    self.table_cell_spans.clear();
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, name: &str) {
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                if matches!(self.kind, Some(BlockKind::Heading(_))) {
                    self.finish_block();
                }
            }
            "p" => {
                if matches!(self.kind, Some(BlockKind::Paragraph)) {
                    self.finish_block();
                }
            }
            "li" => {
                if matches!(self.kind, Some(BlockKind::ListItem { .. })) {
                    self.finish_block();
                }
            }
            "ul" | "ol" => {
                self.finish_block();
                let _ = self.lists.pop();
            }
            "blockquote" => {
                self.finish_block();
                self.blocks.push(Block::QuoteEnd);
            }
            "pre" => {
                if self.in_pre {
                    self.in_pre = false;
                    self.blocks.push(Block::Code {
                        language: self.code_language.take(),
                        code: std::mem::take(&mut self.code_text),
                    });
                }
            }
            "code" => {
                if !self.in_pre {
                    self.code_depth = self.code_depth.saturating_sub(1);
                }
            }
            "em" | "i" => self.emphasis_depth = self.emphasis_depth.saturating_sub(1),
            "strong" | "b" => self.strong_depth = self.strong_depth.saturating_sub(1),
            "del" | "s" | "strike" => {
                self.strikethrough_depth = self.strikethrough_depth.saturating_sub(1);
            }
            "a" => {
                let _ = self.link_stack.pop();
            }
            "thead" => self.in_table_head = false,
            "th" | "td" => {
                if self.in_table && self.in_table_cell {
                    self.in_table_cell = false;
                    let mut cell = std::mem::take(&mut self.table_cell_spans);
                    trim_spans(&mut cell);
                    self.table_row_cells.push(cell);
                }
            }
            "tr" => {
                if self.in_table {
                    self.table_rows.push(TableRow {
                        header: self.in_table_head,
                        cells: std::mem::take(&mut self.table_row_cells),
                    });
                }
            }
            "table" => {
                if self.in_table {
                    self.in_table = false;
                    self.blocks.push(Block::Table {
                        rows: std::mem::take(&mut self.table_rows),
                    });
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_pre {
            self.code_text.push_str(text);
            return;
        }

        let collapsed = collapse_whitespace(text);
        if collapsed.trim().is_empty() && self.kind.is_none() && !self.in_table_cell {
            return;
        }
        if self.in_table && !self.in_table_cell {
            return;
        }
        self.push_text(&collapsed);
    }

    fn push_text(&mut self, text: &str) {
        let style = self.style();
        let spans = if self.in_table_cell {
            &mut self.table_cell_spans
        } else {
            if self.kind.is_none() {
                self.kind = Some(BlockKind::Paragraph);
            }
            &mut self.spans
        };
        let at_break = spans
            .last()
            .is_none_or(|span| span.text.ends_with([' ', '\n']));
        let text = if at_break {
            text.trim_start_matches(' ')
        } else {
            text
        };
        push_span(spans, text, style);
    }

    fn style(&self) -> SpanStyle {
        SpanStyle {
            emphasis: self.emphasis_depth > 0,
            strong: self.strong_depth > 0,
            code: self.code_depth > 0,
            strikethrough: self.strikethrough_depth > 0,
            link: self.link_stack.last().cloned(),
        }
    }

    /// Emit the spans gathered so far without closing the current block.
    fn flush_spans(&mut self) {
        let Some(kind) = self.kind else {
            return;
        };
        let mut spans = std::mem::take(&mut self.spans);
        trim_spans(&mut spans);
        if spans.is_empty() {
            return;
        }
        self.blocks.push(match kind {
            BlockKind::Heading(level) => Block::Heading { level, spans },
            BlockKind::Paragraph => Block::Paragraph { spans },
            BlockKind::ListItem { depth, marker } => Block::ListItem {
                depth,
                marker,
                spans,
            },
        });
    }

    fn finish_block(&mut self) {
        if let Some(BlockKind::ListItem { depth, marker }) = self.kind
            && self.spans.is_empty()
            && matches!(marker, ListMarker::Task(_))
        {
            self.blocks.push(Block::ListItem {
                depth,
                marker,
                spans: Vec::new(),
            });
        } else {
            self.flush_spans();
        }
        self.kind = None;
        self.spans.clear();
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

fn trim_spans(spans: &mut Vec<Span>) {
    while let Some(last) = spans.last_mut() {
        let trimmed = last.text.trim_end_matches([' ', '\n']).len();
        last.text.truncate(trimmed);
        if last.text.is_empty() {
            spans.pop();
        } else {
            break;
        }
    }
}

fn push_span(spans: &mut Vec<Span>, text: &str, style: SpanStyle) {
    if text.is_empty() {
        return;
    }

    match spans.last_mut() {
        Some(last) if last.style == style => last.text.push_str(text),
        _ => spans.push(Span {
            text: text.to_owned(),
            style,
        }),
    }
}

/// Resolve `src` against `base`. Relative references without a base are dropped.
fn resolve_url(src: &str, base: Option<&Url>) -> Option<String> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }
    let url = match base {
        Some(base) => base.join(src),
        None => Url::parse(src),
    };
    url.ok().map(String::from)
}

fn heading_level(tag: &str) -> u8 {
    tag.as_bytes()
        .get(1)
        .map_or(1, |digit| digit.saturating_sub(b'0').clamp(1, 6))
}

pub(crate) fn show(ui: &mut egui::Ui, doc: &PreviewDoc) {
    let mut quote_depth: usize = 0;

    for (block_idx, block) in doc.blocks.iter().enumerate() {
        match block {
            Block::QuoteStart => {
                quote_depth = quote_depth.saturating_add(1);
            }
            Block::QuoteEnd => {
                quote_depth = quote_depth.saturating_sub(1);
            }
            _ => with_quote(ui, quote_depth, |ui| match block {
                Block::Heading { level, spans } => {
                    let font = heading_font(ui, *level);
                    add_spans(ui, spans, font, false);
                    ui.add_space(4.0);
                }
                Block::Paragraph { spans } => {
                    let font = body_font(ui);
                    add_spans(ui, spans, font, false);
                    ui.add_space(6.0);
                }
                Block::ListItem {
                    depth,
                    marker,
                    spans,
                } => {
                    let font = body_font(ui);
                    ui.horizontal_wrapped(|ui| {
                        ui.add_space(depth.saturating_sub(1) as f32 * 12.0);
                        match marker {
                            ListMarker::Task(checked) => {
                                let mut checked = *checked;
                                ui.add_enabled(false, egui::Checkbox::new(&mut checked, ""));
                            }
                            ListMarker::Number(n) => {
                                ui.label(format!("{n}."));
                            }
                            ListMarker::Bullet => {
                                ui.label("•");
                            }
                        }
                        add_spans(ui, spans, font, false);
                    });
                    ui.add_space(4.0);
                }
                Block::Code { language, code } => {
                    if let Some(lang) = language.as_deref() {
                        ui.label(egui::RichText::new(lang).weak());
                    }

                    let frame = egui::Frame::group(ui.style())
                        .fill(ui.visuals().faint_bg_color)
                        .inner_margin(egui::Margin::same(8));

                    frame.show(ui, |ui| {
                        ui.add(
                            egui::Label::new(egui::RichText::new(code.trim_end()).monospace())
                                .wrap()
                                .selectable(true),
                        );
                    });
                    ui.add_space(6.0);
                }
                Block::Table { rows } => {
                    let font = body_font(ui);
                    let cols = rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
                    let grid_id = ui.id().with(("table", block_idx));

                    egui::Grid::new(grid_id).striped(true).show(ui, |ui| {
                        for row in rows {
                            for cell in &row.cells {
                                add_spans(ui, cell, font.clone(), row.header);
                            }
                            for _ in row.cells.len()..cols {
                                ui.label("");
                            }
                            ui.end_row();
                        }
                    });
                    ui.add_space(6.0);
                }
                Block::Image { url, alt } => {
                    match url {
                        Some(url) => {
                            let image =
                                egui::Image::new(url.as_str()).max_width(ui.available_width());
                            ui.add(image).on_hover_text(alt.as_str());
                        }
                        None => {
                            ui.label(egui::RichText::new(format!("[image: {alt}]")).weak());
                        }
                    }
                    ui.add_space(6.0);
                }
                Block::Rule => {
                    ui.separator();
                    ui.add_space(6.0);
                }
                Block::QuoteStart | Block::QuoteEnd => {}
            }),
        }
    }
}

fn with_quote(ui: &mut egui::Ui, depth: usize, add_contents: impl FnOnce(&mut egui::Ui)) {
    if depth == 0 {
        add_contents(ui);
        return;
    }

    ui.horizontal(|ui| {
        ui.add_space((depth - 1) as f32 * 12.0);
        ui.colored_label(ui.visuals().weak_text_color(), "|");
        ui.add_space(4.0);
        ui.vertical(add_contents);
    });
}

fn body_font(ui: &egui::Ui) -> egui::FontId {
    ui.style()
        .text_styles
        .get(&egui::TextStyle::Body)
        .cloned()
        .unwrap_or_else(|| egui::FontId::proportional(16.0))
}

fn heading_font(ui: &egui::Ui, level: u8) -> egui::FontId {
    let base = ui
        .style()
        .text_styles
        .get(&egui::TextStyle::Heading)
        .cloned()
        .unwrap_or_else(|| egui::FontId::proportional(22.0));

    let scale = match level {
        1 => 1.20,
        2 => 1.10,
        3 => 1.05,
        _ => 1.0,
    };

    egui::FontId {
        size: base.size * scale,
        family: base.family,
    }
}

/// Lay out a run of spans. Linked spans become hyperlinks that open on click.
fn add_spans(ui: &mut egui::Ui, spans: &[Span], font: egui::FontId, header: bool) {
    let job = |ui: &egui::Ui, spans: &[Span]| {
        let mut job = spans_layout_job(ui, spans, font.clone());
        if header {
            for section in &mut job.sections {
                section.format.color = ui.visuals().strong_text_color();
            }
        }
        job
    };

    if spans.iter().all(|span| span.style.link.is_none()) {
        ui.add(egui::Label::new(job(ui, spans)).wrap());
        return;
    }

    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        for span in spans {
            let text = job(ui, std::slice::from_ref(span));
            match &span.style.link {
                Some(url) => {
                    ui.hyperlink_to(text, url).on_hover_text(url.as_str());
                }
                None => {
                    ui.add(egui::Label::new(text).wrap());
                }
            }
        }
    });
}

fn spans_layout_job(
    ui: &egui::Ui,
    spans: &[Span],
    base_font: egui::FontId,
) -> egui::text::LayoutJob {
    let mut job = egui::text::LayoutJob::default();

    for span in spans {
        let mut format = egui::text::TextFormat {
            font_id: if span.style.code {
                egui::FontId::monospace(base_font.size)
            } else {
                base_font.clone()
            },
            color: ui.visuals().text_color(),
            ..Default::default()
        };

        if span.style.strong {
            format.color = ui.visuals().strong_text_color();
        }

        if span.style.emphasis {
            format.italics = true;
        }

        if span.style.code {
            format.background = ui.visuals().code_bg_color;
        }

        if span.style.strikethrough {
            format.strikethrough = egui::Stroke::new(1.0, format.color);
        }

        if span.style.link.is_some() {
            format.underline = egui::Stroke::new(1.0, ui.visuals().hyperlink_color);
            format.color = ui.visuals().hyperlink_color;
        }

        job.append(&span.text, 0.0, format);
    }

    job
}

#[cfg(test)]
mod tests {
    use markpane_core::{Converter, MarkdownConverter};

    use super::*;

    fn preview(md: &str) -> PreviewDoc {
        let fragment = MarkdownConverter.convert(md).unwrap_or_default();
        parse(&Page::from_fragment(&fragment, "").html, "")
    }

    fn text_of(spans: &[Span]) -> String {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn parses_common_blocks() {
        let md = "# Title\n\nHello *world* ~~gone~~.\n\n> quoted\n\n- [ ] a\n- [x] b\n\n| a | b |\n| - | - |\n| c | d |\n\n```rs\nlet x = 1;\n```\n";
        let doc = preview(md);

        assert!(matches!(doc.blocks[0], Block::Heading { level: 1, .. }));
        assert!(matches!(doc.blocks[1], Block::Paragraph { .. }));
        assert!(matches!(doc.blocks[2], Block::QuoteStart));
        assert!(matches!(doc.blocks[3], Block::Paragraph { .. }));
        assert!(matches!(doc.blocks[4], Block::QuoteEnd));
        let Block::ListItem { marker, spans, .. } = &doc.blocks[5] else {
            panic!("expected list item");
        };
        assert_eq!(*marker, ListMarker::Task(false));
        assert_eq!(text_of(spans), "a");

        let Block::ListItem { marker, .. } = &doc.blocks[6] else {
            panic!("expected list item");
        };
        assert_eq!(*marker, ListMarker::Task(true));
        let Block::Table { rows } = &doc.blocks[7] else {
            panic!("expected table");
        };
        assert_eq!(rows.len(), 2);
        assert!(rows[0].header);
        assert!(!rows[1].header);
        assert_eq!(rows[1].cells.len(), 2);
        let Block::Code { language, code } = &doc.blocks[8] else {
            panic!("expected code block");
        };
        assert_eq!(language.as_deref(), Some("rs"));
        assert_eq!(code, "let x = 1;\n");
        assert_eq!(doc.blocks.len(), 9);

        let Block::Paragraph { spans } = &doc.blocks[1] else {
            panic!("expected paragraph");
        };
        assert_eq!(text_of(spans), "Hello world gone.");
        assert!(spans.iter().any(|s| s.style.strikethrough));
        assert!(spans.iter().any(|s| s.style.emphasis && s.text == "world"));
    }

    #[test]
    fn empty_page_has_no_blocks() {
        assert!(preview("").blocks.is_empty());
    }

    #[test]
    fn style_and_head_are_not_shown() {
        let doc = preview("plain");
        assert_eq!(doc.blocks.len(), 1);
        let Block::Paragraph { spans } = &doc.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(text_of(spans), "plain");
    }

    #[test]
    fn inline_styles_and_entities() {
        let doc = preview("**bold** `a<b` [link](https://example.com) & more");
        let Block::Paragraph { spans } = &doc.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(text_of(spans), "bold a<b link & more");
        assert!(spans.iter().any(|s| s.style.strong && s.text == "bold"));
        assert!(spans.iter().any(|s| s.style.code && s.text == "a<b"));
        assert!(
            spans
                .iter()
                .any(|s| s.style.link.as_deref() == Some("https://example.com/"))
        );
    }

    #[test]
    fn entities_before_multibyte_text_are_decoded() {
        let doc = preview("&日本語 &amp;ü &lt;äö> 5 &copy; é");
        let Block::Paragraph { spans } = &doc.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(text_of(spans), "&日本語 &ü <äö> 5 © é");
    }

    #[test]
    fn links_resolve_against_base() {
        let fragment = MarkdownConverter
            .convert("see [next](next.md) and [top](#top)")
            .unwrap_or_default();
        let doc = parse(&fragment, "file:///home/me/notes/");
        let Block::Paragraph { spans } = &doc.blocks[0] else {
            panic!("expected paragraph");
        };
        let links: Vec<_> = spans.iter().filter_map(|s| s.style.link.as_deref()).collect();
        assert_eq!(
            links,
            ["file:///home/me/notes/next.md", "file:///home/me/notes/#top"]
        );

        let doc = parse(&fragment, "");
        let Block::Paragraph { spans } = &doc.blocks[0] else {
            panic!("expected paragraph");
        };
        let links: Vec<_> = spans.iter().filter_map(|s| s.style.link.as_deref()).collect();
        assert_eq!(links, ["next.md", "#top"]);
    }

    #[test]
    fn linked_blocks_lay_out() {
        let doc = preview("[a](https://a.org) text\n\n| [b](https://b.org) |\n| - |\n| c |\n");
        let ctx = egui::Context::default();
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| show(ui, &doc));
        });
        assert!(!output.shapes.is_empty());
    }

    #[test]
    fn ordered_and_nested_lists() {
        let doc = preview("3. three\n4. four\n   - inner\n");
        let markers: Vec<_> = doc
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::ListItem {
                    depth,
                    marker,
                    spans,
                } => Some((*depth, *marker, text_of(spans))),
                _ => None,
            })
            .collect();
        assert_eq!(
            markers,
            [
                (1, ListMarker::Number(3), "three".to_owned()),
                (1, ListMarker::Number(4), "four".to_owned()),
                (2, ListMarker::Bullet, "inner".to_owned()),
            ]
        );
    }

    #[test]
    fn hard_break_and_rule() {
        let doc = preview("a  \nb\n\n---\n");
        let Block::Paragraph { spans } = &doc.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(text_of(spans), "a\nb");
        assert!(matches!(doc.blocks[1], Block::Rule));
    }

    #[test]
    fn images_resolve_against_base() {
        let doc = parse(
            "<p><img src=\"img/cat.png\" alt=\"cat\" /></p>",
            "file:///home/me/notes/",
        );
        assert_eq!(
            doc.blocks,
            [Block::Image {
                url: Some("file:///home/me/notes/img/cat.png".to_owned()),
                alt: "cat".to_owned(),
            }]
        );

        let doc = parse("<img src=\"cat.png\" alt=\"cat\">", "");
        assert!(matches!(&doc.blocks[0], Block::Image { url: None, .. }));
    }

    #[test]
    fn resolve_url_cases() {
        let page = Url::parse("https://x.org/docs/page.html").ok();
        assert_eq!(
            resolve_url("https://x.org/a.png", None).as_deref(),
            Some("https://x.org/a.png")
        );
        assert_eq!(
            resolve_url("/a.png", page.as_ref()).as_deref(),
            Some("https://x.org/a.png")
        );
        assert_eq!(
            resolve_url("a.png", page.as_ref()).as_deref(),
            Some("https://x.org/docs/a.png")
        );
        assert_eq!(
            resolve_url("../img/a b.png", page.as_ref()).as_deref(),
            Some("https://x.org/img/a%20b.png")
        );
        assert_eq!(resolve_url("a.png", None), None);
        assert_eq!(resolve_url("  ", page.as_ref()), None);
    }

    #[test]
    fn renderer_replaces_page() {
        let mut pane = PreviewPane::default();
        pane.show_page(Page::from_fragment("<h1>One</h1>\n", ""));
        pane.show_page(Page::from_fragment("<p>Two</p>\n", ""));
        assert!(pane.page().html.contains("Two"));
        assert!(!pane.page().html.contains("One"));
        assert_eq!(pane.doc.blocks.len(), 1);
        assert!(matches!(pane.doc.blocks[0], Block::Paragraph { .. }));
    }
}
