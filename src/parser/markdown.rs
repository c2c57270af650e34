use crate::parser::{MarkupBackend, Rendered};
use pulldown_cmark::{Event, Options as CmarkOptions, Parser, Tag, TagEnd, html};
use std::collections::HashSet;

/// CommonMark backend with docutils-style document structure.
///
/// A lone leading heading becomes the document title (and a lone heading
/// right after it the subtitle); every other heading opens a nested
/// `<div class="section">`.
pub struct MarkdownBackend {
    options: CmarkOptions,
}

impl Default for MarkdownBackend {
    fn default() -> Self {
        let mut options = CmarkOptions::empty();
        options.insert(CmarkOptions::ENABLE_STRIKETHROUGH);
        options.insert(CmarkOptions::ENABLE_TABLES);
        Self { options }
    }
}

impl MarkupBackend for MarkdownBackend {
    fn render(&self, content: &str) -> Rendered {
        let parser = Parser::new_ext(content, self.options);
        let blocks = split_blocks(parser);

        let has_title = is_promotable(&blocks, 0);
        let has_subtitle = has_title && is_promotable(&blocks, 1);

        let mut ids = IdRegistry::default();
        let mut blocks = blocks.into_iter();

        let mut title = None;
        let mut html_title = String::new();
        if has_title {
            if let Some(Block::Heading { inner, .. }) = blocks.next() {
                let text = escape_html(&plain_text(&inner));
                html_title = format!("<h1 class=\"title\">{}</h1>\n", inline_html(inner));
                title = Some(text);
            }
        }

        let mut subtitle = None;
        let mut html_subtitle = String::new();
        if has_subtitle {
            if let Some(Block::Heading { inner, .. }) = blocks.next() {
                let raw = plain_text(&inner);
                let id = ids.claim(&raw);
                html_subtitle = format!(
                    "<h2 class=\"subtitle\" id=\"{}\">{}</h2>\n",
                    id,
                    inline_html(inner)
                );
                subtitle = Some(escape_html(&raw));
            }
        }

        let body = render_sections(blocks, &mut ids);
        let html_body = format!(
            "<div class=\"document\">\n{}{}{}</div>\n",
            html_title, html_subtitle, body
        );

        Rendered {
            html_title: title.as_ref().map(|_| html_title),
            html_subtitle: subtitle.as_ref().map(|_| html_subtitle),
            title,
            subtitle,
            body: Some(body),
            html_body: Some(html_body),
        }
    }
}

enum Block<'a> {
    Heading { level: usize, inner: Vec<Event<'a>> },
    Other(Vec<Event<'a>>),
}

// groups the event stream into top-level blocks, pulling headings out
fn split_blocks<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Block<'a>> {
    let mut blocks = Vec::new();
    let mut current: Vec<Event<'a>> = Vec::new();
    let mut depth = 0usize;
    let mut heading_level: Option<usize> = None;

    for event in events {
        match event {
            Event::Start(Tag::Heading { level, .. }) if depth == 0 => {
                heading_level = Some(level as usize);
                depth += 1;
            }
            Event::End(TagEnd::Heading(_)) if depth == 1 && heading_level.is_some() => {
                depth -= 1;
                if let Some(level) = heading_level.take() {
                    blocks.push(Block::Heading {
                        level,
                        inner: std::mem::take(&mut current),
                    });
                }
            }
            Event::Start(_) => {
                depth += 1;
                current.push(event);
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                current.push(event);
                if depth == 0 {
                    blocks.push(Block::Other(std::mem::take(&mut current)));
                }
            }
            _ => {
                current.push(event);
                if depth == 0 {
                    blocks.push(Block::Other(std::mem::take(&mut current)));
                }
            }
        }
    }

    if !current.is_empty() {
        blocks.push(Block::Other(current));
    }

    blocks
}

// a heading can be promoted when nothing after it ranks the same or higher
fn is_promotable(blocks: &[Block<'_>], idx: usize) -> bool {
    let Some(Block::Heading { level, .. }) = blocks.get(idx) else {
        return false;
    };

    blocks[idx + 1..].iter().all(|block| match block {
        Block::Heading { level: other, .. } => other > level,
        Block::Other(_) => true,
    })
}

fn render_sections<'a>(blocks: impl Iterator<Item = Block<'a>>, ids: &mut IdRegistry) -> String {
    let mut out = String::new();
    let mut open_levels: Vec<usize> = Vec::new();

    for block in blocks {
        match block {
            Block::Heading { level, inner } => {
                while open_levels.last().is_some_and(|open| *open >= level) {
                    open_levels.pop();
                    out.push_str("</div>\n");
                }
                open_levels.push(level);

                let depth = open_levels.len().min(6);
                let id = ids.claim(&plain_text(&inner));
                out.push_str(&format!(
                    "<div class=\"section\" id=\"{}\">\n<h{}>{}</h{}>\n",
                    id,
                    depth,
                    inline_html(inner),
                    depth
                ));
            }
            Block::Other(events) => html::push_html(&mut out, events.into_iter()),
        }
    }

    for _ in open_levels {
        out.push_str("</div>\n");
    }

    out
}

fn inline_html(events: Vec<Event<'_>>) -> String {
    let mut out = String::new();
    html::push_html(&mut out, events.into_iter());
    out
}

fn plain_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Lower-cased, hyphen separated identifier for a heading.
pub fn make_id(text: &str) -> String {
    let mut id = String::new();
    let mut pending_dash = false;
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_dash && !id.is_empty() {
                id.push('-');
            }
            pending_dash = false;
            id.push(c);
        } else {
            pending_dash = true;
        }
    }
    id
}

#[derive(Default)]
struct IdRegistry {
    used: HashSet<String>,
}

impl IdRegistry {
    fn claim(&mut self, text: &str) -> String {
        let base = match make_id(text) {
            id if id.is_empty() => "section".to_string(),
            id => id,
        };

        let mut candidate = base.clone();
        let mut n = 1;
        while self.used.contains(&candidate) {
            candidate = format!("{}-{}", base, n);
            n += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}
