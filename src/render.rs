//! Markdown to sanitized HTML
//!
//! Answers come back as Markdown. Raw HTML inside them is rendered as escaped
//! text and links or images pointing at script-capable URL schemes are
//! replaced with `#`, so the output can be inserted into the page verbatim.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Render an answer's Markdown into HTML safe to embed in the chat page.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let events = Parser::new_ext(markdown, options).filter_map(sanitize_event);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

fn sanitize_event(event: Event<'_>) -> Option<Event<'_>> {
    let event = match event {
        // Show raw HTML as text instead of interpreting it. The block wrapper
        // is dropped so tight list items stay tight.
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::HtmlBlock) | Event::End(TagEnd::HtmlBlock) => return None,
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    };
    Some(event)
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    if is_safe_url(&url) {
        url
    } else {
        tracing::debug!(url = %url, "Dropped unsafe link target");
        CowStr::Borrowed("#")
    }
}

/// Relative URLs and URLs with an allow-listed scheme pass.
fn is_safe_url(url: &str) -> bool {
    // Browsers ignore embedded whitespace and control characters in schemes
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();

    match normalized.split_once(':') {
        // A ':' after a path, query or fragment delimiter is not a scheme separator
        Some((scheme, _)) if !scheme.contains(['/', '?', '#']) => {
            SAFE_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str())
        }
        _ => true,
    }
}
