use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};

/// Renders section text as HTML. Raw HTML in the source is shown as text and
/// links or images with a scripting scheme point nowhere.
pub fn render(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(source, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link { link_type, dest_url, title, id }) => {
            Event::Start(Tag::Link { link_type, dest_url: checked(dest_url), title, id })
        },
        Event::Start(Tag::Image { link_type, dest_url, title, id }) => {
            Event::Start(Tag::Image { link_type, dest_url: checked(dest_url), title, id })
        },
        other => other,
    });

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn checked(dest: CowStr<'_>) -> CowStr<'_> {
    if is_allowed_destination(&dest) { dest } else { CowStr::Borrowed("#") }
}

/// Relative references and http, https or mailto URLs. Browsers ignore
/// whitespace and control characters inside a scheme, so those are dropped
/// before looking at it.
fn is_allowed_destination(dest: &str) -> bool {
    let normalized: String = dest
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    let scheme_end = normalized.find(':');
    let path_start = normalized.find(['/', '?', '#']);
    match (scheme_end, path_start) {
        (Some(colon), Some(path)) if path < colon => true,
        (Some(colon), _) => matches!(&normalized[..colon], "http" | "https" | "mailto"),
        (None, _) => true,
    }
}
