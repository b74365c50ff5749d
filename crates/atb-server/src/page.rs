//! Server-rendered index page.

use atb_events::{TagKind, TagSnapshot};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::fmt::Write;
use std::sync::Arc;

use crate::AppState;

/// Handler for `GET /`.
///
/// Returns a plain-text 500 when no event store is attached.
pub async fn index_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    match state.store() {
        Some(store) => Html(render_index(&store.tags(), &store.format_version())).into_response(),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "event store is not initialized",
        )
            .into_response(),
    }
}

/// Renders the tag listing page.
pub fn render_index(tags: &TagSnapshot, format_version: &str) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>AudioTensorBoard</title>\n</head>\n<body>\n",
    );
    let _ = writeln!(html, "<header><h1>AudioTensorBoard</h1>");
    let _ = writeln!(
        html,
        "<p class=\"file-version\">File version: <code>{}</code></p></header>",
        html_escape(format_version)
    );

    html.push_str("<main>\n");
    for (kind, title) in [
        (TagKind::Scalars, "Scalars"),
        (TagKind::Images, "Images"),
        (TagKind::Audio, "Audio"),
    ] {
        render_section(&mut html, kind, title, tags);
    }
    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn render_section(html: &mut String, kind: TagKind, title: &str, tags: &TagSnapshot) {
    let names = tags.of(kind);
    let _ = writeln!(
        html,
        "<section id=\"{kind}\">\n<h2>{title} <span class=\"count\">({})</span></h2>",
        names.len()
    );
    if names.is_empty() {
        let _ = writeln!(html, "<p class=\"empty\">No {kind} tags.</p>");
    } else {
        html.push_str("<ul>\n");
        for tag in names {
            let _ = writeln!(
                html,
                "<li><a data-kind=\"{kind}\" data-tag=\"{escaped}\" href=\"/api/{kind}/{href}\">{escaped}</a></li>",
                escaped = html_escape(tag),
                href = html_escape(&encode_tag_path(tag)),
            );
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</section>\n");
}

/// Percent-encodes each `/`-separated segment of a tag.
fn encode_tag_path(tag: &str) -> String {
    tag.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> TagSnapshot {
        let mut tags = TagSnapshot::default();
        tags.scalars.insert("train/loss".to_string());
        tags.scalars.insert("accuracy".to_string());
        tags.audio.insert("samples/<generated>".to_string());
        tags
    }

    #[test]
    fn lists_tags_sorted_within_each_section() {
        let html = render_index(&snapshot(), "brain.Event:2");

        let accuracy = html.find(">accuracy<").unwrap();
        let loss = html.find(">train/loss<").unwrap();
        assert!(accuracy < loss);
        assert!(html.contains("href=\"/api/scalars/train/loss\""));
        assert!(html.contains("<code>brain.Event:2</code>"));
        assert!(html.contains("No images tags."));
    }

    #[test]
    fn escapes_tag_names() {
        let html = render_index(&snapshot(), "v<1>");

        assert!(html.contains(">samples/&lt;generated&gt;<"));
        assert!(html.contains("href=\"/api/audio/samples/%3Cgenerated%3E\""));
        assert!(html.contains("<code>v&lt;1&gt;</code>"));
        assert!(!html.contains("<generated>"));
    }

    #[test]
    fn encodes_spaces_but_keeps_separators() {
        assert_eq!(encode_tag_path("eval set/top 1"), "eval%20set/top%201");
    }
}
