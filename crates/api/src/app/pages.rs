//! Page handlers. Each one builds its complete response, status included.

use std::sync::Arc;

use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use tracing::{debug, error};

use remi_core::MovieId;

use crate::app::services::{MovieService, embed_url, youtube_video_id};
use crate::app::templates;
use crate::dispatch::RawRequest;

/// Fill `{{key}}` placeholders with HTML-escaped values.
///
/// The template is scanned once; substituted text is never re-scanned, and
/// placeholders with no matching key are left as they are.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };

        let key = &after[..end];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(&escape_html(value)),
            None => {
                out.push_str("{{");
                out.push_str(key);
                out.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

/// Static pages that only need the public API URL.
#[derive(Debug, Clone)]
pub struct StaticPages {
    home: Arc<str>,
    login: Arc<str>,
    register: Arc<str>,
    movie_create: Arc<str>,
}

impl StaticPages {
    pub fn new(public_url: &str) -> Self {
        let with_url = |tpl: String| -> Arc<str> { Arc::from(render(&tpl, &[("url", public_url)])) };
        Self {
            home: with_url(templates::home()),
            login: with_url(templates::login()),
            register: with_url(templates::register()),
            movie_create: with_url(templates::movie_create()),
        }
    }

    pub fn home(&self) -> Response {
        Html(self.home.to_string()).into_response()
    }

    pub fn login(&self) -> Response {
        Html(self.login.to_string()).into_response()
    }

    pub fn register(&self) -> Response {
        Html(self.register.to_string()).into_response()
    }

    pub fn movie_create(&self) -> Response {
        Html(self.movie_create.to_string()).into_response()
    }
}

pub fn stylesheet() -> Response {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        templates::STYLESHEET,
    )
        .into_response()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MovieQuery {
    id: Option<String>,
}

fn not_found_page() -> Response {
    (StatusCode::NOT_FOUND, Html(templates::not_found())).into_response()
}

/// `GET /movie?id=<id>`: the embedded player for one movie.
pub async fn movie_view(movies: Arc<MovieService>, raw: RawRequest) -> Response {
    let id = match raw.query::<MovieQuery>() {
        Ok(MovieQuery { id: Some(id) }) if !id.trim().is_empty() => id,
        _ => return not_found_page(),
    };
    let Ok(movie_id) = id.parse::<MovieId>() else {
        debug!(%id, "movie page for unparsable id");
        return not_found_page();
    };

    let (movie, sharer) = match movies.find_with_sharer(movie_id).await {
        Ok(Some(found)) => found,
        Ok(None) => return not_found_page(),
        Err(err) => {
            error!(error = %err, "movie page lookup failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let Some(video_id) = youtube_video_id(&movie.link) else {
        error!(movie_id = %movie.id, "stored link has no video id");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    let link = embed_url(&video_id);
    Html(render(
        &templates::movie_view(),
        &[
            ("link", link.as_str()),
            ("name", movie.name.as_str()),
            ("shared_by", sharer.name.as_str()),
            ("description", movie.description.as_str()),
        ],
    ))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_escapes_substituted_values() {
        let out = render("<p>{{name}}</p><i>{{name}}</i>", &[("name", "<b>\"Tom & Jerry\"</b>")]);
        assert_eq!(
            out,
            "<p>&lt;b&gt;&quot;Tom &amp; Jerry&quot;&lt;/b&gt;</p><i>&lt;b&gt;&quot;Tom &amp; Jerry&quot;&lt;/b&gt;</i>"
        );
    }

    #[test]
    fn render_does_not_expand_placeholders_inside_values() {
        let out = render(
            "<h1>{{name}}</h1><p>{{description}}</p>",
            &[("name", "{{description}}"), ("description", "SECRET")],
        );
        assert_eq!(out, "<h1>{{description}}</h1><p>SECRET</p>");
    }

    #[test]
    fn render_keeps_unknown_and_unterminated_placeholders() {
        assert_eq!(render("a {{other}} b", &[("name", "x")]), "a {{other}} b");
        assert_eq!(render("{{name}} {{open", &[("name", "x")]), "x {{open");
    }

    #[test]
    fn static_pages_embed_public_url() {
        let pages = StaticPages::new("http://remi.example");
        assert!(pages.login.contains(r#"const API = "http://remi.example";"#));
        assert!(!pages.home.contains("{{url}}"));
    }
}
