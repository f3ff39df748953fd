//! Conversions from the site's types into [`Value`]s for templating. Text that
//! came from content files or the photo service is HTML-escaped here, since
//! the templates print values verbatim. Article bodies are already HTML and
//! pass through untouched.

use std::collections::HashMap;

use gtmpl::Value;
use pulldown_cmark::escape::escape_html;

use crate::article::Article;
use crate::photos::{Photo, Size};
use crate::store::Year;
use crate::util::pluralize;

/// Builds a [`Value::Object`] from `fields`.
pub fn object(fields: Vec<(&str, Value)>) -> Value {
    Value::Object(
        fields
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect::<HashMap<String, Value>>(),
    )
}

pub fn string<S: Into<String>>(s: S) -> Value {
    Value::String(s.into())
}

/// An escaped string value.
pub fn text(s: &str) -> Value {
    let mut out = String::with_capacity(s.len());
    // writing into a String can't fail
    let _ = escape_html(&mut out, s);
    Value::String(out)
}

pub fn optional<T, F: FnOnce(T) -> Value>(opt: Option<T>, f: F) -> Value {
    match opt {
        Some(item) => f(item),
        None => Value::Nil,
    }
}

pub fn array<T, F: FnMut(T) -> Value>(items: impl IntoIterator<Item = T>, f: F) -> Value {
    Value::Array(items.into_iter().map(f).collect())
}

impl From<&Article> for Value {
    fn from(a: &Article) -> Value {
        object(vec![
            ("slug", string(&a.slug)),
            ("title", text(&a.title)),
            ("url", string(a.path())),
            ("images", string(a.image_path(""))),
            (
                "published",
                string(a.published.format("%-d %B %Y").to_string()),
            ),
            ("published_iso", string(a.published.to_rfc3339())),
            ("body", string(&a.body)),
            ("excerpt", text(&a.excerpt)),
        ])
    }
}

/// Converts a [`Year`] of the archive, with per-year and per-month counts
/// spelled out.
impl From<&Year<'_>> for Value {
    fn from(y: &Year<'_>) -> Value {
        object(vec![
            ("year", string(y.year.to_string())),
            ("count", string(pluralize(y.len(), "article"))),
            (
                "months",
                array(&y.months, |m| {
                    object(vec![
                        (
                            "name",
                            // every month in the archive has at least one article
                            string(m.articles[0].published.format("%B").to_string()),
                        ),
                        ("count", string(pluralize(m.articles.len(), "article"))),
                        ("articles", array(&m.articles, |&a| a.into())),
                    ])
                }),
            ),
        ])
    }
}

impl From<&Size> for Value {
    fn from(s: &Size) -> Value {
        object(vec![
            ("label", text(&s.label)),
            ("width", string(s.width.to_string())),
            ("height", string(s.height.to_string())),
            ("source", string(&s.source)),
        ])
    }
}

/// Converts a [`Photo`]. `owner` is the photo service account, for the link
/// back to the photo's page on the service.
pub fn photo(p: &Photo, owner: &str) -> Value {
    object(vec![
        ("id", string(&p.id)),
        ("title", text(&p.title)),
        ("url", string(p.path())),
        ("flickr_url", string(p.page_url(owner))),
        ("square", string(p.src(Some("s")))),
        ("thumbnail", string(p.src(Some("t")))),
        ("small", string(p.src(Some("m")))),
        ("medium", string(p.src(None))),
        ("large", string(p.src(Some("b")))),
    ])
}
