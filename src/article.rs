//! Defines the [`Article`] type, a single published piece of content. Articles
//! are produced by [`crate::parser::Parser`] and held by
//! [`crate::store::ArticleStore`]; nothing mutates them after loading.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};

/// The template used to render an article page when the front matter doesn't
/// name one.
pub const DEFAULT_TEMPLATE: &str = "article";

/// A single article loaded from a content file.
#[derive(Clone, Debug, PartialEq)]
pub struct Article {
    /// The unique, URL-safe identifier of the article (e.g., `hello-world`).
    pub slug: String,

    /// The title of the article.
    pub title: String,

    /// The publish timestamp. Articles are ordered by this field, most recent
    /// first.
    pub published: DateTime<FixedOffset>,

    /// The name of the page template the article is rendered with.
    pub template: String,

    /// The article body rendered to HTML, with links as written.
    pub body: String,

    /// The article body rendered to HTML with root-relative links and images
    /// rewritten to absolute URLs, for use outside the site (the Atom feed).
    pub feed_body: String,

    /// The plain text of the first paragraph.
    pub excerpt: String,

    /// The content file the article was loaded from.
    pub source_path: PathBuf,
}

impl Article {
    /// The site-relative path of the article page.
    pub fn path(&self) -> String {
        format!("/articles/{}", self.slug)
    }

    /// The site-relative path of an image belonging to this article.
    pub fn image_path(&self, image: &str) -> String {
        format!("/images/articles/{}/{}", self.slug, image)
    }
}
