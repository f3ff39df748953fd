//! Support for creating the Atom feed from the list of articles.

use atom_syndication::{
    ContentBuilder, Entry, EntryBuilder, Feed, FeedBuilder, Link, LinkBuilder, Person,
    PersonBuilder, Text,
};
use chrono::{DateTime, FixedOffset, Utc};
use url::Url;

use crate::article::Article;
use crate::config::Author;

/// Bundled configuration for creating a feed.
pub struct FeedConfig<'a> {
    pub title: &'a str,
    pub author: &'a Author,

    /// The site's home page. It doubles as the feed's id.
    pub site_url: &'a Url,

    /// Where the feed itself is served.
    pub feed_url: &'a Url,
}

/// Creates a feed from some configuration ([`FeedConfig`]) and a list of
/// [`Article`]s, most recent first, and renders it as XML.
pub fn render_feed(config: &FeedConfig, articles: &[Article]) -> Result<String, url::ParseError> {
    Ok(feed(config, articles)?.to_string())
}

fn feed(config: &FeedConfig, articles: &[Article]) -> Result<Feed, url::ParseError> {
    // the feed changes whenever the newest article does
    let updated: DateTime<FixedOffset> = match articles.first() {
        Some(article) => article.published,
        None => Utc::now().into(),
    };

    Ok(FeedBuilder::default()
        .title(config.title)
        .id(config.site_url.as_str())
        .updated(updated)
        .authors(author_to_people(config.author))
        .links(vec![
            link(config.site_url.as_str(), "alternate"),
            link(config.feed_url.as_str(), "self"),
        ])
        .entries(feed_entries(config, articles)?)
        .build())
}

fn feed_entries(config: &FeedConfig, articles: &[Article]) -> Result<Vec<Entry>, url::ParseError> {
    let mut entries: Vec<Entry> = Vec::with_capacity(articles.len());
    for article in articles {
        let url = config.site_url.join(&article.path())?;
        entries.push(
            EntryBuilder::default()
                .id(url.as_str())
                .title(article.title.as_str())
                .updated(article.published)
                .published(Some(article.published))
                .authors(author_to_people(config.author))
                .links(vec![link(url.as_str(), "alternate")])
                .summary(Some(Text::plain(article.excerpt.as_str())))
                .content(Some(
                    ContentBuilder::default()
                        .value(Some(article.feed_body.clone()))
                        .content_type(Some(String::from("html")))
                        .build(),
                ))
                .build(),
        );
    }
    Ok(entries)
}

fn link(href: &str, rel: &str) -> Link {
    LinkBuilder::default().href(href).rel(rel).build()
}

fn author_to_people(author: &Author) -> Vec<Person> {
    vec![PersonBuilder::default()
        .name(author.name.as_str())
        .email(author.email.clone())
        .build()]
}
