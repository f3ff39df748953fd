//! The in-memory [`ArticleStore`]. It's loaded once at startup and only read
//! afterwards, so it can be shared between request handlers without locking.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Datelike;
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::article::Article;
use crate::parser::{Error as ParseError, Parser};

/// Holds every article, ordered by publish timestamp with the most recent
/// first. Articles with equal timestamps keep the order they were loaded in.
#[derive(Debug, Default)]
pub struct ArticleStore {
    articles: Vec<Article>,
    index: HashMap<String, usize>,
}

/// The articles on either side of an article in the store's ordering.
#[derive(Debug, PartialEq)]
pub struct Neighbors<'a> {
    /// The next, more recently published article, if any.
    pub newer: Option<&'a Article>,

    /// The previous, older article, if any.
    pub older: Option<&'a Article>,
}

/// The articles published in one month of a [`Year`].
#[derive(Debug)]
pub struct Month<'a> {
    pub month: u32,
    pub articles: Vec<&'a Article>,
}

/// The articles published in one year, grouped by month.
#[derive(Debug)]
pub struct Year<'a> {
    pub year: i32,
    pub months: Vec<Month<'a>>,
}

impl Year<'_> {
    /// The number of articles published in the year.
    pub fn len(&self) -> usize {
        self.months.iter().map(|m| m.articles.len()).sum()
    }
}

impl ArticleStore {
    /// Parses every article under `directory` and builds a store from them.
    /// Any malformed file or duplicated slug fails the whole load.
    pub fn load(directory: &Path, site_url: &Url) -> Result<ArticleStore> {
        let articles = Parser::new(site_url).parse_articles(directory)?;
        let store = ArticleStore::from_articles(articles)?;
        info!(
            directory = %directory.display(),
            articles = store.len(),
            "loaded articles"
        );
        Ok(store)
    }

    /// Builds a store from `articles`, which are taken to be in insertion
    /// order.
    pub fn from_articles(mut articles: Vec<Article>) -> Result<ArticleStore> {
        // stable, so equal timestamps keep insertion order
        articles.sort_by(|a, b| b.published.cmp(&a.published));

        let mut index = HashMap::with_capacity(articles.len());
        for (i, article) in articles.iter().enumerate() {
            if let Some(existing) = index.insert(article.slug.clone(), i) {
                return Err(Error::DuplicateSlug {
                    slug: article.slug.clone(),
                    first: articles[existing].source_path.clone(),
                    second: article.source_path.clone(),
                });
            }
        }
        Ok(ArticleStore { articles, index })
    }

    /// Every article, most recent first.
    pub fn all(&self) -> &[Article] {
        &self.articles
    }

    /// The `n` most recent articles.
    pub fn recent(&self, n: usize) -> &[Article] {
        &self.articles[..n.min(self.articles.len())]
    }

    /// Looks an article up by slug.
    pub fn get(&self, slug: &str) -> Option<&Article> {
        self.index.get(slug).map(|&i| &self.articles[i])
    }

    /// Returns the articles adjacent to `slug` in the ordering, or `None` if
    /// there is no article with that slug.
    pub fn neighbors(&self, slug: &str) -> Option<Neighbors<'_>> {
        let &i = self.index.get(slug)?;
        Some(Neighbors {
            newer: i.checked_sub(1).map(|j| &self.articles[j]),
            older: self.articles.get(i + 1),
        })
    }

    /// Groups the articles by year and then by month, most recent first.
    pub fn archive(&self) -> Vec<Year<'_>> {
        let mut years: Vec<Year> = Vec::new();
        for article in &self.articles {
            let (year, month) = (article.published.year(), article.published.month());
            match years.last_mut() {
                Some(y) if y.year == year => match y.months.last_mut() {
                    Some(m) if m.month == month => m.articles.push(article),
                    _ => y.months.push(Month {
                        month,
                        articles: vec![article],
                    }),
                },
                _ => years.push(Year {
                    year,
                    months: vec![Month {
                        month,
                        articles: vec![article],
                    }],
                }),
            }
        }
        years
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

/// The result of loading an [`ArticleStore`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure to load an [`ArticleStore`].
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when an article file can't be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Returned when two articles resolve to the same slug.
    #[error(
        "duplicate article slug `{slug}` in `{}` and `{}`",
        first.display(),
        second.display()
    )]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::parse_date;

    fn article(slug: &str, date: &str) -> Article {
        Article {
            slug: slug.to_owned(),
            title: slug.to_uppercase(),
            published: parse_date(date).unwrap(),
            template: String::from("article"),
            body: String::new(),
            feed_body: String::new(),
            excerpt: String::new(),
            source_path: PathBuf::from(format!("{}.md", slug)),
        }
    }

    fn slugs(articles: &[Article]) -> Vec<&str> {
        articles.iter().map(|a| a.slug.as_str()).collect()
    }

    fn store() -> ArticleStore {
        ArticleStore::from_articles(vec![
            article("middle", "2008-06-15"),
            article("oldest", "2007-12-31"),
            article("newest", "2009-01-01 10:00"),
            article("tie-a", "2008-06-01"),
            article("tie-b", "2008-06-01"),
        ])
        .unwrap()
    }

    #[test]
    fn test_all_is_sorted_most_recent_first() {
        let store = store();
        assert_eq!(
            vec!["newest", "middle", "tie-a", "tie-b", "oldest"],
            slugs(store.all())
        );
        assert!(store
            .all()
            .windows(2)
            .all(|pair| pair[0].published >= pair[1].published));
    }

    #[test]
    fn test_get() {
        let store = store();
        for article in store.all() {
            assert_eq!(Some(article), store.get(&article.slug));
        }
        assert_eq!(None, store.get("missing"));
    }

    #[test]
    fn test_neighbors() {
        let store = store();
        let all = store.all();
        for i in 1..all.len() - 1 {
            let neighbors = store.neighbors(&all[i].slug).unwrap();
            assert_eq!(Some(&all[i - 1]), neighbors.newer);
            assert_eq!(Some(&all[i + 1]), neighbors.older);
        }

        let first = store.neighbors("newest").unwrap();
        assert_eq!(None, first.newer);
        assert_eq!(Some("middle"), first.older.map(|a| a.slug.as_str()));

        let last = store.neighbors("oldest").unwrap();
        assert_eq!(Some("tie-b"), last.newer.map(|a| a.slug.as_str()));
        assert_eq!(None, last.older);

        assert_eq!(None, store.neighbors("missing"));
    }

    #[test]
    fn test_single_article_has_no_neighbors() {
        let store = ArticleStore::from_articles(vec![article("only", "2008-01-01")]).unwrap();
        assert_eq!(
            Some(Neighbors {
                newer: None,
                older: None
            }),
            store.neighbors("only")
        );
    }

    #[test]
    fn test_recent() {
        let store = store();
        assert_eq!(vec!["newest", "middle"], slugs(store.recent(2)));
        assert_eq!(5, store.recent(50).len());
    }

    #[test]
    fn test_archive() {
        let store = store();
        let archive = store.archive();
        let shape: Vec<(i32, Vec<(u32, usize)>)> = archive
            .iter()
            .map(|y| {
                (
                    y.year,
                    y.months
                        .iter()
                        .map(|m| (m.month, m.articles.len()))
                        .collect(),
                )
            })
            .collect();
        assert_eq!(
            vec![
                (2009, vec![(1, 1)]),
                (2008, vec![(6, 3)]),
                (2007, vec![(12, 1)]),
            ],
            shape
        );
        assert_eq!(3, archive[1].len());
    }

    #[test]
    fn test_duplicate_slug() {
        match ArticleStore::from_articles(vec![
            article("same", "2008-01-01"),
            article("same", "2009-01-01"),
        ]) {
            Err(Error::DuplicateSlug { slug, .. }) => assert_eq!("same", slug),
            other => panic!("expected a duplicate slug error, got {:?}", other),
        }
    }

    #[test]
    fn test_load() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join("first.md"),
            "---\nTitle: First\nDate: 2008-01-01\n---\nOne",
        )?;
        std::fs::create_dir(dir.path().join("2009"))?;
        std::fs::write(
            dir.path().join("2009").join("second.md"),
            "---\nTitle: Second\nDate: 2009-01-01\n---\nTwo",
        )?;

        let site_url = Url::parse("http://example.com/")?;
        let store = ArticleStore::load(dir.path(), &site_url)?;
        assert_eq!(vec!["second", "first"], slugs(store.all()));
        Ok(())
    }
}
