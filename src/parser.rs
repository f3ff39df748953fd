//! Defines the [`Parser`] and [`Error`] types: the logic for reading
//! [`Article`]s from content files on disk into memory.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use thiserror::Error;
use url::Url;
use walkdir::WalkDir;

use crate::article::{Article, DEFAULT_TEMPLATE};
use crate::markdown;

const MARKDOWN_EXTENSION: &str = "md";

/// Parses [`Article`] objects from source files.
pub struct Parser<'a> {
    /// `site_url` is the absolute URL of the site. Root-relative links in
    /// article bodies are resolved against it for the feed rendition.
    site_url: &'a Url,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser. See fields on [`Parser`] for argument
    /// descriptions.
    pub fn new(site_url: &'a Url) -> Parser<'a> {
        Parser { site_url }
    }

    /// Searches `source_directory` (recursively) for article files (extension
    /// = `.md`) and returns them in file-name order. Each file must be
    /// structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter with fields `Title`, `Date`, and optionally
    ///    `Template` and `Slug`
    /// 3. Terminal frontmatter fence (`---`) on its own line
    /// 4. Article body in markdown
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// Title: Hello, world!
    /// Date: 2008-05-01 09:30
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    ///
    /// The first file that fails to parse aborts the whole operation.
    pub fn parse_articles(&self, source_directory: &Path) -> Result<Vec<Article>> {
        let mut articles = Vec::new();
        for result in WalkDir::new(source_directory)
            .min_depth(1)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let entry = result?;
            let is_markdown = entry
                .path()
                .extension()
                .map_or(false, |ext| ext == MARKDOWN_EXTENSION);
            if entry.file_type().is_file() && is_markdown {
                articles.push(self.parse_file(entry.path())?);
            }
        }
        Ok(articles)
    }

    /// Reads and parses a single article file, annotating any failure with
    /// the file's path.
    pub fn parse_file(&self, path: &Path) -> Result<Article> {
        let annotate = |e: Error| Error::Annotated {
            path: path.to_owned(),
            source: Box::new(e),
        };
        let contents = std::fs::read_to_string(path).map_err(|e| annotate(e.into()))?;
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| annotate(Error::InvalidFileName(path.to_owned())))?;
        self.parse_str(stem, path, &contents).map_err(annotate)
    }

    /// Parses a single [`Article`] from its file stem and contents. The slug is
    /// taken from the `Slug` field when present, otherwise from the slugified
    /// `stem`.
    pub fn parse_str(&self, stem: &str, path: &Path, input: &str) -> Result<Article> {
        let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
        let frontmatter: Frontmatter = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;
        let published = parse_date(&frontmatter.date)?;
        let rendered = markdown::render(&input[body_start..], self.site_url)?;

        Ok(Article {
            slug: match frontmatter.slug {
                Some(slug) => slug::slugify(slug),
                None => slug::slugify(stem),
            },
            title: frontmatter.title,
            published,
            template: frontmatter
                .template
                .unwrap_or_else(|| DEFAULT_TEMPLATE.to_owned()),
            body: rendered.body,
            feed_body: rendered.feed_body,
            excerpt: rendered.excerpt,
            source_path: path.to_owned(),
        })
    }
}

fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
    const FENCE: &str = "---";
    const CLOSING_FENCE: &str = "\n---";
    if !input.starts_with(FENCE) {
        return Err(Error::FrontmatterMissingStartFence);
    }
    match input[FENCE.len()..].find(CLOSING_FENCE) {
        None => Err(Error::FrontmatterMissingEndFence),
        Some(offset) => {
            let yaml_stop = FENCE.len() + offset;
            let fence_end = yaml_stop + CLOSING_FENCE.len();
            // the body starts on the line after the closing fence
            let body_start = match input[fence_end..].find('\n') {
                Some(newline) => fence_end + newline + 1,
                None => input.len(),
            };
            Ok((FENCE.len(), yaml_stop, body_start))
        }
    }
}

/// Parses a front matter date. RFC 3339 timestamps keep their offset; the
/// naive forms `YYYY-MM-DD HH:MM[:SS]` and `YYYY-MM-DD` are taken as UTC.
pub fn parse_date(input: &str) -> Result<DateTime<FixedOffset>> {
    let input = input.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(input) {
        return Ok(date);
    }
    for format in &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(Utc.from_utc_datetime(&naive).into());
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).into())
        .ok_or_else(|| Error::InvalidDate(input.to_owned()))
}

#[derive(Deserialize, Clone)]
struct Frontmatter {
    /// The title of the article.
    #[serde(rename = "Title")]
    pub title: String,

    /// The publish date of the article.
    #[serde(rename = "Date")]
    pub date: String,

    /// The page template to render the article with.
    #[serde(default, rename = "Template")]
    pub template: Option<String>,

    /// Overrides the slug derived from the file name.
    #[serde(default, rename = "Slug")]
    pub slug: Option<String>,
}

/// Represents the result of an [`Article`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing an [`Article`] object.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when a source file is missing its starting frontmatter fence
    /// (`---`).
    #[error("article must begin with `---`")]
    FrontmatterMissingStartFence,

    /// Returned when a source file is missing its terminal frontmatter fence.
    #[error("missing closing `---`")]
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    #[error(transparent)]
    DeserializeYaml(#[from] serde_yaml::Error),

    /// Returned when the `Date` field isn't in a recognized format.
    #[error("unrecognized date `{0}`")]
    InvalidDate(String),

    /// Returned when there is a problem parsing URLs.
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned for WalkDir I/O errors.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Returned when a source file name isn't valid UTF-8.
    #[error("invalid file name: {0:?}")]
    InvalidFileName(PathBuf),

    /// An error annotated with the file it occurred in.
    #[error("parsing article `{}`: {source}", path.display())]
    Annotated {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },
}

#[cfg(test)]
mod test {
    use super::*;

    fn site_url() -> Url {
        Url::parse("http://example.com/").unwrap()
    }

    #[test]
    fn test_parse_str() -> Result<()> {
        let site_url = site_url();
        let parser = Parser::new(&site_url);
        let article = parser.parse_str(
            "Hello World",
            Path::new("articles/Hello World.md"),
            "---\nTitle: Hello, world!\nDate: 2008-05-01 09:30\n---\nToday is *the* day.\n",
        )?;

        assert_eq!("hello-world", article.slug);
        assert_eq!("Hello, world!", article.title);
        assert_eq!("2008-05-01T09:30:00+00:00", article.published.to_rfc3339());
        assert_eq!(DEFAULT_TEMPLATE, article.template);
        assert_eq!("<p>Today is <em>the</em> day.</p>\n", article.body);
        assert_eq!("Today is the day.", article.excerpt);
        Ok(())
    }

    #[test]
    fn test_parse_str_overrides() -> Result<()> {
        let site_url = site_url();
        let parser = Parser::new(&site_url);
        let input = "---\nTitle: Wide\nDate: 2009-01-02\nTemplate: wide_article\n\
                     Slug: A Custom Slug\n---\nBody";
        let article = parser.parse_str("whatever", Path::new("whatever.md"), input)?;
        assert_eq!("a-custom-slug", article.slug);
        assert_eq!("wide_article", article.template);
        Ok(())
    }

    #[test]
    fn test_parse_str_missing_fences() {
        let site_url = site_url();
        let parser = Parser::new(&site_url);
        let path = Path::new("x.md");
        assert!(matches!(
            parser.parse_str("x", path, "Title: x\n"),
            Err(Error::FrontmatterMissingStartFence)
        ));
        assert!(matches!(
            parser.parse_str("x", path, "---\nTitle: x\nDate: 2009-01-02\n"),
            Err(Error::FrontmatterMissingEndFence)
        ));
    }

    #[test]
    fn test_parse_str_missing_title() {
        let site_url = site_url();
        let parser = Parser::new(&site_url);
        assert!(matches!(
            parser.parse_str("x", Path::new("x.md"), "---\nDate: 2009-01-02\n---\n"),
            Err(Error::DeserializeYaml(_))
        ));
    }

    #[test]
    fn test_parse_date() -> Result<()> {
        assert_eq!(
            "2008-05-01T09:30:00+10:00",
            parse_date("2008-05-01T09:30:00+10:00")?.to_rfc3339()
        );
        assert_eq!(
            "2008-05-01T09:30:15+00:00",
            parse_date("2008-05-01 09:30:15")?.to_rfc3339()
        );
        assert_eq!(
            "2008-05-01T00:00:00+00:00",
            parse_date("2008-05-01")?.to_rfc3339()
        );
        assert!(matches!(parse_date("May 1st"), Err(Error::InvalidDate(_))));
        Ok(())
    }

    #[test]
    fn test_parse_articles_reports_the_bad_file() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join("good.md"),
            "---\nTitle: Good\nDate: 2009-01-02\n---\nBody",
        )?;
        std::fs::write(dir.path().join("bad.md"), "no frontmatter here")?;
        std::fs::write(dir.path().join("notes.txt"), "ignored")?;

        let site_url = site_url();
        match Parser::new(&site_url).parse_articles(dir.path()) {
            Err(Error::Annotated { path, source }) => {
                assert!(path.ends_with("bad.md"));
                assert!(matches!(*source, Error::FrontmatterMissingStartFence));
            }
            other => panic!("expected an annotated error, got {:?}", other),
        }
        Ok(())
    }
}
