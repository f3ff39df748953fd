//! Exports [`Site`], which bundles everything a request handler needs: the
//! loaded articles, the photo gallery, the templates and the configuration.
//! A [`Site`] is built once at startup and handed to the router; request
//! handlers only ever read it.

use std::sync::Arc;

use gtmpl::Value;
use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::assets::Assets;
use crate::config::Config;
use crate::feed::FeedConfig;
use crate::photos::{self, FlickrGallery, PhotoGallery};
use crate::store::{self, ArticleStore};
use crate::templates::{self, Templates};
use crate::value::{object, optional, string, text};

/// The templates every site must provide.
pub const REQUIRED_TEMPLATES: &[&str] = &[
    "home",
    "archive",
    "projects",
    "photos",
    "photo",
    "not_found",
    "error",
    "sitemap",
];

/// Where the Atom feed is served.
pub const FEED_PATH: &str = "/articles.atom";

pub struct Site {
    pub config: Config,
    pub articles: ArticleStore,
    pub photos: Arc<dyn PhotoGallery>,
    pub templates: Templates,
    pub assets: Assets,
    feed_url: Url,
}

impl Site {
    /// Builds the site from a [`Config`]: loads the articles and templates and
    /// connects the Flickr gallery. Any failure here is fatal.
    pub fn from_config(config: Config) -> Result<Site> {
        let articles = ArticleStore::load(&config.articles_directory, &config.site_url)?;
        let templates = Templates::load(&config.templates_directory)?;
        let photos = Arc::new(FlickrGallery::new(&config.flickr)?);
        Site::new(config, articles, photos, templates)
    }

    /// Assembles a site from its parts, checking that every template the
    /// routes and articles refer to exists.
    pub fn new(
        config: Config,
        articles: ArticleStore,
        photos: Arc<dyn PhotoGallery>,
        templates: Templates,
    ) -> Result<Site> {
        for &name in REQUIRED_TEMPLATES {
            if !templates.contains(name) {
                return Err(Error::MissingTemplate(name.to_owned()));
            }
        }
        for article in articles.all() {
            if !templates.contains(&article.template) {
                return Err(Error::ArticleTemplate {
                    slug: article.slug.clone(),
                    template: article.template.clone(),
                });
            }
        }

        let assets = Assets::new(&config.stylesheets_directory, &config.public_directory);
        if !assets.has_favicon() {
            warn!(
                directory = %config.public_directory.display(),
                "no favicon.ico in the public directory"
            );
        }

        Ok(Site {
            feed_url: config.site_url.join(FEED_PATH)?,
            assets,
            config,
            articles,
            photos,
            templates,
        })
    }

    pub fn feed_config(&self) -> FeedConfig<'_> {
        FeedConfig {
            title: &self.config.title,
            author: &self.config.author,
            site_url: &self.config.site_url,
            feed_url: &self.feed_url,
        }
    }

    /// Renders the page template `name`. Besides `page`, every template sees
    /// `site` (title, url, author, feed), `assets` (see [`Assets::to_value`])
    /// and the page `title`, which is nil on the home page.
    pub fn render(
        &self,
        name: &str,
        title: Option<&str>,
        page: Value,
    ) -> templates::Result<String> {
        let value = object(vec![
            (
                "site",
                object(vec![
                    ("title", text(&self.config.title)),
                    ("url", string(self.config.site_url.as_str())),
                    ("author", text(&self.config.author.name)),
                    ("feed", string(FEED_PATH)),
                ]),
            ),
            ("assets", self.assets.to_value()),
            ("title", optional(title, text)),
            ("page", page),
        ]);
        self.templates.render(name, value)
    }
}

/// The result of building a [`Site`].
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when the articles can't be loaded.
    #[error(transparent)]
    Articles(#[from] store::Error),

    /// Returned when the templates can't be loaded.
    #[error(transparent)]
    Templates(#[from] templates::Error),

    /// Returned when the photo client can't be set up.
    #[error(transparent)]
    Photos(#[from] photos::Error),

    /// Returned when one of [`REQUIRED_TEMPLATES`] is missing.
    #[error("missing required template `{0}`")]
    MissingTemplate(String),

    /// Returned when an article names a template that doesn't exist.
    #[error("article `{slug}` uses unknown template `{template}`")]
    ArticleTemplate { slug: String, template: String },

    /// Returned when the feed URL can't be derived from the site URL.
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),
}
