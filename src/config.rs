//! Loads the site [`Config`] from a `homestead.yaml` project file.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::util::open;

/// The name of the project file.
pub const PROJECT_FILE: &str = "homestead.yaml";

#[derive(Deserialize)]
struct HomeArticles(usize);
impl Default for HomeArticles {
    fn default() -> Self {
        HomeArticles(5)
    }
}

fn default_directory(name: &str) -> PathBuf {
    PathBuf::from(name)
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 4567))
}

/// The project file as it appears on disk. Directories are relative to the
/// project file.
#[derive(Deserialize)]
struct Project {
    title: String,
    site_url: Url,
    author: Author,

    #[serde(default = "default_articles_directory")]
    articles_directory: PathBuf,
    #[serde(default = "default_templates_directory")]
    templates_directory: PathBuf,
    #[serde(default = "default_stylesheets_directory")]
    stylesheets_directory: PathBuf,
    #[serde(default = "default_public_directory")]
    public_directory: PathBuf,

    #[serde(default = "default_listen")]
    listen: SocketAddr,

    #[serde(default)]
    home_articles: HomeArticles,

    #[serde(default)]
    feed_redirect: Option<Url>,

    flickr: FlickrConfig,
}

fn default_articles_directory() -> PathBuf {
    default_directory("articles")
}

fn default_templates_directory() -> PathBuf {
    default_directory("templates")
}

fn default_stylesheets_directory() -> PathBuf {
    default_directory("stylesheets")
}

fn default_public_directory() -> PathBuf {
    default_directory("public")
}

/// The author named in the Atom feed.
#[derive(Clone, Debug, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Settings for the Flickr-backed photo gallery.
#[derive(Clone, Debug, Deserialize)]
pub struct FlickrConfig {
    /// The API key. Usually supplied through `FLICKR_API_KEY` rather than
    /// committed to the project file.
    #[serde(default)]
    pub api_key: String,

    /// The NSID of the account whose photos are shown (e.g. `12345678@N00`).
    pub user_id: String,

    /// The account's URL name, used for links back to Flickr. Defaults to
    /// `user_id`.
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default = "FlickrConfig::default_endpoint")]
    pub endpoint: Url,

    /// Photos carrying this tag are listed as featured.
    #[serde(default = "FlickrConfig::default_featured_tag")]
    pub featured_tag: String,

    /// How many photos the recent and featured listings ask for.
    #[serde(default = "FlickrConfig::default_recent_count")]
    pub recent_count: usize,

    #[serde(default = "FlickrConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl FlickrConfig {
    fn default_endpoint() -> Url {
        // a constant, known-good URL
        Url::parse("https://api.flickr.com/services/rest/").unwrap()
    }

    fn default_featured_tag() -> String {
        String::from("featured")
    }

    fn default_recent_count() -> usize {
        24
    }

    fn default_timeout_secs() -> u64 {
        10
    }
}

/// The resolved site configuration, with every directory made absolute (or at
/// least relative to the working directory rather than the project file).
#[derive(Clone, Debug)]
pub struct Config {
    pub title: String,
    pub site_url: Url,
    pub author: Author,
    pub articles_directory: PathBuf,
    pub templates_directory: PathBuf,
    pub stylesheets_directory: PathBuf,
    pub public_directory: PathBuf,
    pub listen: SocketAddr,
    pub home_articles: usize,
    pub feed_redirect: Option<Url>,
    pub flickr: FlickrConfig,
}

impl Config {
    /// Finds `homestead.yaml` in `dir` or the nearest ancestor that has one
    /// and loads it.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            return Config::from_project_file(&path);
        }
        match dir.parent() {
            Some(parent) => Config::from_directory(parent),
            None => Err(Error::ProjectFileNotFound),
        }
    }

    /// Loads the project file at `path`.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path, "project")?).map_err(|err| {
            Error::Parse {
                path: path.to_owned(),
                err,
            }
        })?;
        let project_root = path
            .parent()
            .ok_or_else(|| Error::NoParentDirectory(path.to_owned()))?;

        Ok(Config {
            title: project.title,
            site_url: project.site_url,
            author: project.author,
            articles_directory: project_root.join(project.articles_directory),
            templates_directory: project_root.join(project.templates_directory),
            stylesheets_directory: project_root.join(project.stylesheets_directory),
            public_directory: project_root.join(project.public_directory),
            listen: project.listen,
            home_articles: project.home_articles.0,
            feed_redirect: project.feed_redirect,
            flickr: project.flickr,
        })
    }
}

/// The result of loading a [`Config`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure to load the project file.
#[derive(Debug, Error)]
pub enum Error {
    #[error("could not find `{}` in any parent directory", PROJECT_FILE)]
    ProjectFileNotFound,

    #[error("can't get parent directory for project file `{}`", .0.display())]
    NoParentDirectory(PathBuf),

    #[error("loading configuration from `{}`: {err}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        err: serde_yaml::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
