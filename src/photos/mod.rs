//! The photo gallery: the [`Photo`] shape used by the site and the
//! [`PhotoGallery`] trait that the router talks to. [`flickr::FlickrGallery`]
//! is the implementation backed by the Flickr API.

use async_trait::async_trait;
use thiserror::Error;

pub mod flickr;

pub use flickr::FlickrGallery;

/// A photo as reported by the photo service. The `server`, `farm` and
/// `secret` fields are opaque; they only exist to build display URLs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Photo {
    pub id: String,
    pub title: String,
    pub secret: String,
    pub server: String,
    pub farm: u32,
}

impl Photo {
    /// The URL of the image file. `size` is a Flickr size suffix (`s` for a
    /// 75px square, `t` thumbnail, `m` small, `b` large); `None` is the
    /// default medium rendition.
    pub fn src(&self, size: Option<&str>) -> String {
        match size {
            Some(size) => format!(
                "http://farm{}.static.flickr.com/{}/{}_{}_{}.jpg",
                self.farm, self.server, self.id, self.secret, size
            ),
            None => format!(
                "http://farm{}.static.flickr.com/{}/{}_{}.jpg",
                self.farm, self.server, self.id, self.secret
            ),
        }
    }

    /// The photo's page on Flickr.
    pub fn page_url(&self, owner: &str) -> String {
        format!("http://www.flickr.com/photos/{}/{}/", owner, self.id)
    }

    /// The site-relative path of the photo page.
    pub fn path(&self) -> String {
        format!("/photos/{}", self.id)
    }
}

/// One rendition of a photo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Size {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub source: String,
}

/// The photos on either side of a photo in the owner's photostream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Neighbors {
    /// The more recently posted photo, if any.
    pub previous: Option<Photo>,

    /// The older photo, if any.
    pub next: Option<Photo>,
}

/// The queries the site makes against a photo service. Every call goes to
/// the network; nothing is cached or retried.
#[async_trait]
pub trait PhotoGallery: Send + Sync {
    /// The account whose photos are shown. Used for links back to the service.
    fn owner(&self) -> &str;

    /// The most recent photos, in the service's order.
    async fn recent(&self) -> Result<Vec<Photo>>;

    /// The photos marked as featured.
    async fn featured(&self) -> Result<Vec<Photo>>;

    /// Looks a photo up by id. Returns [`Error::NotFound`] for unknown ids.
    async fn by_id(&self, id: &str) -> Result<Photo>;

    /// The available renditions of `photo`.
    async fn sizes(&self, photo: &Photo) -> Result<Vec<Size>>;

    /// The photos adjacent to `photo` in recency order.
    async fn neighbors(&self, photo: &Photo) -> Result<Neighbors>;
}

/// The result of a photo service call.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failed photo service call.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested photo doesn't exist.
    #[error("photo `{0}` not found")]
    NotFound(String),

    /// The service answered with an error status.
    #[error("photo service error {code}: {message}")]
    Api { code: i64, message: String },

    /// The request couldn't be made or the response couldn't be read.
    #[error("photo service request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response wasn't in the expected shape.
    #[error("decoding photo service response: {0}")]
    Decode(#[from] serde_json::Error),
}
