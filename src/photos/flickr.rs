//! [`FlickrGallery`], a [`PhotoGallery`] backed by the Flickr REST API in JSON
//! mode.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};
use url::Url;

use super::{Error, Neighbors, Photo, PhotoGallery, Result, Size};
use crate::config::FlickrConfig;

/// The Flickr error code for an unknown photo (or user).
const NOT_FOUND: i64 = 1;

/// Talks to the Flickr API on behalf of a single account.
#[derive(Debug)]
pub struct FlickrGallery {
    client: Client,
    endpoint: Url,
    api_key: String,
    user_id: String,
    username: String,
    featured_tag: String,
    per_page: String,
}

impl FlickrGallery {
    pub fn new(config: &FlickrConfig) -> Result<FlickrGallery> {
        Ok(FlickrGallery {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()?,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            user_id: config.user_id.clone(),
            username: config
                .username
                .clone()
                .unwrap_or_else(|| config.user_id.clone()),
            featured_tag: config.featured_tag.clone(),
            per_page: config.recent_count.to_string(),
        })
    }

    /// Calls `method` with `params` and decodes the response. Responses with
    /// `"stat": "fail"` become [`Error::Api`].
    async fn call<T: DeserializeOwned>(&self, method: &str, params: &[(&str, &str)]) -> Result<T> {
        debug!(method, "calling flickr");
        let body: serde_json::Value = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("method", method),
                ("api_key", self.api_key.as_str()),
                ("format", "json"),
                ("nojsoncallback", "1"),
            ])
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let status = Status::deserialize(&body)?;
        if status.stat != "ok" {
            warn!(
                method,
                code = ?status.code,
                message = ?status.message,
                "flickr call failed"
            );
            return Err(Error::Api {
                code: status.code.unwrap_or_default(),
                message: status.message.unwrap_or_default(),
            });
        }
        Ok(serde_json::from_value(body)?)
    }
}

/// Maps Flickr's "not found" code to [`Error::NotFound`] for photo lookups.
fn photo_not_found(id: &str, err: Error) -> Error {
    match err {
        Error::Api { code: NOT_FOUND, .. } => Error::NotFound(id.to_owned()),
        err => err,
    }
}

#[async_trait]
impl PhotoGallery for FlickrGallery {
    fn owner(&self) -> &str {
        &self.username
    }

    async fn recent(&self) -> Result<Vec<Photo>> {
        let response: PhotosResponse = self
            .call(
                "flickr.people.getPublicPhotos",
                &[
                    ("user_id", self.user_id.as_str()),
                    ("per_page", self.per_page.as_str()),
                ],
            )
            .await?;
        Ok(response.photos.photo.into_iter().map(Photo::from).collect())
    }

    async fn featured(&self) -> Result<Vec<Photo>> {
        let response: PhotosResponse = self
            .call(
                "flickr.photos.search",
                &[
                    ("user_id", self.user_id.as_str()),
                    ("tags", self.featured_tag.as_str()),
                    ("per_page", self.per_page.as_str()),
                ],
            )
            .await?;
        Ok(response.photos.photo.into_iter().map(Photo::from).collect())
    }

    async fn by_id(&self, id: &str) -> Result<Photo> {
        let response: InfoResponse = self
            .call("flickr.photos.getInfo", &[("photo_id", id)])
            .await
            .map_err(|e| photo_not_found(id, e))?;
        let info = response.photo;
        Ok(Photo {
            id: info.id,
            title: info.title.content,
            secret: info.secret,
            server: info.server,
            farm: info.farm,
        })
    }

    async fn sizes(&self, photo: &Photo) -> Result<Vec<Size>> {
        let response: SizesResponse = self
            .call(
                "flickr.photos.getSizes",
                &[("photo_id", photo.id.as_str())],
            )
            .await
            .map_err(|e| photo_not_found(&photo.id, e))?;
        Ok(response
            .sizes
            .size
            .into_iter()
            .map(|s| Size {
                label: s.label,
                width: s.width,
                height: s.height,
                source: s.source,
            })
            .collect())
    }

    async fn neighbors(&self, photo: &Photo) -> Result<Neighbors> {
        let response: ContextResponse = self
            .call(
                "flickr.photos.getContext",
                &[("photo_id", photo.id.as_str())],
            )
            .await
            .map_err(|e| photo_not_found(&photo.id, e))?;
        // Flickr reports a missing neighbor as a photo with id 0
        let present = |p: Option<RawPhoto>| p.filter(|p| p.id != "0").map(Photo::from);
        Ok(Neighbors {
            previous: present(response.prevphoto),
            next: present(response.nextphoto),
        })
    }
}

#[derive(Deserialize)]
struct Status {
    stat: String,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct PhotosResponse {
    photos: PhotoPage,
}

#[derive(Deserialize)]
struct PhotoPage {
    #[serde(default)]
    photo: Vec<RawPhoto>,
}

#[derive(Deserialize)]
struct RawPhoto {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    #[serde(default)]
    secret: String,
    #[serde(default, deserialize_with = "string_or_number")]
    server: String,
    #[serde(default, deserialize_with = "number_or_string")]
    farm: u32,
    #[serde(default)]
    title: String,
}

impl From<RawPhoto> for Photo {
    fn from(raw: RawPhoto) -> Photo {
        Photo {
            id: raw.id,
            title: raw.title,
            secret: raw.secret,
            server: raw.server,
            farm: raw.farm,
        }
    }
}

#[derive(Deserialize)]
struct InfoResponse {
    photo: RawInfo,
}

#[derive(Deserialize)]
struct RawInfo {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    secret: String,
    #[serde(deserialize_with = "string_or_number")]
    server: String,
    #[serde(deserialize_with = "number_or_string")]
    farm: u32,
    #[serde(default)]
    title: Content,
}

/// Flickr wraps free text as `{"_content": "..."}`.
#[derive(Deserialize, Default)]
struct Content {
    #[serde(rename = "_content", default)]
    content: String,
}

#[derive(Deserialize)]
struct SizesResponse {
    sizes: SizeList,
}

#[derive(Deserialize)]
struct SizeList {
    #[serde(default)]
    size: Vec<RawSize>,
}

#[derive(Deserialize)]
struct RawSize {
    label: String,
    #[serde(deserialize_with = "number_or_string")]
    width: u32,
    #[serde(deserialize_with = "number_or_string")]
    height: u32,
    source: String,
}

#[derive(Deserialize)]
struct ContextResponse {
    #[serde(default)]
    prevphoto: Option<RawPhoto>,
    #[serde(default)]
    nextphoto: Option<RawPhoto>,
}

/// Flickr is inconsistent about quoting numbers, so numeric fields accept
/// either form.
#[derive(Deserialize)]
#[serde(untagged)]
enum Flexible {
    Number(u64),
    Text(String),
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(match Flexible::deserialize(d)? {
        Flexible::Number(n) => n.to_string(),
        Flexible::Text(s) => s,
    })
}

fn number_or_string<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u32, D::Error> {
    match Flexible::deserialize(d)? {
        Flexible::Number(n) => u32::try_from(n).map_err(D::Error::custom),
        Flexible::Text(s) if s.is_empty() => Ok(0),
        Flexible::Text(s) => s.parse().map_err(D::Error::custom),
    }
}
