//! The request handlers. Each one builds its page from the [`Site`] and
//! hands failures to [`respond`], which renders the not-found or error page.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use chrono::{Duration, Utc};
use gtmpl::Value;

use super::error::{respond, Error, Result};
use crate::feed::render_feed;
use crate::photos::Photo;
use crate::site::{Site, FEED_PATH};
use crate::util::pluralize;
use crate::value::{array, object, optional, photo, string};

/// How far ahead stylesheets expire. Their URLs change with their contents.
const STYLESHEET_LIFETIME_DAYS: i64 = 3 * 365;

/// The pages listed in the sitemap besides the articles.
const SITEMAP_PAGES: &[&str] = &["/", "/articles", "/projects", "/photos"];

type SiteState = State<Arc<Site>>;

pub async fn home(State(site): SiteState) -> Response {
    let page = object(vec![(
        "articles",
        array(site.articles.recent(site.config.home_articles), Value::from),
    )]);
    respond(&site, html(&site, "home", None, page))
}

pub async fn archive(State(site): SiteState) -> Response {
    let page = object(vec![
        ("count", string(pluralize(site.articles.len(), "article"))),
        ("years", array(&site.articles.archive(), Value::from)),
    ]);
    respond(&site, html(&site, "archive", Some("Articles"), page))
}

pub async fn article(State(site): SiteState, Path(id): Path<String>) -> Response {
    respond(&site, article_page(&site, &id))
}

fn article_page(site: &Site, id: &str) -> Result<Response> {
    let article = site.articles.get(id).ok_or(Error::NotFound)?;
    let neighbors = site.articles.neighbors(id).ok_or(Error::NotFound)?;
    let page = object(vec![
        ("article", Value::from(article)),
        ("newer", optional(neighbors.newer, Value::from)),
        ("older", optional(neighbors.older, Value::from)),
    ]);
    html(site, &article.template, Some(article.title.as_str()), page)
}

pub async fn feed(State(site): SiteState) -> Response {
    let result = render_feed(&site.feed_config(), site.articles.all())
        .map(|xml| with_content_type("application/atom+xml", xml))
        .map_err(Error::from);
    respond(&site, result)
}

/// `/article/:year/:month/:day/:id` moved to `/articles/:id`.
pub async fn legacy_article(
    State(site): SiteState,
    Path((_year, _month, _day, id)): Path<(String, String, String, String)>,
) -> Response {
    let result = article_location(&site, &id).map(|location| moved(&location));
    respond(&site, result)
}

/// The path of the article page for `id`, with `id` percent-encoded as a
/// single path segment.
fn article_location(site: &Site, id: &str) -> Result<String> {
    let mut url = site.config.site_url.join("/articles")?;
    url.path_segments_mut()
        .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .push(id);
    Ok(url.path().to_owned())
}

pub async fn legacy_feed(State(site): SiteState) -> Response {
    match &site.config.feed_redirect {
        Some(url) => moved(url.as_str()),
        None => moved(FEED_PATH),
    }
}

pub async fn projects(State(site): SiteState) -> Response {
    let page = object(vec![]);
    respond(&site, html(&site, "projects", Some("Projects"), page))
}

pub async fn photos(State(site): SiteState) -> Response {
    let result = photos_page(&site).await;
    respond(&site, result)
}

async fn photos_page(site: &Site) -> Result<Response> {
    let (recent, featured) = tokio::try_join!(site.photos.recent(), site.photos.featured())?;
    let owner = site.photos.owner();
    let page = object(vec![
        ("recent", array(&recent, |p| photo(p, owner))),
        ("featured", array(&featured, |p| photo(p, owner))),
    ]);
    html(site, "photos", Some("Photos"), page)
}

pub async fn photo_detail(State(site): SiteState, Path(id): Path<String>) -> Response {
    let result = photo_page(&site, &id).await;
    respond(&site, result)
}

async fn photo_page(site: &Site, id: &str) -> Result<Response> {
    let found = site.photos.by_id(id).await?;
    let (sizes, neighbors) =
        tokio::try_join!(site.photos.sizes(&found), site.photos.neighbors(&found))?;
    let owner = site.photos.owner();
    let neighbor = |p: Option<&Photo>| optional(p, |p| photo(p, owner));
    let page = object(vec![
        ("photo", photo(&found, owner)),
        ("sizes", array(&sizes, Value::from)),
        ("previous", neighbor(neighbors.previous.as_ref())),
        ("next", neighbor(neighbors.next.as_ref())),
    ]);
    html(site, "photo", Some(found.title.as_str()), page)
}

pub async fn sitemap(State(site): SiteState) -> Response {
    respond(&site, sitemap_page(&site))
}

fn sitemap_page(site: &Site) -> Result<Response> {
    let mut urls = Vec::with_capacity(SITEMAP_PAGES.len() + site.articles.len());
    for path in SITEMAP_PAGES {
        urls.push(object(vec![
            ("loc", string(site.config.site_url.join(path)?.as_str())),
            ("lastmod", Value::Nil),
        ]));
    }
    for article in site.articles.all() {
        let loc = site.config.site_url.join(&article.path())?;
        let lastmod = article.published.format("%Y-%m-%d").to_string();
        urls.push(object(vec![
            ("loc", string(loc.as_str())),
            ("lastmod", string(lastmod)),
        ]));
    }
    let page = object(vec![("urls", Value::Array(urls))]);
    let xml = site.render("sitemap", None, page)?;
    Ok(with_content_type("application/xml", xml))
}

/// Serves `/stylesheets/:file`, where `file` must be `{name}.css`.
pub async fn stylesheet(State(site): SiteState, Path(file): Path<String>) -> Response {
    let result = stylesheet_response(&site, &file).await;
    respond(&site, result)
}

async fn stylesheet_response(site: &Site, file: &str) -> Result<Response> {
    let path = file
        .strip_suffix(".css")
        .and_then(|name| site.assets.stylesheet_path(name))
        .ok_or(Error::NotFound)?;
    let css = match tokio::fs::read_to_string(&path).await {
        Ok(css) => css,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Err(Error::NotFound),
        Err(err) => return Err(err.into()),
    };
    let expires = (Utc::now() + Duration::days(STYLESHEET_LIFETIME_DAYS))
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string();
    let headers = [
        (header::CONTENT_TYPE, String::from("text/css")),
        (header::EXPIRES, expires),
    ];
    Ok((headers, css).into_response())
}

/// Anything no route or public file matched.
pub async fn not_found(State(site): SiteState) -> Response {
    respond(&site, Err(Error::NotFound))
}

fn html(site: &Site, template: &str, title: Option<&str>, page: Value) -> Result<Response> {
    Ok(Html(site.render(template, title, page)?).into_response())
}

fn moved(location: &str) -> Response {
    let headers = [(header::LOCATION, location.to_owned())];
    (StatusCode::MOVED_PERMANENTLY, headers).into_response()
}

fn with_content_type(content_type: &'static str, body: String) -> Response {
    ([(header::CONTENT_TYPE, content_type)], body).into_response()
}
