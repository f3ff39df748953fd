//! Drives the router in-process against the demo site in `site/`, with a
//! stub photo gallery standing in for Flickr.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use chrono::{DateTime, Duration, Utc};
use tower::ServiceExt;

use homestead::config::Config;
use homestead::photos::{self, Neighbors, Photo, PhotoGallery, Size};
use homestead::server::router;
use homestead::site::Site;
use homestead::store::ArticleStore;
use homestead::templates::Templates;

struct StubGallery {
    failing: bool,
}

fn stub_photo(id: &str) -> Photo {
    Photo {
        id: id.to_owned(),
        title: format!("Photo {}", id),
        secret: String::from("abc123"),
        server: String::from("3"),
        farm: 4,
    }
}

#[async_trait]
impl PhotoGallery for StubGallery {
    fn owner(&self) -> &str {
        "toolmantim"
    }

    async fn recent(&self) -> photos::Result<Vec<Photo>> {
        if self.failing {
            return Err(photos::Error::Api {
                code: 100,
                message: String::from("Invalid API Key"),
            });
        }
        Ok(vec![stub_photo("2"), stub_photo("1")])
    }

    async fn featured(&self) -> photos::Result<Vec<Photo>> {
        Ok(vec![stub_photo("1")])
    }

    async fn by_id(&self, id: &str) -> photos::Result<Photo> {
        match id {
            "1" | "2" => Ok(stub_photo(id)),
            _ => Err(photos::Error::NotFound(id.to_owned())),
        }
    }

    async fn sizes(&self, photo: &Photo) -> photos::Result<Vec<Size>> {
        Ok(vec![Size {
            label: String::from("Square"),
            width: 75,
            height: 75,
            source: photo.src(Some("s")),
        }])
    }

    async fn neighbors(&self, photo: &Photo) -> photos::Result<Neighbors> {
        Ok(match photo.id.as_str() {
            "2" => Neighbors {
                previous: None,
                next: Some(stub_photo("1")),
            },
            _ => Neighbors {
                previous: Some(stub_photo("2")),
                next: None,
            },
        })
    }
}

fn site(failing: bool) -> Arc<Site> {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("site");
    let config = Config::from_directory(&dir).unwrap();
    let articles = ArticleStore::load(&config.articles_directory, &config.site_url);
    let templates = Templates::load(&config.templates_directory);
    let gallery = Arc::new(StubGallery { failing });
    let site = Site::new(config, articles.unwrap(), gallery, templates.unwrap());
    Arc::new(site.unwrap())
}

async fn get(site: Arc<Site>, uri: &str) -> Response<Body> {
    router(site)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn header_value<'a>(response: &'a Response<Body>, name: header::HeaderName) -> &'a str {
    response.headers()[name].to_str().unwrap()
}

#[tokio::test]
async fn test_home_lists_recent_articles() {
    let response = get(site(false), "/").await;
    assert_eq!(StatusCode::OK, response.status());
    let html = body(response).await;
    assert!(html.contains("Hello again"));
    assert!(html.contains("Rack middleware &amp; you"));
    // home_articles is 2 in the demo project
    assert!(!html.contains("Moving house"));
    assert!(html.contains("/stylesheets/screen.css?"));
}

#[tokio::test]
async fn test_archive_counts() {
    let html = body(get(site(false), "/articles").await).await;
    assert!(html.contains("3 articles"));
    assert!(html.contains("2008 <small>2 articles</small>"));
    assert!(html.contains("January <small>1 article</small>"));
}

#[tokio::test]
async fn test_article_page_links_neighbors() {
    let response = get(site(false), "/articles/rack-middleware").await;
    assert_eq!(StatusCode::OK, response.status());
    let html = body(response).await;
    assert!(html.contains(
        "<title>Rack middleware &amp; you &middot; Toolman Tim</title>"
    ));
    assert!(html.contains(r#"<a rel="next" href="/articles/hello-again-world">"#));
    assert!(html.contains(r#"<a rel="prev" href="/articles/moving-house">"#));
}

#[tokio::test]
async fn test_unknown_article_is_not_found() {
    let response = get(site(false), "/articles/nope").await;
    assert_eq!(StatusCode::NOT_FOUND, response.status());
    assert!(body(response).await.contains("<h1>Not found</h1>"));
}

#[tokio::test]
async fn test_legacy_urls_redirect() {
    let response = get(site(false), "/article/2008/09/24/rack-middleware").await;
    assert_eq!(StatusCode::MOVED_PERMANENTLY, response.status());
    assert_eq!(
        "/articles/rack-middleware",
        header_value(&response, header::LOCATION)
    );

    let response = get(site(false), "/article/2008/09/24/a%20b").await;
    assert_eq!(StatusCode::MOVED_PERMANENTLY, response.status());
    assert_eq!(
        "/articles/a%20b",
        header_value(&response, header::LOCATION)
    );

    let response = get(site(false), "/article/2008/09/24/a%0Ab").await;
    assert_eq!(StatusCode::MOVED_PERMANENTLY, response.status());
    assert_eq!(
        "/articles/a%0Ab",
        header_value(&response, header::LOCATION)
    );

    let response = get(site(false), "/tech/atom.xml").await;
    assert_eq!(StatusCode::MOVED_PERMANENTLY, response.status());
    assert_eq!(
        "http://feeds.feedburner.com/toolmantim",
        header_value(&response, header::LOCATION)
    );
}

#[tokio::test]
async fn test_feed_lists_every_article() {
    let response = get(site(false), "/articles.atom").await;
    assert_eq!(StatusCode::OK, response.status());
    assert_eq!(
        "application/atom+xml",
        header_value(&response, header::CONTENT_TYPE)
    );
    let xml = body(response).await;
    assert_eq!(3, xml.matches("<entry>").count());
    let newest = xml.find("http://toolmantim.com/articles/hello-again-world").unwrap();
    let oldest = xml.find("http://toolmantim.com/articles/moving-house").unwrap();
    assert!(newest < oldest);
}

#[tokio::test]
async fn test_sitemap() {
    let response = get(site(false), "/sitemap.xml").await;
    assert_eq!(
        "application/xml",
        header_value(&response, header::CONTENT_TYPE)
    );
    let xml = body(response).await;
    assert!(xml.contains("<loc>http://toolmantim.com/projects</loc>"));
    assert!(xml.contains("<loc>http://toolmantim.com/articles/moving-house</loc>"));
    assert!(xml.contains("<lastmod>2008-06-14</lastmod>"));
}

#[tokio::test]
async fn test_stylesheet_expires() {
    let response = get(site(false), "/stylesheets/screen.css").await;
    assert_eq!(StatusCode::OK, response.status());
    assert_eq!("text/css", header_value(&response, header::CONTENT_TYPE));
    let expires = header_value(&response, header::EXPIRES);
    let expires = DateTime::parse_from_rfc2822(expires).unwrap();
    let lifetime = expires.with_timezone(&Utc) - Utc::now();
    assert!(lifetime > Duration::days(1090), "expires in {}", lifetime);
    assert!(lifetime <= Duration::days(3 * 365));

    let response = get(site(false), "/stylesheets/missing.css").await;
    assert_eq!(StatusCode::NOT_FOUND, response.status());
    let response = get(site(false), "/stylesheets/screen").await;
    assert_eq!(StatusCode::NOT_FOUND, response.status());
}

#[tokio::test]
async fn test_photos() {
    let response = get(site(false), "/photos").await;
    assert_eq!(StatusCode::OK, response.status());
    let html = body(response).await;
    assert!(html.contains(
        r#"<a href="/photos/2"><img src="http://farm4.static.flickr.com/3/2_abc123_s.jpg""#
    ));

    let response = get(site(false), "/photos/1").await;
    assert_eq!(StatusCode::OK, response.status());
    let html = body(response).await;
    assert!(html.contains("<h1>Photo 1</h1>"));
    assert!(html.contains(r#"<a rel="prev" href="/photos/2">"#));
    assert!(html.contains("http://www.flickr.com/photos/toolmantim/1/"));
}

#[tokio::test]
async fn test_unknown_photo_is_not_found() {
    let response = get(site(false), "/photos/nope").await;
    assert_eq!(StatusCode::NOT_FOUND, response.status());
}

#[tokio::test]
async fn test_photo_service_failure_renders_error_page() {
    let response = get(site(true), "/photos").await;
    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
    let html = body(response).await;
    assert!(html.contains("Something went wrong"));
    assert!(html.contains("<pre>photo service error 100: Invalid API Key</pre>"));
}

#[tokio::test]
async fn test_public_files_and_fallback() {
    let response = get(site(false), "/robots.txt").await;
    assert_eq!(StatusCode::OK, response.status());
    assert!(body(response).await.contains("Sitemap:"));

    let response = get(site(false), "/no/such/file").await;
    assert_eq!(StatusCode::NOT_FOUND, response.status());
    assert!(body(response).await.contains("<h1>Not found</h1>"));
}
