//! Request failures and the pages that report them.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::photos;
use crate::site::Site;
use crate::templates;
use crate::value::{object, string, text};

/// The result of handling a request.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a request that couldn't be served.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested article, photo or file doesn't exist.
    #[error("not found")]
    NotFound,

    /// The photo service failed.
    #[error(transparent)]
    Photos(photos::Error),

    /// A page template failed to render.
    #[error(transparent)]
    Template(#[from] templates::Error),

    /// A page URL couldn't be resolved against the site URL.
    #[error("resolving URL: {0}")]
    Url(#[from] url::ParseError),

    /// A file couldn't be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<photos::Error> for Error {
    fn from(err: photos::Error) -> Error {
        match err {
            photos::Error::NotFound(_) => Error::NotFound,
            err => Error::Photos(err),
        }
    }
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn template(&self) -> (&'static str, &'static str) {
        match self {
            Error::NotFound => ("not_found", "Not Found"),
            _ => ("error", "Error"),
        }
    }

    /// Renders the not-found or error page for this failure. If that page
    /// can't be rendered either, the plain-text response is used instead.
    pub fn render(self, site: &Site) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let (template, title) = self.template();
        let page = object(vec![
            ("status", string(status.as_u16().to_string())),
            ("message", text(&self.to_string())),
        ]);
        match site.render(template, Some(title), page) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => {
                warn!(error = %err, template, "rendering error page");
                self.into_response()
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = status.canonical_reason().unwrap_or("Error");
        (status, message).into_response()
    }
}

/// Passes a successful response through and renders a failed one.
pub fn respond(site: &Site, result: Result<Response>) -> Response {
    match result {
        Ok(response) => response,
        Err(err) => err.render(site),
    }
}
