//! The library code for `homestead`, a small personal website server. Work
//! happens in two phases:
//!
//! 1. At startup the project is loaded into a [`site::Site`]: the
//!    configuration ([`config`]), every article parsed from its markdown
//!    source ([`parser`], [`markdown`]) into an ordered store ([`store`]), the
//!    page templates ([`templates`]) and a client for the photo service
//!    ([`photos`]). Any failure in this phase is fatal.
//! 2. The [`server`] routes each request to a handler that reads from the
//!    site and renders a page. Articles come from memory; photos are fetched
//!    from the photo service on every request.
//!
//! Failures during a request only affect that request: unknown articles and
//! photos render the not-found page, anything else the error page.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod article;
pub mod assets;
pub mod config;
pub mod feed;
pub mod markdown;
pub mod parser;
pub mod photos;
pub mod server;
pub mod site;
pub mod store;
pub mod templates;
pub mod util;
pub mod value;
