use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{App, Arg};
use homestead::config::Config;
use homestead::server;
use homestead::site::Site;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let matches = App::new("homestead")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Serves a personal website with articles and photos")
        .arg(
            Arg::with_name("project")
                .help("The project directory, or any directory below it")
                .default_value("."),
        )
        .arg(
            Arg::with_name("listen")
                .long("listen")
                .short("l")
                .takes_value(true)
                .help("The address to listen on, overriding the project file"),
        )
        .arg(
            Arg::with_name("flickr-api-key")
                .long("flickr-api-key")
                .takes_value(true)
                .env("FLICKR_API_KEY")
                .help("The Flickr API key, overriding the project file"),
        )
        .get_matches();

    let project = Path::new(matches.value_of("project").unwrap_or("."));
    let project = std::fs::canonicalize(project)
        .with_context(|| format!("resolving `{}`", project.display()))?;
    let mut config = Config::from_directory(&project)
        .with_context(|| format!("loading project from `{}`", project.display()))?;
    if let Some(listen) = matches.value_of("listen") {
        config.listen = listen
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid listen address `{}`", listen))?;
    }
    if let Some(api_key) = matches.value_of("flickr-api-key") {
        config.flickr.api_key = api_key.to_owned();
    }

    let listen = config.listen;
    let site = Site::from_config(config).context("loading site")?;
    info!(
        title = %site.config.title,
        articles = site.articles.len(),
        "site loaded"
    );

    server::serve(Arc::new(site), listen).await?;
    info!("stopped");
    Ok(())
}
