use std::path::PathBuf;

use clap::Parser;
use jonco_core::api::{create_router, AppState};
use jonco_core::config::{BackendConfig, DEFAULT_STORAGE_BUCKET};
use jonco_core::supabase;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info, warn};

/// jonco server: site content API, media uploads and the built public site.
#[derive(Parser)]
#[command(name = "jonco-server")]
struct Args {
    /// Base URL of the hosted backend.
    #[arg(long, env = "SUPABASE_URL")]
    supabase_url: String,

    /// Public (anonymous) API key.
    #[arg(long, env = "SUPABASE_ANON_KEY")]
    supabase_anon_key: String,

    /// Service-role key for uploads, schedules, testimonials and keepalive.
    /// Never sent to the browser.
    #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
    supabase_service_role_key: Option<String>,

    /// Object-storage bucket for uploaded media.
    #[arg(long, default_value = DEFAULT_STORAGE_BUCKET, env = "JONCO_STORAGE_BUCKET")]
    storage_bucket: String,

    /// Port to listen on.
    #[arg(long, default_value = "3000", env = "JONCO_PORT")]
    port: u16,

    /// Address to bind to.
    #[arg(long, default_value = "0.0.0.0", env = "JONCO_BIND")]
    bind: String,

    /// Path to the built public site, served for every non-API route.
    #[arg(long, env = "JONCO_WEB_DIR")]
    web_dir: Option<PathBuf>,
}

fn configure_logging() {
    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_line_number(true)
        .with_target(false)
        .with_file(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() {
    // Environment first, so clap sees variables from .env.
    let dotenv = dotenvy::dotenv();
    configure_logging();
    if let Ok(path) = dotenv {
        info!("loaded environment from {}", path.display());
    }
    let args = Args::parse();

    let config = BackendConfig::new(
        &args.supabase_url,
        &args.supabase_anon_key,
        args.supabase_service_role_key.as_deref(),
        Some(&args.storage_bucket),
    )
    .unwrap_or_else(|e| {
        error!("invalid backend configuration: {e}");
        std::process::exit(1);
    });

    let (repo, media) = supabase::connect(&config);
    if media.is_none() {
        warn!("uploads disabled until SUPABASE_SERVICE_ROLE_KEY is set");
    }

    let router = create_router(AppState { repo, media });

    let app = if let Some(ref web_dir) = args.web_dir {
        info!("serving web UI from {}", web_dir.display());
        let spa_fallback =
            ServeDir::new(web_dir).fallback(ServeFile::new(web_dir.join("index.html")));
        router.fallback_service(spa_fallback)
    } else {
        router
    };

    let addr = format!("{}:{}", args.bind, args.port);
    info!("binding to {addr}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!("failed to bind to {addr}: {e}");
            std::process::exit(1);
        });

    info!("jonco-server listening on http://{addr}");
    if let Err(e) = axum::serve(listener, app).await {
        error!("server error: {e}");
        std::process::exit(1);
    }
}
