use std::{
    env::{self, VarError},
    fs::{self, OpenOptions},
    net::SocketAddr,
    path::PathBuf,
    process::exit,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use fintrack::{build_router, graceful_shutdown, stores::sqlite::create_app_state};

/// The REST API server for the fintrack personal finance tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database. When omitted, a
    /// persistent `data/finance.db` is used if APP_ENV is set to
    /// "production", otherwise a local `finance.db`.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// The port to serve the API from. When omitted, the PORT environment
    /// variable is used, then 3000.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let port = args
        .port
        .unwrap_or_else(|| parse_port_or_default("PORT", 3000));
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let db_path = args.db_path.unwrap_or_else(default_db_path);

    let connection = match Connection::open(&db_path) {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not open the database at {db_path:?}: {error}");
            exit(1);
        }
    };

    // The server cannot function without storage, so a failure to set up the
    // schema is fatal.
    let state = match create_app_state(connection) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("could not initialize the database at {db_path:?}: {error}");
            exit(1);
        }
    };
    tracing::info!("connected to SQLite database at {db_path:?}");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state));

    tracing::info!("HTTP server listening on {addr}");
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("server error: {error}");
        exit(1);
    }
}

/// The database path to use when none is given on the command line.
///
/// A deployed instance keeps its database on a persistent volume mounted at
/// `data/`, which is created if it is missing.
fn default_db_path() -> PathBuf {
    if env::var("APP_ENV").is_ok_and(|value| value == "production") {
        let data_dir = PathBuf::from("data");

        if let Err(error) = fs::create_dir_all(&data_dir) {
            tracing::error!("could not create the data directory {data_dir:?}: {error}");
            exit(1);
        }

        data_dir.join("finance.db")
    } else {
        PathBuf::from("finance.db")
    }
}

/// Get a port number from the environment variable `env_key` if set,
/// otherwise return `default_port`.
fn parse_port_or_default(env_key: &str, default_port: u16) -> u16 {
    let port_string = match env::var(env_key) {
        Ok(string) => string,
        Err(VarError::NotPresent) => {
            tracing::debug!(
                "The environment variable '{env_key}' was not set, using the default port {default_port}."
            );
            return default_port;
        }
        Err(error) => {
            tracing::error!(
                "An error occurred retrieving the environment variable '{env_key}': {error}"
            );
            exit(1);
        }
    };

    match port_string.parse() {
        Ok(port_number) => port_number,
        Err(error) => {
            tracing::error!(
                "An error occurred parsing the port number '{port_string}' from the environment variable '{env_key}': {error}"
            );
            exit(1);
        }
    }
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http().make_span_with(|req: &Request| {
        let method = req.method();
        let uri = req.uri();

        let matched_path = req
            .extensions()
            .get::<MatchedPath>()
            .map(|matched_path| matched_path.as_str());

        tracing::debug_span!("request", %method, %uri, matched_path)
    });

    router.layer(tracing_layer)
}
