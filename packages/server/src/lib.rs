#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the crime advice application.
//!
//! Serves the advice endpoint (`POST /api/chat-bot`), the static crime
//! rate table, police area boundaries styled for the map, and the built
//! front-end from `app/dist` when it exists.

mod handlers;
pub mod interactive;

use std::path::Path;
use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use crime_advice_advisor::Advisor;
use crime_advice_crime_rates::CrimeRateTable;
use crime_advice_map::PoliceAreas;

/// Directory holding the built front-end.
pub const STATIC_DIR: &str = "app/dist";

/// Shared application state.
pub struct AppState {
    /// Runs the geocode, force lookup and generation chain.
    pub advisor: Advisor,
    /// Crime rate table, shared with the advisor.
    pub rates: Arc<CrimeRateTable>,
    /// Police area boundaries, if a boundary file was found.
    pub areas: Option<Arc<PoliceAreas>>,
}

impl AppState {
    /// Builds the state, sharing the advisor's crime rate table.
    #[must_use]
    pub fn new(advisor: Advisor, areas: Option<PoliceAreas>) -> Self {
        let rates = Arc::clone(advisor.rates());
        Self {
            advisor,
            rates,
            areas: areas.map(Arc::new),
        }
    }
}

/// Registers the `/api` routes.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/chat-bot", web::post().to(handlers::chat_bot))
            .route("/crime-rates", web::get().to(handlers::crime_rates))
            .route("/police-areas", web::get().to(handlers::police_areas)),
    );
}

/// Starts the crime advice API server.
///
/// Builds the [`Advisor`] from the environment, loads police area
/// boundaries (serving without them if the file is missing), and starts
/// the Actix-Web HTTP server on `BIND_ADDR:PORT`. This is a regular async
/// function; the caller provides the runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the advisor cannot be configured,
/// or if the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::try_init_custom_env("RUST_LOG").ok();

    log::info!("Configuring advisor...");
    let advisor = Advisor::from_env().await.map_err(std::io::Error::other)?;

    log::info!("Loading police area boundaries...");
    let areas = match PoliceAreas::from_env() {
        Ok(areas) => Some(areas),
        Err(e) => {
            log::warn!("Police area boundaries unavailable: {e}");
            None
        }
    };

    let state = web::Data::new(AppState::new(advisor, areas));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let serve_static = Path::new(STATIC_DIR).is_dir();
    if !serve_static {
        log::info!("{STATIC_DIR} not found; serving the API only");
    }

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        let app = App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api);

        if serve_static {
            app.service(Files::new("/", STATIC_DIR).index_file("index.html"))
        } else {
            app
        }
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
