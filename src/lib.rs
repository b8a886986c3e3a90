use std::net::TcpListener;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{http, web, App, HttpServer};
use tracing_actix_web::TracingLogger;

pub mod auth;
pub mod clock;
pub mod config;
pub mod errors;
mod handlers;
mod middleware;
pub mod models;
mod routes;
pub mod services;
pub mod store;
pub mod telemetry;
pub mod utils;

use crate::clock::Clock;
use crate::config::jwt::JwtSettings;
use crate::config::settings::MatchSettings;
use crate::routes::init_routes;
use crate::services::{
    CountdownScheduler, EventLedger, HistoryArchive, IdentityDirectory, MatchLifecycle, PhotoStore, TeamDrawer,
};
use crate::store::ReplicatedStore;

/// Everything the server needs from the outside world.
pub struct AppContext {
    pub store: Arc<ReplicatedStore>,
    pub clock: Arc<dyn Clock>,
    pub photo_store: Arc<dyn PhotoStore>,
    pub jwt_settings: JwtSettings,
    pub match_settings: MatchSettings,
    pub admin_emails: Vec<String>,
}

pub fn run(listener: TcpListener, context: AppContext) -> Result<Server, std::io::Error> {
    let AppContext {
        store,
        clock,
        photo_store,
        jwt_settings,
        match_settings,
        admin_emails,
    } = context;

    let identity = IdentityDirectory::new(Arc::clone(&store), Arc::clone(&clock), &admin_emails);
    let drawer = TeamDrawer::new(Arc::clone(&store));
    let archive = HistoryArchive::new(Arc::clone(&store), Arc::clone(&clock));
    let lifecycle = MatchLifecycle::new(Arc::clone(&store), Arc::clone(&clock), archive.clone());
    let ledger = EventLedger::new(Arc::clone(&store), Arc::clone(&clock));
    let countdown = CountdownScheduler::new(lifecycle.clone(), &match_settings);

    // Wrap using web::Data, which boils down to an Arc smart pointer
    let store = web::Data::new(store);
    let jwt_settings = web::Data::new(jwt_settings);
    let photo_store = web::Data::new(photo_store);
    let identity = web::Data::new(identity);
    let drawer = web::Data::new(drawer);
    let archive = web::Data::new(archive);
    let lifecycle = web::Data::new(lifecycle);
    let ledger = web::Data::new(ledger);
    let countdown = web::Data::new(countdown);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://localhost:5173")
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "PATCH"])
            .allowed_headers(vec![
                http::header::AUTHORIZATION,
                http::header::ACCEPT,
                http::header::CONTENT_TYPE,
                http::header::UPGRADE,
                http::header::CONNECTION,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            // Get a pointer copy and attach it to the application state
            .app_data(store.clone())
            .app_data(jwt_settings.clone())
            .app_data(photo_store.clone())
            .app_data(identity.clone())
            .app_data(drawer.clone())
            .app_data(archive.clone())
            .app_data(lifecycle.clone())
            .app_data(ledger.clone())
            .app_data(countdown.clone())
            .configure(init_routes)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
