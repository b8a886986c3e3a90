use actix_web::web;

pub mod admin;
pub mod auth;
pub mod backend_health;
pub mod profile;
pub mod registration;
pub mod websocket;

use crate::handlers::{history_handler, match_handler, team_handler, users_handler};
use crate::middleware::auth::AuthMiddleware;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(registration::register)
        .service(backend_health::backend_health)
        .service(auth::login);

    // Profile routes (require authentication)
    cfg.service(
        web::scope("/profile")
            .wrap(AuthMiddleware)
            .service(profile::get_user)
            .service(profile::update_user)
            .service(profile::get_stats)
            .service(profile::upload_photo)
            .service(profile::get_photo)
    );
    // Read-only views of the replicated records (require authentication)
    cfg.service(
        web::scope("/users")
            .wrap(AuthMiddleware)
            .route("", web::get().to(users_handler::list_users))
    );
    cfg.service(
        web::scope("/teams")
            .wrap(AuthMiddleware)
            .route("", web::get().to(team_handler::get_teams))
    );
    cfg.service(
        web::scope("/match")
            .wrap(AuthMiddleware)
            .route("", web::get().to(match_handler::get_current_match))
    );
    cfg.service(
        web::scope("/history")
            .wrap(AuthMiddleware)
            .route("", web::get().to(history_handler::list_history))
            .route("/stats/{user_id}", web::get().to(history_handler::get_player_stats))
            .route("/{entry_id}", web::get().to(history_handler::get_history_entry))
    );

    admin::init_admin_routes(cfg);

    // WebSocket routes (authentication handled in route)
    cfg.service(
        web::resource("/live-ws")
            .route(web::get().to(websocket::live_ws_route))
    );
}
