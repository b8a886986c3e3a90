use actix_web::web;

use crate::handlers::admin::{match_handler, team_handler, user_handler};
use crate::middleware::admin::AdminMiddleware;

pub fn init_admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(AdminMiddleware)
            // User management routes
            .service(
                web::resource("/users/{id}/role")
                    .route(web::patch().to(user_handler::update_user_role))
            )

            // Team draw routes
            .service(
                web::resource("/teams")
                    .route(web::delete().to(team_handler::clear_teams))
            )
            .service(
                web::resource("/teams/draw")
                    .route(web::post().to(team_handler::draw_teams))
            )

            // Match lifecycle routes
            .service(
                web::resource("/match")
                    .route(web::post().to(match_handler::create_match))
                    .route(web::delete().to(match_handler::reset_match))
            )
            .service(
                web::resource("/match/activate")
                    .route(web::post().to(match_handler::activate_match))
            )
            .service(
                web::resource("/match/advance-half")
                    .route(web::post().to(match_handler::advance_half))
            )
            .service(
                web::resource("/match/finish")
                    .route(web::post().to(match_handler::finish_match))
            )
            .service(
                web::resource("/match/events")
                    .route(web::post().to(match_handler::record_event))
            )
    );
}
