use crate::routes;
use crate::websocket;
use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use rbp_gameroom::GameRegistry;

pub struct Server;

impl Server {
    /// Binds and runs the hosting server. `bind_addr` is `host:port`,
    /// e.g. `0.0.0.0:8080` — supplied by the caller's CLI parsing.
    pub async fn run(bind_addr: &str) -> std::io::Result<()> {
        let state = web::Data::new(GameRegistry::new());
        log::info!("starting hosting server on {}", bind_addr);
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(Cors::default().allow_any_origin().allow_any_method().allow_any_header())
                .app_data(state.clone())
                .route("/api/games", web::post().to(routes::create_game))
                .route("/api/games", web::get().to(routes::list_games))
                .route("/api/games/{game_id}/join", web::post().to(routes::join_game))
                .route("/api/games/{game_id}/state", web::get().to(routes::get_game_state))
                .route("/ws/{game_id}/{player_id}", web::get().to(websocket::connect))
        })
        .bind(bind_addr)?
        .run()
        .await
    }
}
