//! REST lobby routes: create, join, list, and inspect games. Validation
//! mirrors the source's FastAPI routes — a rejected request never reaches
//! the registry or the driver task.

use actix_web::{web, HttpResponse, Responder};
use rbp_dto::{CreateGameRequest, JoinGameRequest};
use rbp_gameroom::{GameRegistry, JoinError};
use serde::Deserialize;

pub async fn create_game(registry: web::Data<GameRegistry>, req: web::Json<CreateGameRequest>) -> impl Responder {
    if req.big_blind < req.small_blind * 2 {
        return HttpResponse::BadRequest().body("big_blind must be >= 2 * small_blind");
    }
    match registry.create_game(&req) {
        Ok(game_id) => HttpResponse::Ok().json(serde_json::json!({
            "game_id": game_id,
            "variant": req.variant,
            "small_blind": req.small_blind,
            "big_blind": req.big_blind,
        })),
        Err(e) => HttpResponse::BadRequest().body(e.to_string()),
    }
}

pub async fn join_game(
    registry: web::Data<GameRegistry>,
    path: web::Path<String>,
    req: web::Json<JoinGameRequest>,
) -> impl Responder {
    let game_id = path.into_inner();
    match registry.join_game(&game_id, &req.player_id, &req.name, req.buy_in) {
        Ok(seat) => HttpResponse::Ok().json(serde_json::json!({
            "player_id": req.player_id,
            "game_id": game_id,
            "seat": seat,
            "chips": req.buy_in,
        })),
        Err(JoinError::GameNotFound) => HttpResponse::NotFound().body(JoinError::GameNotFound.to_string()),
        Err(e) => HttpResponse::BadRequest().body(e.to_string()),
    }
}

pub async fn list_games(registry: web::Data<GameRegistry>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "games": registry.list_games() }))
}

#[derive(Debug, Deserialize)]
pub struct StateParams {
    #[serde(default)]
    pub player_id: String,
}

pub async fn get_game_state(
    registry: web::Data<GameRegistry>,
    path: web::Path<String>,
    query: web::Query<StateParams>,
) -> impl Responder {
    let game_id = path.into_inner();
    match registry.get_state(&game_id, &query.player_id).await {
        Some(view) => HttpResponse::Ok().json(view),
        None => HttpResponse::NotFound().body("game not found"),
    }
}
