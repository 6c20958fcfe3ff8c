//! Per-connection WebSocket bridge: subscribes a player to its game's
//! broadcast sink, forwards inbound JSON messages to the registry, and
//! forwards outbound [`ServerEvent`]s to the socket. Grounded on the
//! source's `websocket.py` message dispatch (`action`/`chat`/`ping`) and
//! the teacher's channel-bridging `Casino::bridge`.

use actix_web::{web, HttpRequest, HttpResponse};
use futures::StreamExt;
use rbp_core::Chips;
use rbp_dto::{ActionRequest, ChatRequest, ServerEvent};
use rbp_gameplay::Action;
use rbp_gameroom::{BroadcastSink, GameRegistry};
use serde::Deserialize;

/// Unknown action strings fold, mirroring the source's `action_map` which
/// defaults any unrecognized token to `FOLD` rather than rejecting it.
fn parse_action(action: &str, amount: Option<Chips>) -> Action {
    match action.to_lowercase().as_str() {
        "check" => Action::Check,
        "call" => Action::Call,
        "raise" => Action::Raise(amount.unwrap_or(0)),
        "all_in" | "shove" => Action::Shove,
        _ => Action::Fold,
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InboundMessage {
    Action(ActionRequest),
    Chat(ChatRequest),
    Ping,
}

const MAX_CHAT_LEN: usize = 200;

pub async fn connect(
    registry: web::Data<GameRegistry>,
    path: web::Path<(String, String)>,
    req: HttpRequest,
    body: web::Payload,
) -> actix_web::Result<HttpResponse> {
    let (game_id, player_id) = path.into_inner();
    if !registry.has_game(&game_id) {
        return Ok(HttpResponse::NotFound().body("game not found"));
    }

    let (response, mut session, mut stream) = actix_ws::handle(&req, body)?;
    let sink = registry.sink();
    let mut events = sink.subscribe(&game_id, &player_id);

    if let Some(view) = registry.get_state(&game_id, &player_id).await {
        let _ = session.text(ServerEvent::GameState(view).to_json()).await;
    }

    let registry = registry.into_inner();
    actix_web::rt::spawn(async move {
        'bridge: loop {
            tokio::select! {
                biased;
                event = events.recv() => match event {
                    Some(event) => if session.text(event.to_json()).await.is_err() { break 'bridge },
                    None => break 'bridge,
                },
                msg = stream.next() => match msg {
                    Some(Ok(actix_ws::Message::Text(text))) => {
                        dispatch(&registry, &game_id, &player_id, &mut session, &text).await;
                    }
                    Some(Ok(actix_ws::Message::Close(_))) | Some(Err(_)) | None => break 'bridge,
                    _ => continue 'bridge,
                },
            }
        }
        registry.sink().unsubscribe(&game_id, &player_id);
        log::info!("[ws] {} left {}", player_id, game_id);
    });

    Ok(response)
}

async fn dispatch(
    registry: &GameRegistry,
    game_id: &str,
    player_id: &str,
    session: &mut actix_ws::Session,
    text: &str,
) {
    let Ok(message) = serde_json::from_str::<InboundMessage>(text) else {
        return;
    };
    match message {
        InboundMessage::Action(req) => {
            registry.submit_action(game_id, player_id, parse_action(&req.action, req.amount));
        }
        InboundMessage::Chat(req) => {
            let message: String = req.message.chars().take(MAX_CHAT_LEN).collect();
            let player_id = player_id.to_string();
            registry
                .sink()
                .publish(game_id, &move |_| {
                    Some(ServerEvent::Chat { player_id: player_id.clone(), message: message.clone() })
                })
                .await;
        }
        InboundMessage::Ping => {
            let _ = session.text(ServerEvent::Pong.to_json()).await;
        }
    }
}
