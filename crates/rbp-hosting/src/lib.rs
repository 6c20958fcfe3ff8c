//! HTTP and WebSocket surface over [`rbp_gameroom::GameRegistry`].
//!
//! Kept intentionally thin: create/join/list/get-state REST routes plus a
//! single WebSocket bridge per connected player. No auth, no persistence,
//! no HTML rendering — those stay with whatever serves the client.

mod routes;
mod server;
mod websocket;

pub use server::Server;
