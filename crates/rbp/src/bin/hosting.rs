//! Hosting server binary.
//!
//! Runs the HTTP + WebSocket surface for live game rooms.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Runs the poker hosting server")]
struct Cli {
    /// Address and port to bind, e.g. 0.0.0.0:8080.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind: String,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();
    rbp::core::init();
    rbp::hosting::Server::run(&cli.bind).await
}
