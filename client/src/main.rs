use clap::Parser;
use client::app::{App, AppConfig};
use log::{error, info};
use macroquad::prelude::Conf;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Game server WebSocket URL
    #[arg(short = 's', long, default_value = "ws://localhost:3000")]
    server: String,

    /// Room server WebSocket URL
    #[arg(long, default_value = "ws://localhost:3001")]
    rooms_server: String,

    /// Name shown to other players
    #[arg(short = 'n', long)]
    name: String,

    /// Go straight to this room's lobby
    #[arg(short = 'r', long)]
    room: Option<String>,

    /// Directory holding the sprite images
    #[arg(short = 'a', long, default_value = "assets")]
    assets: PathBuf,

    /// Window width
    #[arg(short = 'w', long, default_value = "800")]
    width: i32,

    /// Window height (no short flag to avoid conflict with --help)
    #[arg(long, default_value = "600")]
    height: i32,
}

fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Starting client as {}", args.name);
    info!("Game server: {}", args.server);
    info!("Controls: arrows/WASD to move, Space to drop a bomb, Esc to go back");

    let conf = Conf {
        window_title: "Bomber".to_string(),
        window_width: args.width,
        window_height: args.height,
        window_resizable: true,
        ..Default::default()
    };

    let config = AppConfig {
        server_url: args.server,
        rooms_url: args.rooms_server,
        player_name: args.name,
        room: args.room,
        assets: args.assets,
    };

    macroquad::Window::from_config(conf, async move {
        let mut app = match App::new(config).await {
            Ok(app) => app,
            Err(e) => {
                error!("Failed to start: {}", e);
                return;
            }
        };

        if let Err(e) = app.run().await {
            error!("Client stopped: {}", e);
        }
    });
}
