//! dialog-bot: echo bot built with dialog-client.
//!
//! # Setup
//! ```sh
//! DIALOG_BOT_TOKEN=... DIALOG_ENDPOINT=127.0.0.1:8443 \
//! DIALOG_PEERS=user:1001:555,group:7:42 cargo run -p dialog-bot
//! ```
//!
//! `DIALOG_PEERS` seeds the peer directory; updates from peers it does not
//! know are dropped.

use std::sync::Arc;

use chrono::Utc;
use dialog_client::wire::enums::PeerType;
use dialog_client::wire::types::OutPeer;
use dialog_client::{
    Client, Config, Content, FramedChannel, Message, PeerDirectory, StaticToken, Transport,
};

const DEFAULT_ENDPOINT: &str = "127.0.0.1:8443";

#[tokio::main]
async fn main() {
    if std::env::var("RUST_LOG").is_err() {
        unsafe { std::env::set_var("RUST_LOG", "dialog_client=info,dialog_bot=info"); }
    }
    env_logger::init();
    if let Err(e) = run().await {
        eprintln!("✗ {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let token = std::env::var("DIALOG_BOT_TOKEN")
        .map_err(|_| "DIALOG_BOT_TOKEN is not set")?;
    let endpoint = std::env::var("DIALOG_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_owned());

    let directory = PeerDirectory::new();
    if let Ok(spec) = std::env::var("DIALOG_PEERS") {
        directory.remember_all(parse_peers(&spec)?);
    }

    println!("🔌 Connecting to {endpoint}…");
    let (channel, updates) = FramedChannel::connect(&endpoint).await?;

    let client = Client::start(Config::default(), Transport {
        channel:  Arc::new(channel),
        tokens:   Arc::new(StaticToken::new(token)),
        resolver: Arc::new(directory),
        updates,
    })?;

    let replies = client.clone();
    client.on_message(move |msg| {
        let client = replies.clone();
        tokio::spawn(async move { dispatch(msg, client).await });
    });

    println!("👂 Listening for messages… (Ctrl+C to quit)\n");
    tokio::signal::ctrl_c().await?;
    client.clear_listener();
    println!("👋 Bye");
    Ok(())
}

// ─── Dispatcher ───────────────────────────────────────────────────────────────

async fn dispatch(msg: Message, client: Client) {
    let reply = match &msg.content {
        Content::Document(doc) => {
            match client.get_file_url(&doc.file).await {
                Ok(url) => tracing::info!("received {} → {} (valid {:?})", doc.name, url.url, url.timeout),
                Err(e)  => tracing::warn!("no url for {}: {e}", doc.name),
            }
            "File Received.".to_owned()
        }
        _ if msg.text.trim() == "/time" => {
            Utc::now().format("🕐 %Y-%m-%d %H:%M:%S UTC").to_string()
        }
        _ => format!("Echo: {}", msg.text),
    };

    if let Err(e) = client.send_text(&msg.peer, reply, None).await {
        tracing::warn!("reply to {:?} failed: {e}", msg.peer);
    }
}

// ─── Config helpers ───────────────────────────────────────────────────────────

/// Parse `kind:id:access_hash` entries separated by commas.
fn parse_peers(spec: &str) -> Result<Vec<OutPeer>, String> {
    spec.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let mut parts = entry.split(':');
            let (Some(kind), Some(id), Some(hash), None) =
                (parts.next(), parts.next(), parts.next(), parts.next())
            else {
                return Err(format!("bad peer entry {entry:?}, expected kind:id:access_hash"));
            };
            let kind = match kind {
                "user"    => PeerType::Private,
                "group"   => PeerType::Group,
                "channel" => PeerType::Channel,
                other     => return Err(format!("unknown peer kind {other:?}")),
            };
            let id = id.parse().map_err(|_| format!("bad peer id in {entry:?}"))?;
            let access_hash = hash.parse().map_err(|_| format!("bad access hash in {entry:?}"))?;
            Ok(OutPeer { kind, id, access_hash })
        })
        .collect()
}
