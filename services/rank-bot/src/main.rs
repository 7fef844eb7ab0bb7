//! Monetary leaderboard bot.
//!
//! Runs one leaderboard command against a JSON snapshot of the ledger,
//! identity and binding records, replying on stdout (text) or into the
//! output directory (images).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rank_bot::{BotConfig, ConsoleSender, RankService, Session};
use renderer::{AssetIndex, FontMeasurer, RasterPageRenderer};
use storage::{AvatarFetcher, IdentityUpdate, MemoryStore, ObservedMessage, Snapshot};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "rank-bot")]
#[command(about = "Monetary leaderboard for chat communities")]
struct Args {
    /// Configuration file
    #[arg(short, long, env = "RANK_BOT_CONFIG", default_value = "config/rank-bot.yaml")]
    config: PathBuf,

    /// JSON snapshot of balances, identities and bindings
    #[arg(long, env = "RANK_BOT_SNAPSHOT", default_value = "data/monetary.json")]
    snapshot: PathBuf,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Invoking user id
    #[arg(long, env = "RANK_BOT_USER", default_value = "console")]
    user: String,

    /// Invoking user name
    #[arg(long, default_value = "console")]
    user_name: String,

    /// Channel the command was sent in
    #[arg(long, env = "RANK_BOT_CHANNEL", default_value = "console")]
    channel: String,

    /// Chat platform
    #[arg(long, env = "RANK_BOT_PLATFORM", default_value = "console")]
    platform: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Leaderboard of the current channel
    ChannelRank {
        /// Number of rows
        #[arg(allow_negative_numbers = true)]
        size: Option<f64>,
    },
    /// Leaderboard across all channels
    GlobalRank {
        /// Number of rows
        #[arg(allow_negative_numbers = true)]
        size: Option<f64>,
    },
    /// Currency balance of a user
    Balance {
        /// Target user id (defaults to the invoking user)
        #[arg(long)]
        target: Option<String>,
        /// Target display name
        #[arg(long)]
        target_name: Option<String>,
        /// Currency kind
        #[arg(short, long)]
        currency: Option<String>,
    },
    /// Record the invoking user's name and avatar
    Observe {
        #[arg(long)]
        nick: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_font(config: &BotConfig) -> Option<FontMeasurer> {
    let path = config.font_path.as_ref()?;
    match FontMeasurer::from_file(path) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Font unavailable, image replies will fall back to text");
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs);

    let config = BotConfig::load_or_default(&args.config)?;
    info!(config = %args.config.display(), "Starting rank bot");

    let snapshot = if args.snapshot.exists() {
        Snapshot::load(&args.snapshot)
            .with_context(|| format!("Failed to load snapshot {:?}", args.snapshot))?
    } else {
        warn!(path = %args.snapshot.display(), "Snapshot not found, starting empty");
        Snapshot::default()
    };
    let store = Arc::new(MemoryStore::from_snapshot(snapshot));

    let assets = Arc::new(AssetIndex::from_root(config.asset_root()));
    let avatars = AvatarFetcher::new(config.avatar_timeout())?;
    let renderer = Arc::new(RasterPageRenderer::new(load_font(&config)));

    let service = RankService {
        config: config.rank.clone(),
        ledger: store.clone(),
        identities: store.clone(),
        bindings: store.clone(),
        assets,
        avatars,
        renderer,
        sender: Arc::new(ConsoleSender::new(&config.output_dir)),
    };

    let session = Session {
        user_id: args.user.clone(),
        user_name: args.user_name.clone(),
        channel_id: args.channel.clone(),
        platform: args.platform.clone(),
    };

    match args.command {
        Command::ChannelRank { size } => service.channel_rank(&session, size).await?,
        Command::GlobalRank { size } => service.global_rank(&session, size).await?,
        Command::Balance {
            target,
            target_name,
            currency,
        } => {
            let target = target.map(|id| {
                let name = target_name.unwrap_or_else(|| id.clone());
                (id, name)
            });
            service.balance(&session, target, currency).await?
        }
        Command::Observe { nick, avatar } => {
            let message = ObservedMessage {
                user_id: session.user_id.clone(),
                channel_id: session.channel_id.clone(),
                platform: session.platform.clone(),
                nick,
                name: Some(session.user_name.clone()),
                avatar,
            };
            match service.observe(&message).await? {
                IdentityUpdate::Created(_) | IdentityUpdate::Updated(_) => {
                    store
                        .snapshot()
                        .await
                        .save(&args.snapshot)
                        .with_context(|| format!("Failed to save snapshot {:?}", args.snapshot))?;
                    info!(path = %args.snapshot.display(), "Snapshot saved");
                }
                IdentityUpdate::Unchanged | IdentityUpdate::NoBinding => {}
            }
        }
    }

    Ok(())
}
