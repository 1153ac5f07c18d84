//! `userstate`: replay a workspace fixture through the user state.
//!
//! Usage:
//!   userstate --fixture workspace.json [-c userstate.toml]
//!             [--follow BLOCK]... [--unfollow BLOCK]... [--reject-me]
//!
//! Prints the resulting state as JSON, then the workspace users in
//! display order.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use tracing::{info, warn};

use openerp_userstate::fixture::FixtureClient;
use openerp_userstate::{UserStateApp, UserStateConfig};

/// Replay a workspace fixture through the user state.
#[derive(Parser, Debug)]
#[command(name = "userstate", about = "Replay a workspace fixture through the user state")]
struct Cli {
    /// Fixture JSON with `me`, `workspaceUsers` and `userCardSubscriptions`.
    #[arg(long = "fixture")]
    fixture: PathBuf,

    /// Path to config file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Block to follow after loading (repeatable, applied in command-line order).
    #[arg(long = "follow")]
    follow: Vec<String>,

    /// Block to unfollow after loading (repeatable, applied in command-line order).
    #[arg(long = "unfollow")]
    unfollow: Vec<String>,

    /// Fail the current-user fetch, as an expired session would.
    #[arg(long = "reject-me")]
    reject_me: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BlockOp {
    Follow(String),
    Unfollow(String),
}

/// Interleave `--follow` and `--unfollow` values by their position on the
/// command line.
fn block_ops(matches: &ArgMatches, follow: Vec<String>, unfollow: Vec<String>) -> Vec<BlockOp> {
    let mut ops: Vec<(usize, BlockOp)> = Vec::with_capacity(follow.len() + unfollow.len());
    if let Some(indices) = matches.indices_of("follow") {
        ops.extend(indices.zip(follow).map(|(i, id)| (i, BlockOp::Follow(id))));
    }
    if let Some(indices) = matches.indices_of("unfollow") {
        ops.extend(indices.zip(unfollow).map(|(i, id)| (i, BlockOp::Unfollow(id))));
    }
    ops.sort_by_key(|(i, _)| *i);
    ops.into_iter().map(|(_, op)| op).collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;
    let ops = block_ops(&matches, cli.follow, cli.unfollow);

    let config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            UserStateConfig::load(path)?
        }
        None => UserStateConfig::default(),
    };

    let (app, actions) = UserStateApp::new(&config);
    let queue = tokio::spawn(actions.run());

    let client = Arc::new(FixtureClient::new(cli.fixture).reject_me(cli.reject_me));
    info!("Replaying fixture {}", client.path().display());
    let fetch = app.spawn_fetch_me(client.clone());
    let load = app.spawn_initial_load(client);

    fetch.await??;
    if let Err(e) = load.await? {
        warn!("Initial load failed, workspace users left empty: {}", e);
    }

    for op in ops {
        match op {
            BlockOp::Follow(block_id) => app.follow_block(block_id)?,
            BlockOp::Unfollow(block_id) => app.unfollow_block(block_id)?,
        }
    }

    let store = app.store().clone();
    drop(app);
    let applied = queue.await?;
    info!("Applied {} actions", applied);

    let state = store.state();
    println!("{}", serde_json::to_string_pretty(&*state)?);

    for user in store.workspace_users_list().iter() {
        println!("{}\t{}", user.id, user.username);
    }

    Ok(())
}
