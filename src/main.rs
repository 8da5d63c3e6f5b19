use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use snapboard::client::api::HttpSnapshotStore;
use snapboard::client::events::SaveRequests;
use snapboard::client::memory::MemorySnapshotStore;
use snapboard::client::notify::TracingNotifier;
use snapboard::client::ui::UiStore;
use snapboard::client::{BoardDeps, BoardSession, BoardSource, CoordinatorError, EmptyBoard, SnapshotStore, StoreError};
use snapboard::config::{ApiConfig, CoordinatorConfig, DEFAULT_API_BASE_URL};
use snapboard::server::{self, ServerError};
use tokio::io::AsyncBufReadExt;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error("snapshot store error: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "snapboard", about = "Board snapshot store and autosave coordinator")]
struct Cli {
    #[arg(long, env = "SNAPSHOT_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the snapshot store server.
    Serve {
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
        #[arg(long, env = "PORT", default_value_t = 3000)]
        port: u16,
    },
    /// Mount a board session; each stdin line requests a manual save.
    Watch(WatchArgs),
    /// Print the snapshot list for a project.
    List { project_id: String },
    /// Print one snapshot with its payload.
    Show { project_id: String, snapshot_id: String },
}

#[derive(Args, Debug)]
struct WatchArgs {
    project_id: String,
    /// Keep snapshots in memory instead of calling the store server.
    #[arg(long)]
    offline: bool,
    /// JSON file re-read on every save as the board payload.
    #[arg(long)]
    board: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let api = ApiConfig::with_base_url(cli.base_url);

    match cli.command {
        Command::Serve { database_url, port } => server::serve(&database_url, port).await?,
        Command::Watch(args) => run_watch(&api, args).await?,
        Command::List { project_id } => {
            let store = HttpSnapshotStore::new(&api)?;
            print_json(&store.list_snapshots(&project_id).await?)?;
        }
        Command::Show { project_id, snapshot_id } => {
            let store = HttpSnapshotStore::new(&api)?;
            print_json(&store.get_snapshot(&project_id, &snapshot_id).await?)?;
        }
    }
    Ok(())
}

async fn run_watch(api: &ApiConfig, args: WatchArgs) -> Result<(), CliError> {
    let store: Arc<dyn SnapshotStore> = if args.offline {
        Arc::new(MemorySnapshotStore::new())
    } else {
        Arc::new(HttpSnapshotStore::new(api)?)
    };
    let board: Arc<dyn BoardSource> = match args.board {
        Some(path) => Arc::new(FileBoard { path }),
        None => Arc::new(EmptyBoard),
    };
    let ui = UiStore::new();
    let requests = SaveRequests::new();
    spawn_status_logger(&ui);

    let deps = BoardDeps {
        store,
        notifier: Arc::new(TracingNotifier),
        ui,
        requests: requests.clone(),
        board,
    };
    let session = BoardSession::start(args.project_id, CoordinatorConfig::from_env(), deps).await?;
    info!(project_id = session.project_id(), version = session.current_version(), "watching board; press enter to save");

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(_)) => {
                    requests.request();
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "stdin read failed");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    let state = session.state();
    session.close().await;
    for line in &state.recent_saves {
        println!("{line}");
    }
    println!("current version: {}", state.current_version);
    Ok(())
}

fn spawn_status_logger(ui: &UiStore) {
    let mut rx = ui.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            info!(
                saving = state.board_saving,
                version = state.board_version,
                last_saved_at = state.board_last_saved_at,
                degraded = state.board_save_degraded,
                "board status"
            );
        }
    });
}

/// Board payload read from a JSON file at save time.
struct FileBoard {
    path: PathBuf,
}

impl BoardSource for FileBoard {
    /// Captures run on save tasks, so the read is handed off with
    /// `block_in_place` to keep the worker free for other tasks.
    fn capture(&self) -> serde_json::Value {
        let parsed = tokio::task::block_in_place(|| std::fs::read_to_string(&self.path))
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()));
        match parsed {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "board file unreadable; saving empty board");
                serde_json::json!({})
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_board_missing_file_captures_empty_object() {
        let board = FileBoard { path: PathBuf::from("/nonexistent/snapboard/board.json") };
        assert_eq!(board.capture(), serde_json::json!({}));
    }

    #[test]
    fn file_board_reads_json() {
        let path = std::env::temp_dir().join(format!("snapboard-board-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"shapes":[{"kind":"sticky"}]}"#).unwrap();
        let board = FileBoard { path: path.clone() };
        assert_eq!(board.capture()["shapes"][0]["kind"], "sticky");
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn file_board_captures_from_spawned_task() {
        let path = std::env::temp_dir().join(format!("snapboard-task-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"version":3}"#).unwrap();
        let board = Arc::new(FileBoard { path: path.clone() });
        let captured = tokio::spawn({
            let board = Arc::clone(&board);
            async move { board.capture() }
        })
        .await
        .unwrap();
        assert_eq!(captured["version"], 3);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn cli_parses_watch_offline() {
        let cli = Cli::try_parse_from(["snapboard", "watch", "proj-1", "--offline"]).unwrap();
        match cli.command {
            Command::Watch(args) => {
                assert_eq!(args.project_id, "proj-1");
                assert!(args.offline);
                assert!(args.board.is_none());
            }
            other => panic!("expected watch, got {other:?}"),
        }
    }
}
