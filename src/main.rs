mod backup;
mod calc;
mod config;
mod error;
mod ipc;
mod marks_file;
mod record;
mod store;

use clap::Parser;
use std::io::{self, BufRead, Write};

fn init_tracing() {
    // stdout carries the protocol; logs go to stderr.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("studentd=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = config::Cli::parse();
    let mut state = ipc::AppState::new(cli.store_options());

    if let Some(path) = cli.data_file.as_deref() {
        match store::StudentStore::open(path, state.defaults) {
            Ok((store, report)) => {
                tracing::info!(path = %path.display(), count = report.count, "opened marks file at startup");
                state.store = Some(store);
            }
            // Not fatal: the caller can still `store.open` another file.
            Err(e) => tracing::error!(path = %path.display(), error = %e, "failed to open marks file"),
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                tracing::warn!(error = %e, "unparseable request line");
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{resp}");
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
