//! Terminal front end: one prompt, one moderated reply, then exit.

mod display;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Context;
use safechat::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::display::ConsoleEventSink;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut stdout = io::stdout();
    display::banner(&mut stdout).context("failed to write banner")?;
    stdout.flush()?;

    let credential = Credential::from_env();
    let client = match CompletionClient::with_reqwest(ClientConfig::default(), credential) {
        Ok(client) => client,
        Err(e) => {
            writeln!(stdout, "Error: {e}")?;
            return Ok(());
        }
    };
    tracing::debug!(has_credential = client.has_credential(), "Client ready");

    let orchestrator = Orchestrator::new(Arc::new(Denylist::default()), Arc::new(client))
        .with_event_sink(Arc::new(ConsoleEventSink::default()));

    let mut reader = StdinLineReader::new();
    let result = orchestrator.run(&mut reader).await;

    display::result(&mut stdout, &result).context("failed to write result")?;
    stdout.flush()?;
    Ok(())
}
