//! Run the configured source through the pipeline and dump the result to a
//! JSON file, asking before each new iteration.
//!
//! Usage: `scrape_once [output.json]` (defaults to `events.json`).

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use live_events::config::EventsConfig;
use live_events::events::{self, providers, time::SystemClock};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let out_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "events.json".to_string());
    let cfg = EventsConfig::load_default()?;
    let source = providers::from_config(&cfg)?;

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        match events::run_once(source.as_ref(), &SystemClock).await {
            Ok(list) => {
                let json = serde_json::to_string_pretty(&list)?;
                tokio::fs::write(&out_path, json)
                    .await
                    .with_context(|| format!("writing {out_path}"))?;
                println!("{} events written to {out_path}", list.len());
            }
            Err(e) => eprintln!("{}: {e}", e.summary()),
        }

        stdout.write_all(b"Continue? (y/n): ").await?;
        stdout.flush().await?;
        let answer = stdin.next_line().await?.unwrap_or_default();
        if !matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "s" | "yes") {
            break;
        }
    }

    println!("done");
    Ok(())
}
