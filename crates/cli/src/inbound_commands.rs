//! Replay recorded adapter events through the inbound pipeline.
//!
//! Input is JSON Lines, one [`InboundEvent`] per line (tagged by
//! `platform`), each optionally carrying `delay_ms` to wait before it is
//! pushed. Resulting agent turns are printed to stdout as JSON.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use {
    anyhow::{Context, Result},
    async_trait::async_trait,
    clap::Subcommand,
    serde::Deserialize,
    switchboard_auto_reply::{
        AgentTurn, AgentTurnExecutor, InboundEvent, InboundPipeline, debounce::FlushErrorFn,
    },
    switchboard_config::SwitchboardConfig,
    tracing::{info, warn},
};

#[derive(Subcommand)]
pub enum InboundAction {
    /// Push events from a JSONL file through debouncing and print the turns.
    Replay {
        file: PathBuf,
        /// Ignore recorded delays and push everything at once.
        #[arg(long)]
        no_delay: bool,
    },
}

#[derive(Debug, Deserialize)]
struct ReplayLine {
    #[serde(default)]
    delay_ms: u64,
    #[serde(flatten)]
    event: InboundEvent,
}

struct PrintExecutor;

#[async_trait]
impl AgentTurnExecutor for PrintExecutor {
    async fn execute(&self, turn: AgentTurn) -> Result<()> {
        println!("{}", serde_json::to_string(&turn)?);
        Ok(())
    }
}

pub async fn handle_inbound(action: InboundAction, config: SwitchboardConfig) -> Result<()> {
    match action {
        InboundAction::Replay { file, no_delay } => replay(&file, config, no_delay).await,
    }
}

fn read_replay(path: &Path) -> Result<Vec<ReplayLine>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_replay(&raw)
}

fn parse_replay(raw: &str) -> Result<Vec<ReplayLine>> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).with_context(|| format!("line {}: invalid event", idx + 1))
        })
        .collect()
}

async fn replay(path: &Path, config: SwitchboardConfig, no_delay: bool) -> Result<()> {
    let lines = read_replay(path)?;
    info!(events = lines.len(), path = %path.display(), "replaying inbound events");

    let on_error: FlushErrorFn = Arc::new(|err: anyhow::Error| {
        warn!(error = %err, "agent turn failed");
    });
    let pipeline =
        InboundPipeline::with_error_sink(Arc::new(config), Arc::new(PrintExecutor), Some(on_error));
    for line in lines {
        if !no_delay && line.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(line.delay_ms)).await;
        }
        pipeline.push(line.event);
    }
    pipeline.flush_all().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use {super::*, std::io::Write};

    #[test]
    fn parses_tagged_lines_and_skips_blanks() {
        let raw = r#"
{"platform":"discord","account_id":"default","channel_id":"c1","author_id":"u1","content":"hi"}

{"platform":"telegram","account_id":"bot","chat_id":42,"from_id":42,"text":"yo","delay_ms":250}
"#;
        let lines = parse_replay(raw).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].delay_ms, 0);
        assert!(matches!(lines[0].event, InboundEvent::Discord(_)));
        assert_eq!(lines[1].delay_ms, 250);
        assert!(matches!(lines[1].event, InboundEvent::Telegram(_)));
    }

    #[test]
    fn reports_bad_line_number() {
        let err = parse_replay("{\"platform\":\"irc\"}").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"platform":"slack","team_id":"T1","channel":"C1","user":"U1","text":"x"}}"#
        )
        .unwrap();
        let lines = read_replay(file.path()).unwrap();
        assert!(matches!(lines[0].event, InboundEvent::Slack(_)));
    }
}
