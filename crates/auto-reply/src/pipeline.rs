//! Inbound events in, agent turns out.

use std::{collections::HashMap, sync::Arc};

use {
    anyhow::Context,
    async_trait::async_trait,
    serde::Serialize,
    switchboard_common::ChannelType,
    switchboard_config::SwitchboardConfig,
    switchboard_routing::resolve_session_agent_id,
    switchboard_sessions::SessionKey,
    tracing::{debug, info},
};

#[cfg(feature = "metrics")]
use switchboard_metrics::{counter, inbound as inbound_metrics, labels};

use crate::{
    debounce::{DebounceConfig, FlushErrorFn, InboundDebouncer},
    event::InboundEvent,
    inbound_batch::{DEFAULT_SEPARATOR, summarize_inbound_batch},
    resolve_inbound_debounce_ms,
};

/// One logical agent turn built from a flushed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentTurn {
    pub agent_id: String,
    pub session_key: SessionKey,
    pub channel: ChannelType,
    pub text: String,
    /// Platform message ids in arrival order. Only set for batches of more
    /// than one id.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub message_ids: Vec<String>,
    pub first_message_id: Option<String>,
    pub last_message_id: Option<String>,
    pub mentioned: bool,
    /// Message the reply should thread under.
    pub reply_to: Option<String>,
}

/// Runs an agent turn. Implemented by the gateway's chat service.
#[async_trait]
pub trait AgentTurnExecutor: Send + Sync {
    async fn execute(&self, turn: AgentTurn) -> anyhow::Result<()>;
}

/// Debounces inbound events per platform and hands each batch to an
/// [`AgentTurnExecutor`].
pub struct InboundPipeline {
    debouncers: HashMap<ChannelType, InboundDebouncer<InboundEvent>>,
}

impl InboundPipeline {
    pub fn new(config: Arc<SwitchboardConfig>, executor: Arc<dyn AgentTurnExecutor>) -> Self {
        Self::with_error_sink(config, executor, None)
    }

    /// Like [`InboundPipeline::new`], routing flush failures to `on_error`
    /// instead of the log.
    pub fn with_error_sink(
        config: Arc<SwitchboardConfig>,
        executor: Arc<dyn AgentTurnExecutor>,
        on_error: Option<FlushErrorFn>,
    ) -> Self {
        let debouncers = ChannelType::ALL
            .iter()
            .map(|&channel| {
                let debounce_ms = resolve_inbound_debounce_ms(&config, channel.as_str());
                debug!(%channel, debounce_ms, "inbound debounce window");

                let flush_config = Arc::clone(&config);
                let flush_executor = Arc::clone(&executor);
                let debounce_config = Arc::clone(&config);
                let mut settings = DebounceConfig::new(
                    debounce_ms,
                    Arc::new(InboundEvent::conversation_key),
                    Arc::new(move |events: Vec<InboundEvent>| {
                        let config = Arc::clone(&flush_config);
                        let executor = Arc::clone(&flush_executor);
                        Box::pin(async move {
                            let Some(turn) = build_turn(&config, &events)? else {
                                return Ok(());
                            };
                            info!(
                                session_key = %turn.session_key,
                                entries = events.len(),
                                "dispatching agent turn"
                            );
                            executor.execute(turn).await
                        })
                    }),
                )
                .with_should_debounce(Arc::new(move |event: &InboundEvent| {
                    event.default_should_debounce(&debounce_config)
                }));
                if let Some(on_error) = &on_error {
                    settings = settings.with_on_error(Arc::clone(on_error));
                }
                (channel, InboundDebouncer::new(settings))
            })
            .collect();
        Self { debouncers }
    }

    /// Accept an event from a channel adapter. Must be called from within a
    /// Tokio runtime.
    pub fn push(&self, event: InboundEvent) {
        let channel = event.channel();
        #[cfg(feature = "metrics")]
        counter!(inbound_metrics::EVENTS_TOTAL, labels::CHANNEL => channel.as_str()).increment(1);
        if let Some(debouncer) = self.debouncers.get(&channel) {
            debouncer.enqueue(event);
        }
    }

    /// Deliver everything buffered and wait for in-flight turns.
    pub async fn flush_all(&self) {
        futures::future::join_all(self.debouncers.values().map(|d| d.flush_all())).await;
    }

    /// Conversation keys with buffered or in-flight events.
    pub fn pending_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> =
            self.debouncers.values().flat_map(InboundDebouncer::pending_keys).collect();
        keys.sort();
        keys
    }
}

/// Turn a flushed batch into an [`AgentTurn`]. `Ok(None)` for an empty batch.
///
/// Platform events carry no agent scope, so every inbound turn is owned by
/// the agent a key-less session resolves to: the configured default.
pub fn build_turn(
    config: &SwitchboardConfig,
    events: &[InboundEvent],
) -> anyhow::Result<Option<AgentTurn>> {
    let Some(batch) = summarize_inbound_batch(events, DEFAULT_SEPARATOR) else {
        return Ok(None);
    };
    let last = batch.last;
    let agent_id = resolve_session_agent_id(None, config)?;
    let peer = last
        .peer()
        .with_context(|| format!("{} event has no routable conversation", last.channel()))?;

    let batched = batch.ids.len() > 1;
    Ok(Some(AgentTurn {
        session_key: SessionKey::peer(&agent_id, peer),
        agent_id,
        channel: last.channel(),
        text: batch.combined_text.into_owned(),
        message_ids: if batched {
            batch.ids.iter().map(|id| id.to_string()).collect()
        } else {
            Vec::new()
        },
        first_message_id: batch.first_id.map(str::to_string),
        last_message_id: batch.last_id.map(str::to_string),
        mentioned: batch.any_mentioned,
        reply_to: batch.last_id.map(str::to_string),
    }))
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::event::{DiscordInbound, SlackInbound, TelegramInbound},
        std::time::Duration,
        switchboard_config::AgentConfig,
        tokio::sync::mpsc,
    };

    struct ChannelExecutor(mpsc::UnboundedSender<AgentTurn>);

    #[async_trait]
    impl AgentTurnExecutor for ChannelExecutor {
        async fn execute(&self, turn: AgentTurn) -> anyhow::Result<()> {
            let _ = self.0.send(turn);
            Ok(())
        }
    }

    fn config() -> SwitchboardConfig {
        let mut cfg = SwitchboardConfig::default();
        cfg.agents.list.push(AgentConfig::new("Main"));
        cfg.messages.inbound.debounce_ms = 500;
        cfg
    }

    fn discord(id: &str, content: &str) -> InboundEvent {
        InboundEvent::Discord(DiscordInbound {
            account_id: "default".into(),
            channel_id: Some("chan456".into()),
            guild_id: Some("g".into()),
            author_id: Some("user123".into()),
            message_id: Some(id.into()),
            content: content.into(),
            ..Default::default()
        })
    }

    #[test]
    fn single_event_turn_has_no_id_list() {
        let turn = build_turn(&config(), &[discord("m1", "hello")]).unwrap().unwrap();
        assert_eq!(turn.agent_id, "main");
        assert_eq!(turn.session_key.as_str(), "agent:main:discord:channel:chan456");
        assert_eq!(turn.text, "hello");
        assert!(turn.message_ids.is_empty());
        assert_eq!(turn.reply_to.as_deref(), Some("m1"));
    }

    #[test]
    fn batch_turn_lists_ids() {
        let events = [discord("m1", "a"), discord("m2", "b")];
        let turn = build_turn(&config(), &events).unwrap().unwrap();
        assert_eq!(turn.text, "a\nb");
        assert_eq!(turn.message_ids, ["m1", "m2"]);
        assert_eq!(turn.first_message_id.as_deref(), Some("m1"));
        assert_eq!(turn.last_message_id.as_deref(), Some("m2"));
    }

    #[test]
    fn unroutable_event_is_an_error() {
        let event = InboundEvent::Telegram(TelegramInbound {
            account_id: "bot".into(),
            text: Some("hi".into()),
            ..Default::default()
        });
        assert!(build_turn(&config(), &[event]).is_err());
        assert!(build_turn(&SwitchboardConfig::default(), &[discord("m", "x")]).is_err());
    }

    #[test]
    fn turn_goes_to_the_flagged_default_agent() {
        let mut cfg = config();
        let mut ops = AgentConfig::new(" Ops ");
        ops.default = true;
        cfg.agents.list.push(ops);

        let turn = build_turn(&cfg, &[discord("m1", "hi")]).unwrap().unwrap();
        assert_eq!(turn.agent_id, "ops");
        assert_eq!(turn.session_key.as_str(), "agent:ops:discord:channel:chan456");
    }

    #[tokio::test(start_paused = true)]
    async fn burst_becomes_one_turn() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let pipeline = InboundPipeline::new(Arc::new(config()), Arc::new(ChannelExecutor(tx)));

        pipeline.push(discord("m1", "part one"));
        tokio::time::sleep(Duration::from_millis(100)).await;
        pipeline.push(discord("m2", "part two"));
        assert_eq!(pipeline.pending_keys(), ["discord:default:chan456:user123"]);

        let turn = rx.recv().await.unwrap();
        assert_eq!(turn.text, "part one\npart two");
        assert_eq!(turn.message_ids, ["m1", "m2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn control_command_is_its_own_turn() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let pipeline = InboundPipeline::new(Arc::new(config()), Arc::new(ChannelExecutor(tx)));

        pipeline.push(discord("m1", "draft"));
        pipeline.push(discord("m2", "/reset"));
        pipeline.flush_all().await;

        assert_eq!(rx.recv().await.unwrap().text, "draft");
        assert_eq!(rx.recv().await.unwrap().text, "/reset");
        assert!(pipeline.pending_keys().is_empty());
    }

    fn drain_turns(rx: &mut mpsc::UnboundedReceiver<AgentTurn>) -> Vec<AgentTurn> {
        let mut turns = Vec::new();
        while let Ok(turn) = rx.try_recv() {
            turns.push(turn);
        }
        turns.sort_by(|a, b| a.session_key.cmp(&b.session_key));
        turns
    }

    #[tokio::test(start_paused = true)]
    async fn slack_threads_batch_separately() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let pipeline = InboundPipeline::new(Arc::new(config()), Arc::new(ChannelExecutor(tx)));
        let slack = |thread: &str, text: &str| {
            InboundEvent::Slack(SlackInbound {
                team_id: "T1".into(),
                channel: Some("C1".into()),
                channel_type: Some("channel".into()),
                user: Some("U1".into()),
                thread_ts: Some(thread.into()),
                text: text.into(),
                ..Default::default()
            })
        };

        pipeline.push(slack("1800.1", "thread A"));
        pipeline.push(slack("1800.2", "thread B"));
        assert_eq!(pipeline.pending_keys().len(), 2);
        pipeline.flush_all().await;

        let turns = drain_turns(&mut rx);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].session_key.as_str(), "agent:main:slack:channel:C1:thread:1800.1");
        assert_eq!(turns[0].text, "thread A");
        assert_eq!(turns[1].session_key.as_str(), "agent:main:slack:channel:C1:thread:1800.2");
        assert_eq!(turns[1].text, "thread B");
    }

    #[tokio::test(start_paused = true)]
    async fn telegram_topics_batch_separately() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let pipeline = InboundPipeline::new(Arc::new(config()), Arc::new(ChannelExecutor(tx)));
        let topic = |thread: i64, text: &str| {
            InboundEvent::Telegram(TelegramInbound {
                account_id: "bot".into(),
                chat_id: Some(-100123),
                from_id: Some(5),
                message_thread_id: Some(thread),
                text: Some(text.into()),
                ..Default::default()
            })
        };

        pipeline.push(topic(1, "for topic one"));
        pipeline.push(topic(2, "for topic two"));
        pipeline.flush_all().await;

        let turns = drain_turns(&mut rx);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].session_key.as_str(), "agent:main:telegram:group:-100123:thread:1");
        assert_eq!(turns[0].text, "for topic one");
        assert_eq!(turns[1].session_key.as_str(), "agent:main:telegram:group:-100123:thread:2");
        assert_eq!(turns[1].text, "for topic two");
    }
}
