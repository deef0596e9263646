//! Console transport for local development.
//!
//! The real deployment target is a TeamTalk-style chat server, whose
//! transport is an external collaborator. This stand-in feeds stdin lines
//! through the dispatcher as private messages from a single local user and
//! prints replies to stdout, exercising the full routing/session path.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use ttrelay_core::dispatch::{ChatTransport, Dispatcher, InboundEvent, MessageKind, ResponseTarget};
use ttrelay_core::error::Result;

const LOCAL_USER: &str = "local";

pub struct ConsoleTransport;

impl ConsoleTransport {
    pub fn new() -> Self {
        Self
    }

    /// Reads stdin line by line and dispatches each as an inbound event.
    ///
    /// Returns when stdin closes. Replies for in-flight completions keep
    /// arriving asynchronously while the loop waits for the next line.
    pub async fn run_receive_loop(&self, dispatcher: Arc<Dispatcher>) {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let event = InboundEvent {
                        content: line,
                        kind: MessageKind::Private,
                        source_username: LOCAL_USER.to_string(),
                        source_nickname: LOCAL_USER.to_string(),
                        source_channel_id: None,
                        channel_id: None,
                    };
                    dispatcher.handle_event(event).await;
                }
                Ok(None) => break,
                Err(err) => {
                    tracing::error!(error = %err, "failed to read from stdin");
                    break;
                }
            }
        }
    }
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatTransport for ConsoleTransport {
    async fn send(&self, target: ResponseTarget, text: String) -> Result<()> {
        match target {
            ResponseTarget::User(user) => println!("[to {user}] {text}"),
            ResponseTarget::Channel(channel) => println!("[to channel {channel}] {text}"),
        }
        Ok(())
    }
}
