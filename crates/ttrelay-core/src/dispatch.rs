//! Inbound event dispatch.
//!
//! The dispatcher sits between the chat transport's receive loop and the
//! router. It applies admission rules (own messages, command prefix,
//! channel membership), answers control commands inline, and offloads each
//! AI completion to its own detached task so a slow provider call for one
//! user never delays message delivery or other users' turnaround.

use crate::chunk::split_message;
use crate::conversation::ConversationId;
use crate::error::Result;
use crate::router::{RouteDecision, Router};
use async_trait::async_trait;
use std::sync::Arc;

/// Whether a message arrived privately or in a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Private,
    Channel,
}

/// One message delivered by the chat transport.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub content: String,
    pub kind: MessageKind,
    /// Account name of the sender.
    pub source_username: String,
    /// Display name of the sender, for logging only.
    pub source_nickname: String,
    /// Channel the sender is currently in, if known.
    pub source_channel_id: Option<u32>,
    /// Channel the message was posted to; `None` for private messages.
    pub channel_id: Option<u32>,
}

/// Where a reply should be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseTarget {
    User(String),
    Channel(u32),
}

/// Outbound side of the chat transport.
///
/// The transport implementation (login, session handling, wire protocol)
/// is external to this crate; the dispatcher only needs to send text that
/// is already chunked to the per-message limit.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, target: ResponseTarget, text: String) -> Result<()>;
}

/// Admission and identity options for the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// The bot's own account name; messages from it are discarded.
    pub bot_username: String,
    /// Channel the bot joined, used for the membership check.
    pub bot_channel_id: Option<u32>,
    /// Prefix required on channel messages, stripped before routing.
    pub command_prefix: String,
    /// When true, users outside the bot's channel get a notice instead of
    /// an answer.
    pub channel_only: bool,
    /// Transport per-message size limit, in characters.
    pub message_limit: usize,
}

/// Receives inbound events and drives the router.
pub struct Dispatcher {
    router: Arc<Router>,
    transport: Arc<dyn ChatTransport>,
    options: DispatchOptions,
}

impl Dispatcher {
    pub fn new(
        router: Arc<Router>,
        transport: Arc<dyn ChatTransport>,
        options: DispatchOptions,
    ) -> Self {
        Self {
            router,
            transport,
            options,
        }
    }

    /// Handles one inbound event.
    ///
    /// Never returns an error: faults are logged and the event is dropped,
    /// so a single bad event cannot take down the receive loop. Control
    /// commands are answered before this returns; AI completions continue
    /// on a detached task with no ordering guarantee across requests.
    pub async fn handle_event(&self, event: InboundEvent) {
        if event.source_username == self.options.bot_username {
            return;
        }

        let raw = event.content.trim();
        let (conversation, target, content) = match event.kind {
            MessageKind::Private => (
                ConversationId::for_user(&event.source_username),
                ResponseTarget::User(event.source_username.clone()),
                raw.to_string(),
            ),
            MessageKind::Channel => {
                let Some(channel_id) = event.channel_id else {
                    tracing::warn!(
                        user = %event.source_username,
                        "dropping channel message without channel id"
                    );
                    return;
                };
                // Channel chatter not addressed to the bot is silently
                // ignored; only prefixed commands are for us.
                let Some(stripped) = raw.strip_prefix(&self.options.command_prefix) else {
                    return;
                };
                (
                    ConversationId::for_channel(channel_id),
                    ResponseTarget::Channel(channel_id),
                    stripped.trim().to_string(),
                )
            }
        };

        tracing::debug!(
            user = %event.source_username,
            nickname = %event.source_nickname,
            conversation = %conversation,
            "message received"
        );

        if self.options.channel_only
            && self.options.bot_channel_id.is_some()
            && event.source_channel_id != self.options.bot_channel_id
        {
            self.send_chunked(
                target,
                "Sorry! You cannot talk to the bot from outside its channel.".to_string(),
            )
            .await;
            return;
        }

        match self.router.route(&conversation, &content).await {
            RouteDecision::Reply(reply) => {
                self.send_chunked(target, reply).await;
            }
            RouteDecision::Completion(backend) => {
                // Fire-and-forget: the receive loop must never wait for a
                // provider. No join handle is kept and in-flight requests
                // are not cancelled on shutdown; a dropped response is an
                // accepted outcome.
                let router = self.router.clone();
                let transport = self.transport.clone();
                let limit = self.options.message_limit;
                tokio::spawn(async move {
                    let answer = router.complete(&conversation, backend, &content).await;
                    send_chunks(transport.as_ref(), target, answer, limit).await;
                });
            }
        }
    }

    async fn send_chunked(&self, target: ResponseTarget, text: String) {
        send_chunks(
            self.transport.as_ref(),
            target,
            text,
            self.options.message_limit,
        )
        .await;
    }
}

async fn send_chunks(
    transport: &dyn ChatTransport,
    target: ResponseTarget,
    text: String,
    limit: usize,
) {
    for chunk in split_message(&text, limit) {
        if let Err(err) = transport.send(target.clone(), chunk).await {
            tracing::error!(error = %err, "failed to send reply chunk");
            return;
        }
    }
}
