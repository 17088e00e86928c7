//! Message Router
//!
//! Validates posted messages and decides which stored messages a
//! participant may read.

use crate::chat::presence::PresenceRegistry;
use crate::core::clock::{wall_clock_time, Clock};
use crate::core::error::{Error, Result};
use crate::core::models::Message;
use crate::core::store::{MessageFilter, MessageStore};
use crate::core::validation::{ensure, validate_limit, validate_message, validate_requester};
use std::sync::Arc;
use tracing::info;

pub struct MessageRouter {
    presence: Arc<PresenceRegistry>,
    messages: Arc<dyn MessageStore>,
    clock: Arc<dyn Clock>,
}

/// Filter selecting what `requester` is allowed to see
pub fn visibility_filter(requester: &str) -> MessageFilter {
    MessageFilter::VisibleTo(requester.to_string())
}

impl MessageRouter {
    pub fn new(
        presence: Arc<PresenceRegistry>,
        messages: Arc<dyn MessageStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            presence,
            messages,
            clock,
        }
    }

    /// Store a message from `sender`.
    ///
    /// Shape is checked before the sender lookup, and nothing is written
    /// unless both pass. `from` is the name held by the registry.
    pub async fn post(
        &self,
        sender: &str,
        to: &str,
        text: &str,
        message_type: &str,
    ) -> Result<Message> {
        let message_type = validate_message(to, text, message_type).map_err(Error::InvalidInput)?;

        let participant = self
            .presence
            .lookup(sender)
            .await?
            .ok_or_else(|| Error::Unauthorized(sender.to_string()))?;

        let message = Message {
            from: participant.name,
            to: to.to_string(),
            text: text.to_string(),
            message_type,
            time: wall_clock_time(self.clock.now()),
        };
        self.messages.insert(message.clone()).await?;

        info!(
            "[Messages] {} -> {} ({})",
            message.from, message.to, message.message_type
        );
        Ok(message)
    }

    /// Messages visible to `requester`, oldest first, at most `limit`
    pub async fn query(&self, requester: &str, limit: Option<&str>) -> Result<Vec<Message>> {
        let mut violations = validate_requester(requester);
        let limit = match validate_limit(limit) {
            Ok(limit) => limit,
            Err(violation) => {
                violations.push(violation);
                None
            }
        };
        ensure(violations)?;

        Ok(self
            .messages
            .query(&visibility_filter(requester), limit)
            .await?)
    }
}
