//! Conversation summary store
//!
//! Holds one summary per counterpart, most recent activity first. Every
//! refresh replaces the whole list. Refreshes may race (poller, manual,
//! post-send); each dispatch takes a ticket and a completion is applied only
//! when its ticket is newer than the last one applied, so an older response
//! can never overwrite a newer one.

use crate::models::Conversation;
use crate::{Error, Result};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Tag for one in-flight refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    /// Sequence number of the dispatch
    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// Local read-through cache of conversation summaries
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    last_issued: u64,
    last_applied: u64,
    in_flight: usize,
    error: Option<String>,
    loaded: bool,
}

impl ConversationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Current summaries, most recent activity first
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Summary for one counterpart
    pub fn get(&self, counterpart_id: &str) -> Option<&Conversation> {
        self.conversations
            .iter()
            .find(|c| c.counterpart_id() == counterpart_id)
    }

    /// Number of conversations
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    /// Whether the store holds no conversations
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Error from the last relevant failed refresh, if not yet recovered
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether at least one refresh has been applied
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether any refresh is outstanding
    pub fn is_refreshing(&self) -> bool {
        self.in_flight > 0
    }

    /// Sum of unread counts across conversations
    pub fn total_unread(&self) -> u32 {
        self.conversations.iter().map(|c| c.unread_count).sum()
    }

    /// Register a new dispatch and return its ticket
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.last_issued += 1;
        self.in_flight += 1;
        RefreshTicket(self.last_issued)
    }

    /// Apply the outcome of a dispatch
    ///
    /// Returns the new list length when applied. Returns
    /// `Error::StaleResponse` when a newer dispatch was already applied, and
    /// the original error when the refresh failed (the list is kept).
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        outcome: Result<Vec<Conversation>>,
    ) -> Result<usize> {
        self.in_flight = self.in_flight.saturating_sub(1);

        if ticket.0 <= self.last_applied {
            debug!(
                "Discarding refresh #{} (already applied #{})",
                ticket.0, self.last_applied
            );
            return Err(Error::StaleResponse(format!(
                "conversation refresh #{} superseded by #{}",
                ticket.0, self.last_applied
            )));
        }

        match outcome {
            Ok(conversations) => {
                self.conversations = normalize(conversations);
                self.last_applied = ticket.0;
                self.error = None;
                self.loaded = true;
                info!(
                    "Applied refresh #{}: {} conversations",
                    ticket.0,
                    self.conversations.len()
                );
                Ok(self.conversations.len())
            }
            Err(e) => {
                warn!("Refresh #{} failed, keeping {} conversations: {}", ticket.0, self.conversations.len(), e);
                self.error = Some(e.user_message("Failed to load conversations"));
                Err(e)
            }
        }
    }
}

/// Deduplicate by counterpart and order by last activity, newest first
pub fn normalize(conversations: Vec<Conversation>) -> Vec<Conversation> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Conversation> = conversations
        .into_iter()
        .filter(|c| seen.insert(c.counterpart_id().to_string()))
        .collect();

    // Stable: ties keep server order; conversations without messages go last
    unique.sort_by(|a, b| b.last_activity().cmp(&a.last_activity()));
    unique
}

