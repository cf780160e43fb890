//! Conversation detail loader
//!
//! Keeps the message history of the selected counterpart. Selecting a
//! counterpart bumps a generation counter; a response is applied only when
//! its counterpart is still selected and its generation is the latest
//! issued. Switching away is the cancellation signal for the old request.

use crate::models::Message;
use crate::{Error, Result};
use tracing::{debug, info, warn};

/// Loading state of the chat pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryStatus {
    /// Nothing selected
    Idle,
    /// A request for the selected counterpart is outstanding
    Loading,
    /// History is displayed
    Ready,
    /// The last load failed; the pane is empty
    Failed(String),
}

/// Tag for one in-flight history request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTicket {
    counterpart_id: String,
    generation: u64,
}

impl HistoryTicket {
    /// Counterpart this request was issued for
    pub fn counterpart_id(&self) -> &str {
        &self.counterpart_id
    }

    /// Generation of the request
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// History of the selected conversation
#[derive(Debug, Clone)]
pub struct HistoryLoader {
    counterpart_id: Option<String>,
    generation: u64,
    messages: Vec<Message>,
    status: HistoryStatus,
}

impl Default for HistoryLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryLoader {
    /// Create a loader with nothing selected
    pub fn new() -> Self {
        Self {
            counterpart_id: None,
            generation: 0,
            messages: Vec::new(),
            status: HistoryStatus::Idle,
        }
    }

    /// Counterpart whose history is shown
    pub fn counterpart_id(&self) -> Option<&str> {
        self.counterpart_id.as_deref()
    }

    /// Displayed messages, oldest first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Current status
    pub fn status(&self) -> &HistoryStatus {
        &self.status
    }

    /// Switch the pane to `counterpart_id` (or to nothing)
    ///
    /// Clears the displayed history. Returns the ticket for the request to
    /// issue, or `None` when nothing is selected. With `known_empty` the
    /// pane is shown as ready right away (a pending conversation); the
    /// request is still issued.
    pub fn select(&mut self, counterpart_id: Option<&str>, known_empty: bool) -> Option<HistoryTicket> {
        self.generation += 1;
        self.messages.clear();

        match counterpart_id {
            None => {
                self.counterpart_id = None;
                self.status = HistoryStatus::Idle;
                None
            }
            Some(id) => {
                self.counterpart_id = Some(id.to_string());
                self.status = if known_empty {
                    HistoryStatus::Ready
                } else {
                    HistoryStatus::Loading
                };
                Some(HistoryTicket {
                    counterpart_id: id.to_string(),
                    generation: self.generation,
                })
            }
        }
    }

    /// Re-issue a request for the current counterpart, keeping what is shown
    pub fn reload(&mut self) -> Option<HistoryTicket> {
        let id = self.counterpart_id.clone()?;
        self.generation += 1;
        if matches!(self.status, HistoryStatus::Failed(_) | HistoryStatus::Idle) {
            self.status = HistoryStatus::Loading;
        }
        Some(HistoryTicket {
            counterpart_id: id,
            generation: self.generation,
        })
    }

    /// Whether `ticket` is still the latest request for the selection
    pub fn is_current(&self, ticket: &HistoryTicket) -> bool {
        self.generation == ticket.generation
            && self.counterpart_id.as_deref() == Some(ticket.counterpart_id.as_str())
    }

    /// Apply the outcome of a request
    ///
    /// Returns the number of messages shown when applied,
    /// `Error::StaleResponse` when the selection moved on, and the original
    /// error when the load failed (the pane is emptied).
    pub fn complete(&mut self, ticket: &HistoryTicket, outcome: Result<Vec<Message>>) -> Result<usize> {
        if !self.is_current(ticket) {
            debug!(
                "Discarding history for {} (generation {}, now {} at {})",
                ticket.counterpart_id,
                ticket.generation,
                self.counterpart_id.as_deref().unwrap_or("nothing"),
                self.generation
            );
            return Err(Error::StaleResponse(format!(
                "history for {} superseded",
                ticket.counterpart_id
            )));
        }

        match outcome {
            Ok(mut messages) => {
                messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
                self.messages = messages;
                self.status = HistoryStatus::Ready;
                info!(
                    "Loaded {} messages with {}",
                    self.messages.len(),
                    ticket.counterpart_id
                );
                Ok(self.messages.len())
            }
            Err(e) => {
                warn!("Failed to load history with {}: {}", ticket.counterpart_id, e);
                self.messages.clear();
                self.status = HistoryStatus::Failed(e.user_message("Failed to load messages"));
                Err(e)
            }
        }
    }
}
