//! Messaging view coordinator
//!
//! [`MessagingView`] is the single public surface of the messaging core. It
//! owns the conversation store, the selected conversation's history and the
//! composer for one mounted view, and drives them from user actions and the
//! poller. State sits behind one async mutex that is never held across a
//! network call; every response is matched against its request tag before
//! it is applied.

use crate::messaging::composer::{self, Composer};
use crate::messaging::contacts::{ContactDirectory, ContactListing};
use crate::messaging::conversations::ConversationStore;
use crate::messaging::history::{HistoryLoader, HistoryStatus, HistoryTicket};
use crate::messaging::poller::Poller;
use crate::models::{Conversation, Message, Selection, User};
use crate::session::Session;
use crate::settings::Settings;
use crate::transport::ApiClient;
use crate::{Error, Result, ValidationError};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Whether the conversation list has entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    /// No conversations yet (the UI offers "Start New Chat")
    Empty,
    /// At least one conversation
    Populated,
}

/// What the messaging view is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewPhase {
    /// Initial contacts and conversations are being fetched
    Loading,
    /// The contact picker is open
    ContactPicker,
    /// The conversation list is shown, nothing selected
    ConversationList(ListState),
    /// A conversation is open; carries the chat pane status
    ConversationSelected(HistoryStatus),
    /// Nothing could be loaded; recovers on the next successful action
    Error(String),
}

/// Copy of the view state for rendering and assertions
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    /// Current phase
    pub phase: ViewPhase,
    /// Conversation summaries, most recent activity first
    pub conversations: Vec<Conversation>,
    /// Non-blocking notice from the last failed list refresh
    pub list_error: Option<String>,
    /// Addressable contacts
    pub contacts: Vec<User>,
    /// Non-fatal directory warning
    pub contacts_warning: Option<String>,
    /// Selected conversation
    pub selection: Option<Selection>,
    /// History of the selected conversation, oldest first
    pub history: Vec<Message>,
    /// Composer draft
    pub draft: String,
    /// Inline composer error
    pub composer_error: Option<String>,
    /// Whether a send is in flight
    pub sending: bool,
    /// Whether the send action is available
    pub can_submit: bool,
    /// Whether a conversation refresh is outstanding
    pub refreshing: bool,
    /// Unread messages across all conversations
    pub total_unread: u32,
}

impl ViewSnapshot {
    /// Whether the list pane should offer to start a new chat
    pub fn offers_new_chat(&self) -> bool {
        self.phase != ViewPhase::Loading && self.conversations.is_empty()
    }
}

struct ViewState {
    loading: bool,
    picker_open: bool,
    contacts: ContactListing,
    store: ConversationStore,
    selection: Option<Selection>,
    history: HistoryLoader,
    composer: Composer,
}

impl ViewState {
    fn new() -> Self {
        Self {
            loading: true,
            picker_open: false,
            contacts: ContactListing::default(),
            store: ConversationStore::new(),
            selection: None,
            history: HistoryLoader::new(),
            composer: Composer::new(),
        }
    }

    fn phase(&self) -> ViewPhase {
        if self.loading {
            return ViewPhase::Loading;
        }
        if self.picker_open {
            return ViewPhase::ContactPicker;
        }
        if self.selection.is_some() {
            return ViewPhase::ConversationSelected(self.history.status().clone());
        }
        if self.store.is_empty() {
            return match self.store.error() {
                Some(e) => ViewPhase::Error(e.to_string()),
                None => ViewPhase::ConversationList(ListState::Empty),
            };
        }
        ViewPhase::ConversationList(ListState::Populated)
    }

    fn selected_id(&self) -> Option<&str> {
        self.selection.as_ref().map(Selection::counterpart_id)
    }

    /// Switch the selection and return the history request to issue
    fn apply_selection(&mut self, selection: Option<Selection>) -> Option<HistoryTicket> {
        let next_id = selection.as_ref().map(Selection::counterpart_id);
        if self.selected_id() != next_id {
            self.composer.clear();
        }

        let known_empty = selection.as_ref().is_some_and(Selection::is_pending);
        let ticket = self.history.select(next_id, known_empty);
        self.selection = selection;
        self.picker_open = false;
        ticket
    }

    /// Bring the selection in line with the freshly applied store
    fn reconcile_selection(&mut self) {
        let Some(selection) = &self.selection else {
            return;
        };
        let Some(conversation) = self.store.get(selection.counterpart_id()) else {
            return;
        };
        if selection.is_pending() {
            info!("Conversation with {} confirmed by server", conversation.counterpart_id());
        }
        self.selection = Some(Selection::Confirmed(conversation.clone()));
    }

    fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            phase: self.phase(),
            conversations: self.store.conversations().to_vec(),
            list_error: self.store.error().map(str::to_string),
            contacts: self.contacts.contacts.clone(),
            contacts_warning: self.contacts.warning.clone(),
            selection: self.selection.clone(),
            history: self.history.messages().to_vec(),
            draft: self.composer.draft().to_string(),
            composer_error: self.composer.error().map(str::to_string),
            sending: self.composer.is_sending(),
            can_submit: self.selection.is_some() && self.composer.can_submit(),
            refreshing: self.store.is_refreshing(),
            total_unread: self.store.total_unread(),
        }
    }
}

/// State shared between the view handle and its poller
struct ViewShared {
    api: ApiClient,
    session: Session,
    settings: Settings,
    directory: ContactDirectory,
    state: Mutex<ViewState>,
}

impl ViewShared {
    /// Run `work` on its own task and wait for it
    ///
    /// The task keeps running when the caller is cancelled, so every ticket
    /// and send flag taken inside it is settled.
    async fn detached<T, F, Fut>(self: &Arc<Self>, what: &str, work: F) -> Result<T>
    where
        F: FnOnce(Arc<Self>) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        match tokio::spawn(work(Arc::clone(self))).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(Error::transport(format!("{} was cancelled: {}", what, e))),
        }
    }

    async fn refresh_conversations(self: &Arc<Self>) -> Result<()> {
        self.detached("conversation refresh", |shared| async move {
            shared.run_refresh().await
        })
        .await
    }

    async fn select(self: &Arc<Self>, selection: Selection) -> Result<()> {
        self.detached("history load", move |shared| async move {
            shared.run_select(selection).await
        })
        .await
    }

    async fn submit(self: &Arc<Self>) -> Result<Message> {
        self.detached("send", |shared| async move { shared.run_submit().await })
            .await
    }

    async fn run_refresh(&self) -> Result<()> {
        let ticket = self.state.lock().await.store.begin_refresh();
        debug!("Refreshing conversations (#{})", ticket.seq());

        let outcome = self.api.fetch_conversations().await;

        let mut state = self.state.lock().await;
        match state.store.complete_refresh(ticket, outcome) {
            Ok(_) => {
                state.reconcile_selection();
                Ok(())
            }
            Err(e) if e.is_stale() => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn reload_contacts(&self) {
        let listing = self.directory.list_contacts(&self.session).await;
        self.state.lock().await.contacts = listing;
    }

    async fn load_history(&self, ticket: HistoryTicket) -> Result<()> {
        let outcome = self.api.fetch_history(ticket.counterpart_id()).await;

        let had_unread = {
            let mut state = self.state.lock().await;
            match state.history.complete(&ticket, outcome) {
                Ok(_) => state.selection.as_ref().is_some_and(|s| s.unread_count() > 0),
                Err(e) if e.is_stale() => return Ok(()),
                Err(e) => return Err(e),
            }
        };

        // The backend marks messages read on fetch; pick up the new counts
        if had_unread {
            if let Err(e) = self.run_refresh().await {
                warn!("Failed to refresh unread counts: {}", e);
            }
        }
        Ok(())
    }

    async fn run_select(&self, selection: Selection) -> Result<()> {
        let ticket = self.state.lock().await.apply_selection(Some(selection));
        match ticket {
            Some(ticket) => {
                info!("Opened conversation with {}", ticket.counterpart_id());
                self.load_history(ticket).await
            }
            None => Ok(()),
        }
    }

    async fn clear_selection(&self) {
        let mut state = self.state.lock().await;
        if state.selection.is_some() {
            info!("Conversation closed");
        }
        // Nothing selected, so no history request is issued
        state.apply_selection(None);
    }

    async fn run_submit(&self) -> Result<Message> {
        let (counterpart_id, content) = {
            let mut state = self.state.lock().await;
            let counterpart_id = state.selected_id().map(str::to_string);
            let content = state.composer.begin_send(
                counterpart_id.as_deref(),
                self.session.user_id(),
                self.settings.max_message_length,
            )?;
            match counterpart_id {
                Some(id) => (id, content),
                None => return Err(ValidationError::NoConversationSelected.into()),
            }
        };

        let outcome = composer::send_message(
            &self.api,
            &self.session,
            &counterpart_id,
            &content,
            self.settings.max_message_length,
        )
        .await;

        let history_ticket = {
            let mut state = self.state.lock().await;
            let still_selected = state.selected_id() == Some(counterpart_id.as_str());
            state.composer.finish_send(&outcome, still_selected);
            if outcome.is_ok() && still_selected {
                state.history.reload()
            } else {
                None
            }
        };

        if outcome.is_ok() {
            // Reconcile with the server: it assigns ids, timestamps and read state
            let history = async move {
                match history_ticket {
                    Some(ticket) => self.load_history(ticket).await,
                    None => Ok(()),
                }
            };
            let (history_result, refresh_result) = tokio::join!(history, self.run_refresh());
            if let Err(e) = history_result {
                warn!("History reload after send failed: {}", e);
            }
            if let Err(e) = refresh_result {
                warn!("Conversation refresh after send failed: {}", e);
            }
        }

        outcome
    }
}

/// Conversation view for one session
///
/// # Example
/// ```rust,no_run
/// use portal_messaging::models::{Role, User};
/// use portal_messaging::{ApiClient, MessagingView, Session, Settings};
///
/// # async fn example() -> portal_messaging::Result<()> {
/// let settings = Settings::default();
/// let session = Session::new(User::new("s1", "Sam", "sam@example.com", Role::Student), "token")?;
/// let api = ApiClient::for_session(&settings, &session)?;
///
/// let mut view = MessagingView::new(api, session, settings);
/// view.mount().await?;
///
/// let contacts = view.snapshot().await.contacts;
/// if let Some(teacher) = contacts.first() {
///     view.start_conversation(teacher).await?;
///     view.send("Hi").await?;
/// }
///
/// view.unmount();
/// # Ok(())
/// # }
/// ```
pub struct MessagingView {
    shared: Arc<ViewShared>,
    poller: Option<Poller>,
}

impl MessagingView {
    /// Create an unmounted view (phase `Loading`)
    pub fn new(api: ApiClient, session: Session, settings: Settings) -> Self {
        let directory = ContactDirectory::new(api.clone(), settings.admin_contact_limit);
        Self {
            shared: Arc::new(ViewShared {
                api,
                session,
                settings,
                directory,
                state: Mutex::new(ViewState::new()),
            }),
            poller: None,
        }
    }

    /// Session this view belongs to
    pub fn session(&self) -> &Session {
        &self.shared.session
    }

    /// Load contacts and conversations, then start polling
    ///
    /// Load failures are reflected in the snapshot; only an expired session
    /// is returned as an error, in which case polling is not started.
    pub async fn mount(&mut self) -> Result<()> {
        if self.poller.is_some() {
            debug!("View already mounted");
            return Ok(());
        }

        self.shared.state.lock().await.loading = true;
        info!("Mounting messaging view for {}", self.shared.session.user_id());

        let (_, refreshed) = tokio::join!(
            self.shared.reload_contacts(),
            self.shared.refresh_conversations()
        );

        self.shared.state.lock().await.loading = false;

        match refreshed {
            Err(Error::AuthExpired) => return Err(Error::AuthExpired),
            Err(e) => warn!("Initial conversation load failed: {}", e),
            Ok(()) => {}
        }

        let target = Arc::downgrade(&self.shared);
        self.poller = Some(Poller::start(self.shared.settings.poll_interval(), move || {
            let target = target.clone();
            async move {
                let Some(shared) = target.upgrade() else {
                    return false;
                };
                if let Err(e) = shared.refresh_conversations().await {
                    warn!("Polling refresh failed: {}", e);
                }
                true
            }
        }));

        Ok(())
    }

    /// Stop polling; the state is kept for a later mount
    pub fn unmount(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
            info!("Messaging view unmounted");
        }
    }

    /// Whether the view is mounted (its poller is active)
    pub fn is_mounted(&self) -> bool {
        self.poller.is_some()
    }

    /// Refresh the conversation list now
    ///
    /// A failure keeps the previous list and raises the list error.
    pub async fn refresh_conversations(&self) -> Result<()> {
        self.shared.refresh_conversations().await
    }

    /// Reload the contact directory
    pub async fn reload_contacts(&self) {
        self.shared.reload_contacts().await
    }

    /// Show the contact picker
    pub async fn open_contact_picker(&self) {
        self.shared.state.lock().await.picker_open = true;
    }

    /// Hide the contact picker
    pub async fn close_contact_picker(&self) {
        self.shared.state.lock().await.picker_open = false;
    }

    /// Open an existing conversation and load its history
    pub async fn select_conversation(&self, counterpart_id: &str) -> Result<()> {
        let selection = {
            let state = self.shared.state.lock().await;
            match state.store.get(counterpart_id) {
                Some(conversation) => Selection::Confirmed(conversation.clone()),
                None => {
                    return Err(ValidationError::UnknownCounterpart(counterpart_id.to_string()).into());
                }
            }
        };
        self.shared.select(selection).await
    }

    /// Open the conversation with a contact from the directory
    ///
    /// Without a stored conversation the selection is `Pending` and shown as
    /// ready with an empty history right away; the history load is still
    /// issued.
    pub async fn start_conversation(&self, contact: &User) -> Result<()> {
        if contact.id == self.shared.session.user_id() {
            return Err(ValidationError::SelfAddressed.into());
        }

        let selection = {
            let state = self.shared.state.lock().await;
            match state.store.get(&contact.id) {
                Some(conversation) => Selection::Confirmed(conversation.clone()),
                None => Selection::Pending(contact.clone()),
            }
        };
        self.shared.select(selection).await
    }

    /// Close the open conversation
    pub async fn clear_selection(&self) {
        self.shared.clear_selection().await
    }

    /// Replace the composer draft
    pub async fn set_draft(&self, text: &str) {
        self.shared.state.lock().await.composer.set_draft(text);
    }

    /// Send the current draft to the open conversation
    pub async fn submit(&self) -> Result<Message> {
        self.shared.submit().await
    }

    /// Put `text` in the composer and send it
    pub async fn send(&self, text: &str) -> Result<Message> {
        {
            let mut state = self.shared.state.lock().await;
            if state.composer.is_sending() {
                return Err(ValidationError::SendInProgress.into());
            }
            state.composer.set_draft(text);
        }
        self.shared.submit().await
    }

    /// Current phase
    pub async fn phase(&self) -> ViewPhase {
        self.shared.state.lock().await.phase()
    }

    /// Copy of the whole view state
    pub async fn snapshot(&self) -> ViewSnapshot {
        self.shared.state.lock().await.snapshot()
    }
}
