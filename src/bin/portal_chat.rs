//! Portal chat
//!
//! A line-oriented terminal client for portal messaging.
//!
//! The session comes from the environment (`PORTAL_TOKEN`, `PORTAL_USER_ID`,
//! `PORTAL_USER_NAME`, `PORTAL_USER_EMAIL`, `PORTAL_ROLE`); settings from
//! `PORTAL_SETTINGS` (default `portal_settings.json`) plus `PORTAL_*`
//! overrides.

use anyhow::{Context, bail};
use portal_messaging::models::{Role, User};
use portal_messaging::{ApiClient, MessagingView, Session, Settings, ViewPhase, ViewSnapshot};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  /list        show conversations
  /contacts    show contacts
  /new <n>     start a chat with contact n
  /open <n>    open conversation n
  /close       close the open conversation
  /refresh     refresh conversations
  /quit        exit
Anything else is sent to the open conversation.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    portal_messaging::init();

    let settings_path =
        std::env::var("PORTAL_SETTINGS").unwrap_or_else(|_| "portal_settings.json".to_string());
    let mut settings = Settings::load(&settings_path)
        .with_context(|| format!("loading settings from {}", settings_path))?;
    settings.apply_env_overrides()?;

    let session = session_from_env()?;
    let api = ApiClient::for_session(&settings, &session)?;

    let expired = Arc::new(AtomicBool::new(false));
    let expired_flag = expired.clone();
    api.set_auth_expired_handler(move || {
        expired_flag.store(true, Ordering::SeqCst);
    })
    .await;

    let mut view = MessagingView::new(api, session, settings);
    if view.mount().await.is_err() {
        bail!("session expired, please log in again");
    }

    print_overview(&view.snapshot().await);
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let snapshot = view.snapshot().await;
        let mut words = line.split_whitespace();
        match (words.next(), words.next()) {
            (Some("/quit"), _) => break,
            (Some("/help"), _) => println!("{}", HELP),
            (Some("/list"), _) => print_conversations(&snapshot),
            (Some("/contacts"), _) => {
                view.reload_contacts().await;
                print_contacts(&view.snapshot().await);
            }
            (Some("/new"), Some(n)) => match pick(&snapshot.contacts, n) {
                Some(contact) => {
                    if let Err(e) = view.start_conversation(contact).await {
                        println!("! {}", e.user_message("Could not open conversation"));
                    }
                    print_chat(&view.snapshot().await, view.session().user_id());
                }
                None => println!("! No contact {}", n),
            },
            (Some("/open"), Some(n)) => match pick(&snapshot.conversations, n) {
                Some(conversation) => {
                    if let Err(e) = view.select_conversation(conversation.counterpart_id()).await {
                        println!("! {}", e.user_message("Could not load messages"));
                    }
                    print_chat(&view.snapshot().await, view.session().user_id());
                }
                None => println!("! No conversation {}", n),
            },
            (Some("/close"), _) => {
                view.clear_selection().await;
                print_conversations(&view.snapshot().await);
            }
            (Some("/refresh"), _) => {
                if let Err(e) = view.refresh_conversations().await {
                    println!("! {}", e.user_message("Failed to load conversations"));
                }
                print_conversations(&view.snapshot().await);
            }
            (Some(cmd), _) if cmd.starts_with('/') => println!("! Unknown command {}", cmd),
            _ if snapshot.sending => println!("! A message is already being sent"),
            _ => {
                view.set_draft(line).await;
                if !view.snapshot().await.can_submit {
                    println!("! Open a conversation with /open or /new first");
                    continue;
                }
                if view.submit().await.is_err() {
                    let snapshot = view.snapshot().await;
                    println!("! {}", snapshot.composer_error.unwrap_or_default());
                } else {
                    print_chat(&view.snapshot().await, view.session().user_id());
                }
            }
        }

        if expired.load(Ordering::SeqCst) {
            println!("Session expired, please log in again.");
            break;
        }
    }

    view.unmount();
    Ok(())
}

fn session_from_env() -> anyhow::Result<Session> {
    let var = |key: &str| std::env::var(key).with_context(|| format!("{} is not set", key));

    let role = match var("PORTAL_ROLE")?.to_lowercase().as_str() {
        "student" => Role::Student,
        "teacher" => Role::Teacher,
        "admin" => Role::Admin,
        other => bail!("unknown PORTAL_ROLE {:?}", other),
    };
    let user = User::new(
        var("PORTAL_USER_ID")?,
        std::env::var("PORTAL_USER_NAME").unwrap_or_default(),
        std::env::var("PORTAL_USER_EMAIL").unwrap_or_default(),
        role,
    );
    Ok(Session::new(user, var("PORTAL_TOKEN")?)?)
}

fn pick<'a, T>(items: &'a [T], n: &str) -> Option<&'a T> {
    let index: usize = n.parse().ok()?;
    items.get(index.checked_sub(1)?)
}

fn print_overview(snapshot: &ViewSnapshot) {
    if let Some(warning) = &snapshot.contacts_warning {
        println!("! {}", warning);
    }
    print_conversations(snapshot);
}

fn print_conversations(snapshot: &ViewSnapshot) {
    if let ViewPhase::Error(e) = &snapshot.phase {
        println!("! {}", e);
        return;
    }
    if let Some(e) = &snapshot.list_error {
        println!("! {} (showing last known list)", e);
    }
    if snapshot.offers_new_chat() {
        println!("No conversations yet. Use /contacts and /new <n> to start a new chat.");
        return;
    }
    let status = if snapshot.refreshing { ", refreshing" } else { "" };
    println!("Conversations ({} unread{}):", snapshot.total_unread, status);
    for (i, c) in snapshot.conversations.iter().enumerate() {
        let badge = if c.has_unread() {
            format!(" [{}]", c.unread_count)
        } else {
            String::new()
        };
        println!("  {}. {}{} - {}", i + 1, c.other_user.name, badge, c.preview());
    }
}

fn print_contacts(snapshot: &ViewSnapshot) {
    if snapshot.contacts.is_empty() {
        println!("No contacts available");
        return;
    }
    for (i, u) in snapshot.contacts.iter().enumerate() {
        println!("  {}. [{}] {} <{}> ({})", i + 1, u.initial(), u.name, u.email, u.role);
    }
}

fn print_chat(snapshot: &ViewSnapshot, me: &str) {
    let Some(selection) = &snapshot.selection else {
        print_conversations(snapshot);
        return;
    };
    let counterpart = selection.counterpart();
    println!("--- {} <{}> ---", counterpart.name, counterpart.email);

    match &snapshot.phase {
        ViewPhase::ConversationSelected(portal_messaging::messaging::HistoryStatus::Failed(e)) => {
            println!("! {}", e);
        }
        _ if snapshot.history.is_empty() => println!("(no messages yet)"),
        _ => {}
    }

    for m in &snapshot.history {
        let who = if m.is_from(me) {
            "you"
        } else {
            m.sender.name().unwrap_or(counterpart.name.as_str())
        };
        let new = if m.is_unread_for(me) { " (new)" } else { "" };
        println!("[{}] {}{}: {}", m.created_at.format("%Y-%m-%d %H:%M"), who, new, m.content);
    }
}
