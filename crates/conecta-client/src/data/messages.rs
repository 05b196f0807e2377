//! Message data access: channel and thread fetches with their joined
//! relations, sends (with optional attachment upload), reaction toggles, and
//! the realtime sync loops that keep cached lists current.

use anyhow::Result;
use serde::Serialize;
use uuid::Uuid;

use conecta_protocol::{AttachmentKind, ChangeFilter, Message};

use crate::backend::{
    attachment_kind, validate_attachment, BackendClient, Query, BUCKET_ATTACHMENTS,
};
use crate::cache::merge::merge_by_id;
use crate::cache::{QueryCache, QueryKey};

/// Columns plus joined relations fetched for every message
const MESSAGE_SELECT: &str = "id,content,created_at,author_id,ministry_id,parent_message_id,\
author:profiles(name,avatar_url),\
attachments:message_attachments(id,file_url,file_type,file_name,file_size),\
reactions:message_reactions(emoji,user_id)";

/// Placeholder content persisted for attachment-only messages
const ATTACHMENT_PLACEHOLDER: &str = "(anexo)";

pub fn channel_key(ministry_id: Uuid) -> QueryKey {
    QueryKey::new(&["ministry_messages", &ministry_id.to_string()])
}

pub fn thread_key(root_id: Uuid) -> QueryKey {
    QueryKey::new(&["thread", &root_id.to_string()])
}

fn channel_topic(ministry_id: Uuid) -> String {
    format!("ministry_messages:{ministry_id}")
}

fn thread_topic(root_id: Uuid) -> String {
    format!("thread:{root_id}")
}

/// Root messages of a ministry channel, oldest first
pub async fn fetch_channel(backend: &BackendClient, ministry_id: Uuid) -> Result<Vec<Message>> {
    let rows = backend
        .select(
            Query::from("messages")
                .select(MESSAGE_SELECT)
                .eq("ministry_id", ministry_id)
                .is_null("parent_message_id")
                .order("created_at", true),
        )
        .await?;
    Ok(rows)
}

/// A root message and its direct replies (threads are two levels deep)
#[derive(Debug, Clone)]
pub struct Thread {
    pub root: Message,
    pub replies: Vec<Message>,
}

pub async fn fetch_thread(backend: &BackendClient, root_id: Uuid) -> Result<Thread> {
    let root = fetch_message(backend, root_id).await?;

    let replies = backend
        .select(
            Query::from("messages")
                .select(MESSAGE_SELECT)
                .eq("parent_message_id", root_id)
                .order("created_at", true),
        )
        .await?;

    Ok(Thread { root, replies })
}

/// One message with its joined relations; the realtime payload only carries
/// the row id, so this runs after every insert notification
pub async fn fetch_message(backend: &BackendClient, id: Uuid) -> Result<Message> {
    let message = backend
        .select_one(Query::from("messages").select(MESSAGE_SELECT).eq("id", id))
        .await?;
    Ok(message)
}

/// Content actually persisted: trimmed text, or the attachment placeholder
/// when only a file is being sent
pub fn effective_content(content: &str, has_attachment: bool) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() && has_attachment {
        ATTACHMENT_PLACEHOLDER.to_string()
    } else {
        trimmed.to_string()
    }
}

/// File picked for upload, not yet persisted
#[derive(Debug, Clone)]
pub struct PendingAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Serialize)]
struct NewMessage<'a> {
    ministry_id: Uuid,
    author_id: Uuid,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_message_id: Option<Uuid>,
}

#[derive(Serialize)]
struct NewAttachment {
    message_id: Uuid,
    file_url: String,
    file_type: AttachmentKind,
    file_name: String,
    file_size: i64,
}

/// Insert a message, upload and link its attachment if any, and return the
/// joined representation for the sender's cache patch.
pub async fn send_message(
    backend: &BackendClient,
    ministry_id: Uuid,
    author_id: Uuid,
    content: &str,
    parent_message_id: Option<Uuid>,
    attachment: Option<PendingAttachment>,
) -> Result<Message> {
    let content = effective_content(content, attachment.is_some());
    if content.is_empty() {
        anyhow::bail!("Mensagem vazia");
    }

    if let Some(att) = &attachment {
        validate_attachment(&att.content_type, att.bytes.len() as u64)?;
    }

    let inserted: Message = backend
        .insert(
            "messages",
            &NewMessage {
                ministry_id,
                author_id,
                content: &content,
                parent_message_id,
            },
        )
        .await?;

    if let Some(att) = attachment {
        let storage = backend.storage().await;
        let path = format!("{}/{}/{}", ministry_id, inserted.id, att.file_name);
        let size = att.bytes.len() as i64;

        storage
            .upload(BUCKET_ATTACHMENTS, &path, att.bytes, &att.content_type)
            .await?;

        backend
            .insert_void(
                "message_attachments",
                &NewAttachment {
                    message_id: inserted.id,
                    file_url: storage.public_url(BUCKET_ATTACHMENTS, &path),
                    file_type: attachment_kind(&att.content_type),
                    file_name: att.file_name,
                    file_size: size,
                },
            )
            .await?;
    }

    fetch_message(backend, inserted.id).await
}

#[derive(Serialize)]
struct NewReaction<'a> {
    message_id: Uuid,
    user_id: Uuid,
    emoji: &'a str,
}

/// Add the reaction if the user doesn't have it on this message, remove it
/// otherwise. Returns the refreshed message.
pub async fn toggle_reaction(
    backend: &BackendClient,
    message: &Message,
    user_id: Uuid,
    emoji: &str,
) -> Result<Message> {
    if message.has_reaction(user_id, emoji) {
        backend
            .delete(
                Query::from("message_reactions")
                    .eq("message_id", message.id)
                    .eq("user_id", user_id)
                    .eq("emoji", emoji),
            )
            .await?;
    } else {
        backend
            .insert_void(
                "message_reactions",
                &NewReaction {
                    message_id: message.id,
                    user_id,
                    emoji,
                },
            )
            .await?;
    }

    fetch_message(backend, message.id).await
}

/// Keep a channel's cached root-message list in sync with server inserts.
///
/// Runs until the subscription closes (unsubscribe or connection loss). A
/// failed per-row fetch drops that update; it is logged and nothing else.
pub async fn run_channel_sync(backend: BackendClient, cache: QueryCache, ministry_id: Uuid) {
    let topic = channel_topic(ministry_id);
    let filter = ChangeFilter::eq("messages", "ministry_id", ministry_id);

    let mut sub = match backend.subscribe(&topic, filter).await {
        Ok(sub) => sub,
        Err(e) => {
            tracing::error!("channel subscription failed: {e:#}");
            return;
        }
    };

    while let Some(event) = sub.events.recv().await {
        match fetch_message(&backend, event.row_id).await {
            Ok(message) => {
                // Replies surface through their thread's subscription
                if message.parent_message_id.is_some() {
                    continue;
                }
                cache
                    .set_query_data::<Vec<Message>, _>(&channel_key(ministry_id), |old| {
                        let mut list = old.cloned().unwrap_or_default();
                        merge_by_id(&mut list, message, |m| m.id);
                        Some(list)
                    })
                    .await;
            }
            Err(e) => {
                tracing::error!("failed to fetch inserted message {}: {e:#}", event.row_id);
            }
        }
    }

    tracing::debug!("channel sync for {} ended", ministry_id);
}

pub async fn stop_channel_sync(backend: &BackendClient, ministry_id: Uuid) {
    backend.unsubscribe(&channel_topic(ministry_id)).await;
}

/// Same contract as [`run_channel_sync`], for one thread's replies
pub async fn run_thread_sync(backend: BackendClient, cache: QueryCache, root_id: Uuid) {
    let topic = thread_topic(root_id);
    let filter = ChangeFilter::eq("messages", "parent_message_id", root_id);

    let mut sub = match backend.subscribe(&topic, filter).await {
        Ok(sub) => sub,
        Err(e) => {
            tracing::error!("thread subscription failed: {e:#}");
            return;
        }
    };

    while let Some(event) = sub.events.recv().await {
        match fetch_message(&backend, event.row_id).await {
            Ok(message) => {
                cache
                    .set_query_data::<Thread, _>(&thread_key(root_id), |old| {
                        let thread = old?;
                        let mut thread = thread.clone();
                        merge_by_id(&mut thread.replies, message, |m| m.id);
                        Some(thread)
                    })
                    .await;
            }
            Err(e) => {
                tracing::error!("failed to fetch inserted reply {}: {e:#}", event.row_id);
            }
        }
    }

    tracing::debug!("thread sync for {} ended", root_id);
}

pub async fn stop_thread_sync(backend: &BackendClient, root_id: Uuid) {
    backend.unsubscribe(&thread_topic(root_id)).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_with_attachment_gets_placeholder() {
        assert_eq!(effective_content("", true), "(anexo)");
        assert_eq!(effective_content("   ", true), "(anexo)");
    }

    #[test]
    fn text_is_trimmed_and_kept() {
        assert_eq!(effective_content("  Amém!  ", true), "Amém!");
        assert_eq!(effective_content("Amém!", false), "Amém!");
    }

    #[test]
    fn empty_text_without_attachment_stays_empty() {
        assert_eq!(effective_content("", false), "");
    }
}
