//! Announcement data access. Creating a global announcement also pushes a
//! notification broadcast to every registered device.

use anyhow::Result;
use serde::Serialize;
use uuid::Uuid;

use conecta_protocol::Announcement;

use crate::backend::{BackendClient, Query};
use crate::cache::QueryKey;

use super::push;

pub fn announcements_key() -> QueryKey {
    QueryKey::new(&["announcements"])
}

/// Visible announcements, newest first. Row-level policies scope
/// ministry-bound announcements to their members; the client does not
/// re-filter.
pub async fn list_announcements(backend: &BackendClient) -> Result<Vec<Announcement>> {
    let rows = backend
        .select(
            Query::from("announcements")
                .select("*,author:profiles(name),ministry:ministries(name)")
                .order("created_at", false),
        )
        .await?;
    Ok(rows)
}

#[derive(Serialize)]
struct NewAnnouncement<'a> {
    title: &'a str,
    content: &'a str,
    author_id: Uuid,
    is_global: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    ministry_id: Option<Uuid>,
}

pub async fn create_announcement(
    backend: &BackendClient,
    title: &str,
    content: &str,
    author_id: Uuid,
    is_global: bool,
    ministry_id: Option<Uuid>,
) -> Result<Announcement> {
    let announcement: Announcement = backend
        .insert(
            "announcements",
            &NewAnnouncement {
                title,
                content,
                author_id,
                is_global,
                ministry_id,
            },
        )
        .await?;

    // Broadcast failures must not fail the announcement itself
    if is_global {
        if let Err(e) = push::broadcast_to_all(backend, title, content).await {
            tracing::error!("announcement push broadcast failed: {e:#}");
        }
    }

    Ok(announcement)
}
