//! Event data access and RSVP upserts.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use conecta_protocol::{Event, EventRsvp, RsvpStatus};

use crate::backend::{BackendClient, Query};
use crate::cache::QueryKey;

pub fn events_key() -> QueryKey {
    QueryKey::new(&["events"])
}

pub fn attendees_key(event_id: Uuid) -> QueryKey {
    QueryKey::new(&["events", &event_id.to_string(), "attendees"])
}

pub fn user_rsvp_key(event_id: Uuid, user_id: Uuid) -> QueryKey {
    QueryKey::new(&[
        "events",
        &event_id.to_string(),
        "rsvp",
        &user_id.to_string(),
    ])
}

/// Upcoming and past events, soonest first
pub async fn list_events(backend: &BackendClient) -> Result<Vec<Event>> {
    let rows = backend
        .select(
            Query::from("events")
                .select("*,ministry:ministries(name)")
                .order("event_date", true),
        )
        .await?;
    Ok(rows)
}

/// Confirmed attendees with their joined profile
pub async fn list_attendees(backend: &BackendClient, event_id: Uuid) -> Result<Vec<EventRsvp>> {
    let rows = backend
        .select(
            Query::from("event_rsvps")
                .select("*,profile:profiles(name,email)")
                .eq("event_id", event_id)
                .eq("status", "CONFIRMED"),
        )
        .await?;
    Ok(rows)
}

/// The user's own RSVP, if any
pub async fn get_user_rsvp(
    backend: &BackendClient,
    event_id: Uuid,
    user_id: Uuid,
) -> Result<Option<EventRsvp>> {
    let row = backend
        .select_maybe(
            Query::from("event_rsvps")
                .select("*")
                .eq("event_id", event_id)
                .eq("user_id", user_id),
        )
        .await?;
    Ok(row)
}

#[derive(Serialize)]
struct RsvpUpsert {
    event_id: Uuid,
    user_id: Uuid,
    status: RsvpStatus,
}

/// Create-or-update on (event, user): two calls with different statuses end
/// up as one row carrying the latest status.
pub async fn set_rsvp(
    backend: &BackendClient,
    event_id: Uuid,
    user_id: Uuid,
    status: RsvpStatus,
) -> Result<EventRsvp> {
    let rsvp = backend
        .upsert(
            "event_rsvps",
            "event_id,user_id",
            &RsvpUpsert {
                event_id,
                user_id,
                status,
            },
        )
        .await?;
    Ok(rsvp)
}

pub async fn remove_rsvp(backend: &BackendClient, event_id: Uuid, user_id: Uuid) -> Result<()> {
    backend
        .delete(
            Query::from("event_rsvps")
                .eq("event_id", event_id)
                .eq("user_id", user_id),
        )
        .await?;
    Ok(())
}

#[derive(Serialize)]
struct NewEvent<'a> {
    title: &'a str,
    description: &'a str,
    location: &'a str,
    event_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ministry_id: Option<Uuid>,
    created_by: Uuid,
}

pub async fn create_event(
    backend: &BackendClient,
    title: &str,
    description: &str,
    location: &str,
    event_date: DateTime<Utc>,
    ministry_id: Option<Uuid>,
    created_by: Uuid,
) -> Result<Event> {
    let event = backend
        .insert(
            "events",
            &NewEvent {
                title,
                description,
                location,
                event_date,
                ministry_id,
                created_by,
            },
        )
        .await?;
    Ok(event)
}
