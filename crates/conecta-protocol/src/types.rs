use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Global role granted at signup and changed only by administrators
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GlobalRole {
    #[default]
    Member,
    Leader,
    Pastor,
}

/// Role scoped to a single ministry membership
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MinistryRole {
    #[default]
    Member,
    Leader,
}

/// Per-user notification preferences stored on the profile row
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Preferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_notifications: Option<bool>,
}

/// Profile row, created on signup and owned by the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub global_role: GlobalRole,
    #[serde(default)]
    pub preferences: Option<Preferences>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Ministry (group) data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ministry {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Membership row joining a profile to a ministry; one row per (ministry, user)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinistryMember {
    pub id: Uuid,
    pub ministry_id: Uuid,
    pub user_id: Uuid,
    pub role: MinistryRole,
    #[serde(default)]
    pub profile: Option<Profile>,
    pub joined_at: Option<DateTime<Utc>>,
}

/// Joined author columns returned with messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageAuthor {
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Attachment category derived from the MIME type at upload
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Document,
}

/// Attachment row linked to a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageAttachment {
    pub id: Uuid,
    pub file_url: String,
    pub file_type: AttachmentKind,
    pub file_name: String,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub message_id: Option<Uuid>,
}

/// Reaction row; uniqueness intended per (message, user, emoji)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageReaction {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub emoji: String,
    pub user_id: Uuid,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Message row with its joined relations.
///
/// A message with no parent is a channel root; one referencing a root is a
/// thread reply. Threads are exactly two levels deep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    #[serde(default)]
    pub ministry_id: Option<Uuid>,
    #[serde(default)]
    pub parent_message_id: Option<Uuid>,
    #[serde(default)]
    pub author: Option<MessageAuthor>,
    #[serde(default)]
    pub attachments: Vec<MessageAttachment>,
    #[serde(default)]
    pub reactions: Vec<MessageReaction>,
    #[serde(default)]
    pub reply_count: Option<i64>,
}

impl Message {
    /// Whether `user_id` currently has `emoji` on this message
    pub fn has_reaction(&self, user_id: Uuid, emoji: &str) -> bool {
        self.reactions
            .iter()
            .any(|r| r.user_id == user_id && r.emoji == emoji)
    }
}

/// Event row; `ministry_id` of None means a church-wide event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub event_date: DateTime<Utc>,
    #[serde(default)]
    pub ministry_id: Option<Uuid>,
    #[serde(default)]
    pub created_by: Option<Uuid>,
    #[serde(default)]
    pub ministry: Option<MinistryRef>,
}

/// Joined ministry name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinistryRef {
    pub name: String,
}

/// Joined author name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorRef {
    pub name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RsvpStatus {
    Confirmed,
    Declined,
}

/// RSVP row, upserted on (event, user)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRsvp {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: RsvpStatus,
    #[serde(default)]
    pub profile: Option<RsvpProfile>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Joined profile columns returned with RSVPs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsvpProfile {
    pub name: String,
    pub email: String,
}

/// Broadcast text, global or scoped to one ministry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    #[serde(default)]
    pub ministry_id: Option<Uuid>,
    pub is_global: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub author: Option<AuthorRef>,
    #[serde(default)]
    pub ministry: Option<MinistryRef>,
}

/// Single-use invite bound to an email.
///
/// Status is derived from (used_at, expires_at) at render time, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invite {
    pub id: Uuid,
    pub email: String,
    pub code: String,
    pub global_role: GlobalRole,
    #[serde(default)]
    pub ministries_default: Option<Vec<Uuid>>,
    #[serde(default)]
    pub created_by: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteStatus {
    Active,
    Used,
    Expired,
}

impl Invite {
    /// Derive the status at `now`. A consumed invite is "used" regardless of
    /// expiry; an unconsumed one past its expiry is "expired".
    pub fn status_at(&self, now: DateTime<Utc>) -> InviteStatus {
        if self.used_at.is_some() {
            return InviteStatus::Used;
        }
        if now > self.expires_at {
            return InviteStatus::Expired;
        }
        InviteStatus::Active
    }
}

/// User report, insert-only from the client; triaged elsewhere
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub reporter_id: Uuid,
    pub reported_user_id: Uuid,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn invite(used_at: Option<DateTime<Utc>>, expires_in: Duration) -> Invite {
        let now = Utc::now();
        Invite {
            id: Uuid::new_v4(),
            email: "ana@example.com".into(),
            code: "ABC234".into(),
            global_role: GlobalRole::Member,
            ministries_default: None,
            created_by: None,
            expires_at: now + expires_in,
            used_at,
            created_at: now,
        }
    }

    #[test]
    fn used_invite_is_used_even_after_expiry() {
        let inv = invite(Some(Utc::now() - Duration::days(10)), Duration::days(-5));
        assert_eq!(inv.status_at(Utc::now()), InviteStatus::Used);
    }

    #[test]
    fn unused_invite_past_expiry_is_expired() {
        let inv = invite(None, Duration::hours(-1));
        assert_eq!(inv.status_at(Utc::now()), InviteStatus::Expired);
    }

    #[test]
    fn unused_invite_before_expiry_is_active() {
        let inv = invite(None, Duration::days(7));
        assert_eq!(inv.status_at(Utc::now()), InviteStatus::Active);
    }

    #[test]
    fn roles_serialize_uppercase() {
        assert_eq!(
            serde_json::to_string(&GlobalRole::Pastor).unwrap(),
            "\"PASTOR\""
        );
        assert_eq!(
            serde_json::to_string(&RsvpStatus::Confirmed).unwrap(),
            "\"CONFIRMED\""
        );
    }
}
