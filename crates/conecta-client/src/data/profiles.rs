//! Profile data access: the user's own profile, administrator member
//! management, reports, and account deletion.

use anyhow::Result;
use serde::Serialize;
use uuid::Uuid;

use conecta_protocol::{GlobalRole, Preferences, Profile, Report};

use crate::backend::{BackendClient, Query};
use crate::cache::QueryKey;

pub fn admin_members_key() -> QueryKey {
    QueryKey::new(&["admin", "members"])
}

pub async fn get_profile(backend: &BackendClient, user_id: Uuid) -> Result<Profile> {
    let profile = backend
        .select_one(Query::from("profiles").select("*").eq("id", user_id))
        .await?;
    Ok(profile)
}

/// Fields the user may edit on their own profile
#[derive(Debug, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
}

pub async fn update_profile(
    backend: &BackendClient,
    user_id: Uuid,
    updates: &ProfileUpdate,
) -> Result<Profile> {
    let profile = backend
        .update(Query::from("profiles").eq("id", user_id), updates)
        .await?;
    Ok(profile)
}

/// Server-side cascade delete of the caller's account
pub async fn delete_own_account(backend: &BackendClient) -> Result<()> {
    backend
        .rpc_void("delete_own_account", &serde_json::json!({}))
        .await?;
    Ok(())
}

pub async fn report_user(
    backend: &BackendClient,
    reporter_id: Uuid,
    reported_user_id: Uuid,
    reason: &str,
    details: Option<&str>,
) -> Result<()> {
    backend
        .insert_void(
            "reports",
            &Report {
                reporter_id,
                reported_user_id,
                reason: reason.to_string(),
                details: details.map(str::to_string),
                status: "PENDING".to_string(),
            },
        )
        .await?;
    Ok(())
}

/// Every profile, for the member administration screen
pub async fn list_all_members(backend: &BackendClient) -> Result<Vec<Profile>> {
    let rows = backend
        .select(Query::from("profiles").select("*").order("name", true))
        .await?;
    Ok(rows)
}

#[derive(Serialize)]
struct RoleUpdate {
    global_role: GlobalRole,
}

pub async fn update_member_role(
    backend: &BackendClient,
    user_id: Uuid,
    new_role: GlobalRole,
) -> Result<()> {
    backend
        .update_void(
            Query::from("profiles").eq("id", user_id),
            &RoleUpdate {
                global_role: new_role,
            },
        )
        .await?;
    Ok(())
}
