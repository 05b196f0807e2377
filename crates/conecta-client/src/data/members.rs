//! Ministry membership: listing, adding members, and searching profiles not
//! yet in a ministry.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use conecta_protocol::{MinistryMember, MinistryRole};

use crate::backend::{BackendClient, Query};
use crate::cache::QueryKey;

pub fn ministry_members_key(ministry_id: Uuid) -> QueryKey {
    QueryKey::new(&["ministry_members", &ministry_id.to_string()])
}

pub async fn list_ministry_members(
    backend: &BackendClient,
    ministry_id: Uuid,
) -> Result<Vec<MinistryMember>> {
    let rows = backend
        .select(
            Query::from("ministry_members")
                .select("id,ministry_id,user_id,role,joined_at,profile:profiles(*)")
                .eq("ministry_id", ministry_id),
        )
        .await?;
    Ok(rows)
}

#[derive(Serialize)]
struct NewMembership {
    ministry_id: Uuid,
    user_id: Uuid,
    role: MinistryRole,
}

pub async fn add_member(
    backend: &BackendClient,
    ministry_id: Uuid,
    user_id: Uuid,
    role: MinistryRole,
) -> Result<()> {
    backend
        .insert_void(
            "ministry_members",
            &NewMembership {
                ministry_id,
                user_id,
                role,
            },
        )
        .await?;
    Ok(())
}

pub async fn remove_member(backend: &BackendClient, membership_id: Uuid) -> Result<()> {
    backend
        .delete(Query::from("ministry_members").eq("id", membership_id))
        .await?;
    Ok(())
}

/// Candidate row for the add-member search
#[derive(Debug, Clone, Deserialize)]
pub struct UserSearchResult {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MemberIdRow {
    user_id: Uuid,
}

/// Profiles not yet in `ministry_id`, optionally narrowed by a name/email
/// search. Existing members are filtered out client-side.
pub async fn users_not_in_ministry(
    backend: &BackendClient,
    ministry_id: Uuid,
    search: &str,
) -> Result<Vec<UserSearchResult>> {
    let mut query = Query::from("profiles").select("id,email,name,avatar_url");
    if !search.is_empty() {
        query = query.or_ilike(&["name", "email"], &format!("%{search}%"));
    }

    let profiles: Vec<UserSearchResult> = backend.select(query).await?;

    let members: Vec<MemberIdRow> = backend
        .select(
            Query::from("ministry_members")
                .select("user_id")
                .eq("ministry_id", ministry_id),
        )
        .await?;
    let member_ids: HashSet<Uuid> = members.into_iter().map(|m| m.user_id).collect();

    Ok(profiles
        .into_iter()
        .filter(|p| !member_ids.contains(&p.id))
        .collect())
}
