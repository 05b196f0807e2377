//! Ministry data access.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use conecta_protocol::Ministry;

use crate::backend::{BackendClient, Query};
use crate::cache::QueryKey;

pub fn ministries_key() -> QueryKey {
    QueryKey::new(&["ministries"])
}

pub fn user_ministries_key(user_id: Uuid) -> QueryKey {
    QueryKey::new(&["ministries", "user", &user_id.to_string()])
}

/// All ministries, alphabetical
pub async fn list_ministries(backend: &BackendClient) -> Result<Vec<Ministry>> {
    let rows = backend
        .select(Query::from("ministries").select("*").order("name", true))
        .await?;
    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct MembershipRow {
    ministry: Ministry,
}

/// Ministries the user belongs to, via their membership rows
pub async fn list_user_ministries(backend: &BackendClient, user_id: Uuid) -> Result<Vec<Ministry>> {
    let rows: Vec<MembershipRow> = backend
        .select(
            Query::from("ministry_members")
                .select("ministry:ministries(id,name,description,created_by,created_at)")
                .eq("user_id", user_id),
        )
        .await?;

    Ok(rows.into_iter().map(|row| row.ministry).collect())
}

#[derive(Serialize)]
struct NewMinistry<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    created_by: Uuid,
}

pub async fn create_ministry(
    backend: &BackendClient,
    name: &str,
    description: Option<&str>,
    created_by: Uuid,
) -> Result<Ministry> {
    let ministry = backend
        .insert(
            "ministries",
            &NewMinistry {
                name,
                description,
                created_by,
            },
        )
        .await?;
    Ok(ministry)
}

#[derive(Serialize)]
struct UpdateMinistry<'a> {
    name: &'a str,
    description: Option<&'a str>,
}

pub async fn update_ministry(
    backend: &BackendClient,
    id: Uuid,
    name: &str,
    description: Option<&str>,
) -> Result<Ministry> {
    let ministry = backend
        .update(
            Query::from("ministries").eq("id", id),
            &UpdateMinistry { name, description },
        )
        .await?;
    Ok(ministry)
}
