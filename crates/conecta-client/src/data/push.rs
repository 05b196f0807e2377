//! Device push tokens and outbound broadcasts.
//!
//! Tokens live in the `push_tokens` table keyed (user_id, token). Outbound
//! sends go straight to the push gateway, batched in chunks of 100 messages.

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::{BackendClient, Query};

const PUSH_CHUNK_SIZE: usize = 100;

#[derive(Serialize)]
struct TokenUpsert<'a> {
    user_id: Uuid,
    token: &'a str,
    platform: &'a str,
    updated_at: chrono::DateTime<Utc>,
}

/// Upsert this device's token for the signed-in user
pub async fn register_token(
    backend: &BackendClient,
    user_id: Uuid,
    token: &str,
    platform: &str,
) -> Result<()> {
    let _: serde_json::Value = backend
        .upsert(
            "push_tokens",
            "user_id,token",
            &TokenUpsert {
                user_id,
                token,
                platform,
                updated_at: Utc::now(),
            },
        )
        .await?;
    Ok(())
}

/// Remove this device's token on sign-out. Not critical; callers log and move on.
pub async fn unregister_token(backend: &BackendClient, user_id: Uuid, token: &str) -> Result<()> {
    backend
        .delete(
            Query::from("push_tokens")
                .eq("user_id", user_id)
                .eq("token", token),
        )
        .await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct TokenRow {
    token: String,
}

/// One message per device in the gateway's wire format
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PushMessage {
    pub to: String,
    pub title: String,
    pub body: String,
}

/// Split a broadcast into gateway-sized request bodies
pub fn broadcast_batches(tokens: &[String], title: &str, body: &str) -> Vec<Vec<PushMessage>> {
    tokens
        .chunks(PUSH_CHUNK_SIZE)
        .map(|chunk| {
            chunk
                .iter()
                .map(|token| PushMessage {
                    to: token.clone(),
                    title: title.to_string(),
                    body: body.to_string(),
                })
                .collect()
        })
        .collect()
}

/// Send `title`/`body` to every registered device
pub async fn broadcast_to_all(backend: &BackendClient, title: &str, body: &str) -> Result<()> {
    let rows: Vec<TokenRow> = backend
        .select(Query::from("push_tokens").select("token"))
        .await?;
    let tokens: Vec<String> = rows.into_iter().map(|r| r.token).collect();

    let gateway = backend.config().push_gateway_url.clone();
    for batch in broadcast_batches(&tokens, title, body) {
        let response = backend
            .http()
            .post(&gateway)
            .json(&batch)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("push gateway returned {status}: {text}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcasts_are_chunked_by_hundred() {
        let tokens: Vec<String> = (0..250).map(|i| format!("token-{i}")).collect();
        let batches = broadcast_batches(&tokens, "Aviso", "Culto às 19h");

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 100);
        assert_eq!(batches[1].len(), 100);
        assert_eq!(batches[2].len(), 50);
        assert_eq!(batches[0][0].to, "token-0");
        assert_eq!(batches[2][49].to, "token-249");
    }

    #[test]
    fn empty_token_list_means_no_batches() {
        assert!(broadcast_batches(&[], "Aviso", "corpo").is_empty());
    }
}
