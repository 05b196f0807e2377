//! Invite lifecycle: code generation, creation with a configurable validity
//! window, listing, deletion, and the redemption RPCs.
//!
//! This module is the only place invite codes are generated.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use conecta_protocol::{GlobalRole, Invite};

use crate::backend::{AuthSession, BackendClient, Query};
use crate::cache::QueryKey;

/// Unambiguous alphabet: no I, O, 0 or 1
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 6;

pub fn invites_key() -> QueryKey {
    QueryKey::new(&["invites"])
}

/// Random 6-character invite code
pub fn generate_invite_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

#[derive(Debug, Clone)]
pub struct CreateInvite {
    pub email: String,
    pub global_role: GlobalRole,
    pub ministries_default: Vec<Uuid>,
    pub validity_days: i64,
}

#[derive(Serialize)]
struct NewInvite<'a> {
    email: String,
    code: &'a str,
    global_role: GlobalRole,
    ministries_default: Option<&'a [Uuid]>,
    created_by: Uuid,
    expires_at: DateTime<Utc>,
}

pub async fn create_invite(
    backend: &BackendClient,
    data: &CreateInvite,
    created_by: Uuid,
) -> Result<Invite> {
    let code = generate_invite_code();
    let expires_at = Utc::now() + Duration::days(data.validity_days);

    let invite = backend
        .insert(
            "invites",
            &NewInvite {
                email: data.email.trim().to_lowercase(),
                code: &code,
                global_role: data.global_role,
                ministries_default: if data.ministries_default.is_empty() {
                    None
                } else {
                    Some(&data.ministries_default)
                },
                created_by,
                expires_at,
            },
        )
        .await?;

    Ok(invite)
}

/// All invites visible to the caller, newest first
pub async fn list_invites(backend: &BackendClient) -> Result<Vec<Invite>> {
    let rows = backend
        .select(Query::from("invites").select("*").order("created_at", false))
        .await?;
    Ok(rows)
}

pub async fn delete_invite(backend: &BackendClient, invite_id: Uuid) -> Result<()> {
    backend
        .delete(Query::from("invites").eq("id", invite_id))
        .await?;
    Ok(())
}

/// Check a code server-side without consuming it. The RPC rejects unknown,
/// used, expired and wrong-email codes atomically.
pub async fn validate_invite_code(
    backend: &BackendClient,
    email: &str,
    code: &str,
) -> Result<Invite> {
    let invite = backend
        .rpc(
            "validate_invite_code",
            &serde_json::json!({
                "email": email.trim().to_lowercase(),
                "code": code.trim().to_uppercase(),
            }),
        )
        .await?;
    Ok(invite)
}

/// Full redemption: validate the code, create the account, then consume the
/// invite (which grants the role and joins the default ministries).
pub async fn redeem_invite(
    backend: &BackendClient,
    email: &str,
    code: &str,
    password: &str,
) -> Result<AuthSession> {
    let invite = validate_invite_code(backend, email, code).await?;

    // Initial profile name; the user edits it later
    let name = email.split('@').next().unwrap_or(email);
    let session = backend.sign_up(email, password, name).await?;

    backend
        .rpc_void(
            "use_invite_code",
            &serde_json::json!({ "code": invite.code }),
        )
        .await?;

    Ok(session)
}

/// Remaining validity for display: "Expirado", whole days, or whole hours
pub fn time_until_expiration(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let remaining = expires_at - now;

    if remaining <= Duration::zero() {
        return "Expirado".to_string();
    }

    let days = remaining.num_days();
    if days > 0 {
        return format!("{} dia{}", days, if days > 1 { "s" } else { "" });
    }

    let hours = remaining.num_hours();
    format!("{} hora{}", hours, if hours > 1 { "s" } else { "" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_chars_from_the_unambiguous_alphabet() {
        for _ in 0..100 {
            let code = generate_invite_code();
            assert_eq!(code.len(), CODE_LENGTH);
            for c in code.bytes() {
                assert!(CODE_ALPHABET.contains(&c), "unexpected char {}", c as char);
            }
        }
    }

    #[test]
    fn codes_never_contain_ambiguous_glyphs() {
        for _ in 0..100 {
            let code = generate_invite_code();
            assert!(!code.contains(['I', 'O', '0', '1']));
        }
    }

    #[test]
    fn expiration_formatting() {
        let now = Utc::now();
        assert_eq!(time_until_expiration(now - Duration::hours(1), now), "Expirado");
        assert_eq!(time_until_expiration(now + Duration::days(3), now), "3 dias");
        assert_eq!(
            time_until_expiration(now + Duration::hours(30), now),
            "1 dia"
        );
        assert_eq!(
            time_until_expiration(now + Duration::hours(5), now),
            "5 horas"
        );
    }
}
