//! Session state holder: the signed-in user's profile and device push token.
//!
//! Created once at app start and handed to the screens that need it; loaded
//! after sign-in, cleared on sign-out. A failed profile fetch resolves the
//! loading flag with a null profile and the UI degrades instead of failing.

use std::sync::Arc;
use tokio::sync::RwLock;

use conecta_protocol::{Capabilities, GlobalRole, Profile};

use crate::backend::BackendClient;
use crate::data::{profiles, push};

#[derive(Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<SessionInner>>,
}

#[derive(Default)]
struct SessionInner {
    profile: Option<Profile>,
    loading: bool,
    push_token: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn profile(&self) -> Option<Profile> {
        self.inner.read().await.profile.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.read().await.loading
    }

    /// Capability set for the current role; an unresolved profile gets the
    /// most restrictive set.
    pub async fn capabilities(&self) -> Capabilities {
        let role = self
            .inner
            .read()
            .await
            .profile
            .as_ref()
            .map(|p| p.global_role)
            .unwrap_or(GlobalRole::Member);
        Capabilities::for_role(role)
    }

    /// Fetch the profile for the authenticated user and register this
    /// device's push token when one is configured.
    pub async fn load(&self, backend: &BackendClient) {
        self.inner.write().await.loading = true;

        let Some(user_id) = backend.user_id().await else {
            self.inner.write().await.loading = false;
            return;
        };

        match profiles::get_profile(backend, user_id).await {
            Ok(profile) => {
                self.inner.write().await.profile = Some(profile);
            }
            Err(e) => {
                tracing::error!("failed to fetch profile: {e:#}");
            }
        }
        self.inner.write().await.loading = false;

        if let Some(token) = backend.config().device_push_token.clone() {
            match push::register_token(backend, user_id, &token, std::env::consts::OS).await {
                Ok(()) => {
                    self.inner.write().await.push_token = Some(token);
                }
                Err(e) => {
                    tracing::error!("failed to register push token: {e:#}");
                }
            }
        }
    }

    /// Re-fetch the profile (after an edit or a role change)
    pub async fn refresh(&self, backend: &BackendClient) {
        let Some(user_id) = backend.user_id().await else {
            return;
        };
        match profiles::get_profile(backend, user_id).await {
            Ok(profile) => {
                self.inner.write().await.profile = Some(profile);
            }
            Err(e) => {
                tracing::error!("failed to refresh profile: {e:#}");
            }
        }
    }

    /// Unregister the push token, end the backend session, clear local state
    pub async fn sign_out(&self, backend: &BackendClient) {
        let (user_id, token) = {
            let inner = self.inner.read().await;
            (
                inner.profile.as_ref().map(|p| p.id),
                inner.push_token.clone(),
            )
        };

        if let (Some(user_id), Some(token)) = (user_id, token) {
            if let Err(e) = push::unregister_token(backend, user_id, &token).await {
                tracing::warn!("failed to unregister push token: {e:#}");
            }
        }

        backend.sign_out().await;
        *self.inner.write().await = SessionInner::default();
    }
}
