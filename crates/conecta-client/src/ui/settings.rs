use eframe::egui;

use conecta_protocol::Preferences;

use crate::backend::BackendClient;
use crate::cache::QueryCache;
use crate::data::profiles::{self, ProfileUpdate};
use crate::state::{PersistentSettings, Session, ThemeMode};

use super::theme;

pub struct SettingsView {
    error: Option<String>,
}

impl SettingsView {
    pub fn new() -> Self {
        Self { error: None }
    }

    /// Signing out clears the backend session; the app root notices the
    /// missing session on the next frame and switches stacks.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        backend: &BackendClient,
        cache: &QueryCache,
        session: &Session,
        runtime: &tokio::runtime::Runtime,
        settings: &mut PersistentSettings,
    ) {
        ui.heading("Configurações");
        ui.separator();

        // Theme, persisted locally
        ui.label("Tema");
        ui.horizontal(|ui| {
            let mut changed = false;
            changed |= ui
                .selectable_value(&mut settings.theme, ThemeMode::Light, "Claro")
                .changed();
            changed |= ui
                .selectable_value(&mut settings.theme, ThemeMode::Dark, "Escuro")
                .changed();
            if changed {
                settings.save();
                theme::apply(ui.ctx(), settings.theme);
            }
        });

        ui.add_space(12.0);

        // Push preference, stored on the profile
        let profile = runtime.block_on(session.profile());
        if let Some(profile) = profile {
            let mut push_enabled = profile
                .preferences
                .as_ref()
                .and_then(|p| p.push_notifications)
                .unwrap_or(true);

            if ui
                .checkbox(&mut push_enabled, "Receber notificações")
                .changed()
            {
                let updates = ProfileUpdate {
                    preferences: Some(Preferences {
                        push_notifications: Some(push_enabled),
                    }),
                    ..Default::default()
                };

                match runtime.block_on(profiles::update_profile(backend, profile.id, &updates)) {
                    Ok(_) => {
                        runtime.block_on(session.refresh(backend));
                        self.error = None;
                    }
                    Err(e) => self.error = Some(e.to_string()),
                }
            }
        }

        ui.add_space(16.0);

        if ui.button("Sair da conta").clicked() {
            runtime.block_on(async {
                session.sign_out(backend).await;
                cache.clear().await;
            });
        }

        if let Some(error) = &self.error {
            ui.add_space(8.0);
            ui.colored_label(theme::DANGER, error);
        }
    }
}

impl Default for SettingsView {
    fn default() -> Self {
        Self::new()
    }
}
