use eframe::egui;

use crate::backend::BackendClient;
use crate::cache::QueryCache;
use crate::data::profiles::{self, ProfileUpdate};
use crate::state::{Session, ThemeMode};

use super::{format, theme};

/// Navigation requests raised by the profile screen
pub enum ProfileAction {
    OpenSettings,
    OpenInvites,
    OpenAdminMembers,
}

pub struct ProfileView {
    show_edit_dialog: bool,
    edit_name: String,
    edit_phone: String,
    edit_bio: String,
    confirm_delete: bool,
    error: Option<String>,
}

impl ProfileView {
    pub fn new() -> Self {
        Self {
            show_edit_dialog: false,
            edit_name: String::new(),
            edit_phone: String::new(),
            edit_bio: String::new(),
            confirm_delete: false,
            error: None,
        }
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        backend: &BackendClient,
        cache: &QueryCache,
        session: &Session,
        runtime: &tokio::runtime::Runtime,
        mode: ThemeMode,
    ) -> Option<ProfileAction> {
        let mut action = None;

        let profile = runtime.block_on(session.profile());
        let caps = runtime.block_on(session.capabilities());
        let loading = runtime.block_on(session.is_loading());

        ui.heading("Perfil");
        ui.separator();

        let Some(profile) = profile else {
            if loading {
                ui.spinner();
            } else {
                // Profile fetch failed earlier; degrade instead of failing
                ui.label(
                    egui::RichText::new("Perfil indisponível")
                        .italics()
                        .color(theme::text_muted(mode)),
                );
            }
            return None;
        };

        ui.horizontal(|ui| {
            let (response, painter) =
                ui.allocate_painter(egui::vec2(48.0, 48.0), egui::Sense::hover());
            let rect = response.rect;
            painter.circle_filled(rect.center(), 22.0, theme::AVATAR_BG);
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                format::initial(&profile.name),
                egui::FontId::proportional(18.0),
                egui::Color32::WHITE,
            );

            ui.vertical(|ui| {
                ui.label(egui::RichText::new(&profile.name).strong());
                ui.label(
                    egui::RichText::new(&profile.email).color(theme::text_muted(mode)),
                );
                let role = match profile.global_role {
                    conecta_protocol::GlobalRole::Member => "Membro",
                    conecta_protocol::GlobalRole::Leader => "Líder",
                    conecta_protocol::GlobalRole::Pastor => "Pastor",
                };
                ui.label(egui::RichText::new(role).small().color(theme::PRIMARY));
            });
        });

        if let Some(phone) = &profile.phone {
            ui.label(format!("Telefone: {}", phone));
        }
        if let Some(bio) = &profile.bio {
            ui.label(bio.as_str());
        }

        ui.add_space(12.0);

        if ui.button("Editar Perfil").clicked() {
            self.show_edit_dialog = true;
            self.edit_name = profile.name.clone();
            self.edit_phone = profile.phone.clone().unwrap_or_default();
            self.edit_bio = profile.bio.clone().unwrap_or_default();
            self.error = None;
        }

        if ui.button("Configurações").clicked() {
            action = Some(ProfileAction::OpenSettings);
        }

        if caps.manage_invites {
            ui.add_space(8.0);
            ui.label(
                egui::RichText::new("ADMINISTRAÇÃO")
                    .small()
                    .color(theme::text_muted(mode)),
            );
            if ui.button("Convites").clicked() {
                action = Some(ProfileAction::OpenInvites);
            }
            if caps.manage_member_roles && ui.button("Membros da Igreja").clicked() {
                action = Some(ProfileAction::OpenAdminMembers);
            }
        }

        ui.add_space(16.0);

        if !self.confirm_delete {
            if ui
                .button(egui::RichText::new("Excluir minha conta").color(theme::DANGER))
                .clicked()
            {
                self.confirm_delete = true;
            }
        } else {
            ui.colored_label(
                theme::DANGER,
                "Esta ação é permanente. Confirmar exclusão?",
            );
            ui.horizontal(|ui| {
                if ui.button("Sim, excluir").clicked() {
                    match runtime.block_on(profiles::delete_own_account(backend)) {
                        Ok(()) => {
                            // Dropping the session flips the root back to login
                            runtime.block_on(async {
                                session.sign_out(backend).await;
                                cache.clear().await;
                            });
                        }
                        Err(e) => {
                            self.error = Some(e.to_string());
                            self.confirm_delete = false;
                        }
                    }
                }
                if ui.button("Cancelar").clicked() {
                    self.confirm_delete = false;
                }
            });
        }

        if let Some(error) = &self.error {
            ui.add_space(8.0);
            ui.colored_label(theme::DANGER, error);
        }

        self.edit_dialog(ui, backend, session, runtime, &profile.id);

        action
    }

    fn edit_dialog(
        &mut self,
        ui: &mut egui::Ui,
        backend: &BackendClient,
        session: &Session,
        runtime: &tokio::runtime::Runtime,
        user_id: &uuid::Uuid,
    ) {
        if !self.show_edit_dialog {
            return;
        }

        egui::Window::new("Editar Perfil")
            .collapsible(false)
            .resizable(false)
            .show(ui.ctx(), |ui| {
                ui.horizontal(|ui| {
                    ui.label("Nome:");
                    ui.text_edit_singleline(&mut self.edit_name);
                });
                ui.horizontal(|ui| {
                    ui.label("Telefone:");
                    ui.text_edit_singleline(&mut self.edit_phone);
                });
                ui.label("Bio:");
                ui.text_edit_multiline(&mut self.edit_bio);

                if let Some(error) = &self.error {
                    ui.colored_label(theme::DANGER, error);
                }

                ui.horizontal(|ui| {
                    if ui.button("Salvar").clicked() {
                        if self.edit_name.trim().is_empty() {
                            self.error = Some("Informe seu nome".to_string());
                        } else {
                            let updates = ProfileUpdate {
                                name: Some(self.edit_name.trim().to_string()),
                                phone: Some(self.edit_phone.trim().to_string()),
                                bio: Some(self.edit_bio.trim().to_string()),
                                ..Default::default()
                            };

                            match runtime.block_on(profiles::update_profile(
                                backend, *user_id, &updates,
                            )) {
                                Ok(_) => {
                                    runtime.block_on(session.refresh(backend));
                                    self.show_edit_dialog = false;
                                    self.error = None;
                                }
                                Err(e) => self.error = Some(e.to_string()),
                            }
                        }
                    }

                    if ui.button("Cancelar").clicked() {
                        self.show_edit_dialog = false;
                        self.error = None;
                    }
                });
            });
    }
}

impl Default for ProfileView {
    fn default() -> Self {
        Self::new()
    }
}
