use chrono::Utc;
use eframe::egui;
use std::collections::HashSet;
use uuid::Uuid;

use conecta_protocol::{GlobalRole, InviteStatus};

use crate::backend::BackendClient;
use crate::cache::QueryCache;
use crate::data::{invites, ministries};
use crate::state::ThemeMode;

use super::theme;

pub struct InvitesView {
    show_create_dialog: bool,
    email: String,
    role: GlobalRole,
    validity_days: String,
    default_ministries: HashSet<Uuid>,
    error: Option<String>,
}

impl InvitesView {
    pub fn new() -> Self {
        Self {
            show_create_dialog: false,
            email: String::new(),
            role: GlobalRole::Member,
            validity_days: "7".to_string(),
            default_ministries: HashSet::new(),
            error: None,
        }
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        backend: &BackendClient,
        cache: &QueryCache,
        runtime: &tokio::runtime::Runtime,
        mode: ThemeMode,
    ) {
        let snap = cache.ensure(runtime, invites::invites_key(), {
            let backend = backend.clone();
            move || async move { invites::list_invites(&backend).await }
        });

        ui.horizontal(|ui| {
            ui.heading("Convites");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("+ Novo Convite").clicked() {
                    self.show_create_dialog = true;
                    self.error = None;
                }
            });
        });

        ui.separator();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| match (&snap.data, &snap.error) {
                (None, Some(error)) => {
                    ui.colored_label(theme::DANGER, error);
                }
                (None, None) => {
                    ui.spinner();
                }
                (Some(list), _) => {
                    if list.is_empty() {
                        ui.label(
                            egui::RichText::new("Nenhum convite criado")
                                .italics()
                                .color(theme::text_muted(mode)),
                        );
                    }

                    let now = Utc::now();
                    for invite in list.iter() {
                        let status = invite.status_at(now);

                        ui.group(|ui| {
                            ui.horizontal(|ui| {
                                ui.vertical(|ui| {
                                    ui.horizontal(|ui| {
                                        ui.monospace(&invite.code);
                                        if ui.small_button("Copiar").clicked() {
                                            ui.ctx().copy_text(invite.code.clone());
                                        }
                                    });
                                    ui.label(
                                        egui::RichText::new(&invite.email)
                                            .color(theme::text_muted(mode)),
                                    );
                                });

                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| {
                                        // Only unused invites can be revoked
                                        if status != InviteStatus::Used
                                            && ui.small_button("Excluir").clicked()
                                        {
                                            match runtime.block_on(invites::delete_invite(
                                                backend, invite.id,
                                            )) {
                                                Ok(()) => runtime.block_on(
                                                    cache.invalidate(&invites::invites_key()),
                                                ),
                                                Err(e) => self.error = Some(e.to_string()),
                                            }
                                        }

                                        match status {
                                            InviteStatus::Active => {
                                                ui.colored_label(
                                                    theme::SUCCESS,
                                                    format!(
                                                        "Ativo · {}",
                                                        invites::time_until_expiration(
                                                            invite.expires_at,
                                                            now
                                                        )
                                                    ),
                                                );
                                            }
                                            InviteStatus::Used => {
                                                ui.colored_label(
                                                    theme::text_muted(mode),
                                                    "Usado",
                                                );
                                            }
                                            InviteStatus::Expired => {
                                                ui.colored_label(theme::DANGER, "Expirado");
                                            }
                                        }
                                    },
                                );
                            });
                        });
                        ui.add_space(4.0);
                    }

                    if let Some(error) = &self.error {
                        ui.colored_label(theme::DANGER, error);
                    }
                }
            });

        self.create_dialog(ui, backend, cache, runtime);
    }

    fn create_dialog(
        &mut self,
        ui: &mut egui::Ui,
        backend: &BackendClient,
        cache: &QueryCache,
        runtime: &tokio::runtime::Runtime,
    ) {
        if !self.show_create_dialog {
            return;
        }

        let ministries_snap = cache.ensure(runtime, ministries::ministries_key(), {
            let backend = backend.clone();
            move || async move { ministries::list_ministries(&backend).await }
        });

        egui::Window::new("Novo Convite")
            .collapsible(false)
            .resizable(false)
            .show(ui.ctx(), |ui| {
                ui.horizontal(|ui| {
                    ui.label("E-mail:");
                    ui.text_edit_singleline(&mut self.email);
                });

                egui::ComboBox::from_label("Função")
                    .selected_text(match self.role {
                        GlobalRole::Member => "Membro",
                        GlobalRole::Leader => "Líder",
                        GlobalRole::Pastor => "Pastor",
                    })
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.role, GlobalRole::Member, "Membro");
                        ui.selectable_value(&mut self.role, GlobalRole::Leader, "Líder");
                    });

                ui.horizontal(|ui| {
                    ui.label("Validade (dias):");
                    ui.text_edit_singleline(&mut self.validity_days);
                });

                ui.label("Ministérios padrão:");
                if let Some(list) = &ministries_snap.data {
                    for ministry in list.iter() {
                        let mut checked = self.default_ministries.contains(&ministry.id);
                        if ui.checkbox(&mut checked, &ministry.name).changed() {
                            if checked {
                                self.default_ministries.insert(ministry.id);
                            } else {
                                self.default_ministries.remove(&ministry.id);
                            }
                        }
                    }
                }

                if let Some(error) = &self.error {
                    ui.colored_label(theme::DANGER, error);
                }

                ui.horizontal(|ui| {
                    if ui.button("Criar").clicked() {
                        if self.email.trim().is_empty() {
                            self.error = Some("Informe o e-mail do convidado".to_string());
                        } else if let Ok(days) = self.validity_days.trim().parse::<i64>() {
                            let user_id = runtime.block_on(backend.user_id()).unwrap_or_default();
                            let data = invites::CreateInvite {
                                email: self.email.clone(),
                                global_role: self.role,
                                ministries_default: self.default_ministries.iter().copied().collect(),
                                validity_days: days,
                            };

                            match runtime.block_on(invites::create_invite(backend, &data, user_id))
                            {
                                Ok(_) => {
                                    runtime.block_on(cache.invalidate(&invites::invites_key()));
                                    self.email.clear();
                                    self.role = GlobalRole::Member;
                                    self.validity_days = "7".to_string();
                                    self.default_ministries.clear();
                                    self.show_create_dialog = false;
                                    self.error = None;
                                }
                                Err(e) => self.error = Some(e.to_string()),
                            }
                        } else {
                            self.error = Some("Validade inválida".to_string());
                        }
                    }

                    if ui.button("Cancelar").clicked() {
                        self.show_create_dialog = false;
                        self.error = None;
                    }
                });
            });
    }
}

impl Default for InvitesView {
    fn default() -> Self {
        Self::new()
    }
}
