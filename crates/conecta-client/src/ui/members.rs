use eframe::egui;
use uuid::Uuid;

use conecta_protocol::MinistryRole;

use crate::backend::BackendClient;
use crate::cache::QueryCache;
use crate::data::members::{self, UserSearchResult};
use crate::data::profiles;
use crate::state::{Session, ThemeMode};

use super::{format, theme};

pub struct MembersView {
    show_add_dialog: bool,
    search: String,
    search_results: Vec<UserSearchResult>,
    searched: bool,
    add_role: MinistryRole,
    report_target: Option<(Uuid, String)>,
    report_reason: String,
    report_details: String,
    error: Option<String>,
}

impl MembersView {
    pub fn new() -> Self {
        Self {
            show_add_dialog: false,
            search: String::new(),
            search_results: Vec::new(),
            searched: false,
            add_role: MinistryRole::Member,
            report_target: None,
            report_reason: String::new(),
            report_details: String::new(),
            error: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        backend: &BackendClient,
        cache: &QueryCache,
        session: &Session,
        runtime: &tokio::runtime::Runtime,
        mode: ThemeMode,
        ministry_id: Uuid,
        ministry_name: &str,
    ) {
        let caps = runtime.block_on(session.capabilities());
        let current_user = runtime.block_on(backend.user_id());

        let snap = cache.ensure(runtime, members::ministry_members_key(ministry_id), {
            let backend = backend.clone();
            move || async move { members::list_ministry_members(&backend, ministry_id).await }
        });

        ui.horizontal(|ui| {
            ui.heading(format!("Membros — {}", ministry_name));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if caps.manage_ministry_members && ui.button("+ Adicionar").clicked() {
                    self.show_add_dialog = true;
                    self.search.clear();
                    self.search_results.clear();
                    self.searched = false;
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
                    ui.label(
                        egui::RichText::new(format!("MEMBROS — {}", list.len()))
                            .small()
                            .color(theme::text_muted(mode)),
                    );
                    ui.add_space(4.0);

                    for member in list.iter() {
                        let name = member
                            .profile
                            .as_ref()
                            .map(|p| p.name.as_str())
                            .unwrap_or("Desconhecido");

                        ui.horizontal(|ui| {
                            // Avatar circle with the first letter
                            let (response, painter) = ui
                                .allocate_painter(egui::vec2(32.0, 32.0), egui::Sense::hover());
                            let rect = response.rect;
                            painter.circle_filled(rect.center(), 14.0, theme::AVATAR_BG);
                            painter.text(
                                rect.center(),
                                egui::Align2::CENTER_CENTER,
                                format::initial(name),
                                egui::FontId::proportional(12.0),
                                egui::Color32::WHITE,
                            );

                            ui.add_space(4.0);

                            ui.vertical(|ui| {
                                ui.label(name);
                                if member.role == MinistryRole::Leader {
                                    ui.label(
                                        egui::RichText::new("LÍDER")
                                            .small()
                                            .color(theme::WARNING),
                                    );
                                }
                            });

                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    if caps.manage_ministry_members
                                        && ui.small_button("Remover").clicked()
                                    {
                                        let result = runtime.block_on(members::remove_member(
                                            backend, member.id,
                                        ));
                                        match result {
                                            Ok(()) => runtime.block_on(cache.invalidate(
                                                &members::ministry_members_key(ministry_id),
                                            )),
                                            Err(e) => self.error = Some(e.to_string()),
                                        }
                                    }

                                    if current_user != Some(member.user_id)
                                        && ui
                                            .small_button("⚠")
                                            .on_hover_text("Denunciar usuário")
                                            .clicked()
                                    {
                                        self.report_target =
                                            Some((member.user_id, name.to_string()));
                                        self.report_reason.clear();
                                        self.report_details.clear();
                                        self.error = None;
                                    }
                                },
                            );
                        });
                        ui.add_space(2.0);
                    }

                    if let Some(error) = &self.error {
                        ui.add_space(8.0);
                        ui.colored_label(theme::DANGER, error);
                    }
                }
            });

        self.add_dialog(ui, backend, cache, runtime, ministry_id);
        self.report_dialog(ui, backend, runtime);
    }

    fn add_dialog(
        &mut self,
        ui: &mut egui::Ui,
        backend: &BackendClient,
        cache: &QueryCache,
        runtime: &tokio::runtime::Runtime,
        ministry_id: Uuid,
    ) {
        if !self.show_add_dialog {
            return;
        }

        egui::Window::new("Adicionar Membro")
            .collapsible(false)
            .resizable(false)
            .show(ui.ctx(), |ui| {
                ui.horizontal(|ui| {
                    ui.label("Buscar:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.search)
                            .hint_text("Buscar nome ou email..."),
                    );
                    if ui.button("Buscar").clicked() {
                        match runtime.block_on(members::users_not_in_ministry(
                            backend,
                            ministry_id,
                            self.search.trim(),
                        )) {
                            Ok(results) => {
                                self.search_results = results;
                                self.searched = true;
                                self.error = None;
                            }
                            Err(e) => self.error = Some(e.to_string()),
                        }
                    }
                });

                egui::ComboBox::from_label("Função")
                    .selected_text(match self.add_role {
                        MinistryRole::Member => "Membro",
                        MinistryRole::Leader => "Líder",
                    })
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.add_role, MinistryRole::Member, "Membro");
                        ui.selectable_value(&mut self.add_role, MinistryRole::Leader, "Líder");
                    });

                ui.add_space(4.0);

                if self.searched && self.search_results.is_empty() {
                    ui.label("Nenhum usuário encontrado");
                }

                let mut added = false;
                let results = self.search_results.clone();
                for result in &results {
                    ui.horizontal(|ui| {
                        ui.label(format!("{} ({})", result.name, result.email));
                        if ui.small_button("Adicionar").clicked() {
                            match runtime.block_on(members::add_member(
                                backend,
                                ministry_id,
                                result.id,
                                self.add_role,
                            )) {
                                Ok(()) => {
                                    runtime.block_on(
                                        cache.invalidate(&members::ministry_members_key(
                                            ministry_id,
                                        )),
                                    );
                                    added = true;
                                }
                                Err(e) => self.error = Some(e.to_string()),
                            }
                        }
                    });
                }
                if added {
                    self.search_results.clear();
                    self.searched = false;
                }

                if let Some(error) = &self.error {
                    ui.colored_label(theme::DANGER, error);
                }

                if ui.button("Fechar").clicked() {
                    self.show_add_dialog = false;
                    self.error = None;
                }
            });
    }

    fn report_dialog(
        &mut self,
        ui: &mut egui::Ui,
        backend: &BackendClient,
        runtime: &tokio::runtime::Runtime,
    ) {
        let Some((target_id, target_name)) = self.report_target.clone() else {
            return;
        };

        egui::Window::new("Denunciar Usuário")
            .collapsible(false)
            .resizable(false)
            .show(ui.ctx(), |ui| {
                ui.label(format!("Denunciar {}", target_name));

                ui.horizontal(|ui| {
                    ui.label("Motivo:");
                    ui.text_edit_singleline(&mut self.report_reason);
                });
                ui.horizontal(|ui| {
                    ui.label("Detalhes:");
                    ui.text_edit_singleline(&mut self.report_details);
                });

                if let Some(error) = &self.error {
                    ui.colored_label(theme::DANGER, error);
                }

                ui.horizontal(|ui| {
                    if ui.button("Enviar").clicked() {
                        if self.report_reason.trim().is_empty() {
                            self.error = Some("Informe o motivo".to_string());
                        } else {
                            let reporter = runtime.block_on(backend.user_id());
                            let details = match self.report_details.trim() {
                                "" => None,
                                d => Some(d),
                            };

                            let result = runtime.block_on(profiles::report_user(
                                backend,
                                reporter.unwrap_or_default(),
                                target_id,
                                self.report_reason.trim(),
                                details,
                            ));

                            match result {
                                Ok(()) => {
                                    self.report_target = None;
                                    self.error = None;
                                }
                                Err(e) => self.error = Some(e.to_string()),
                            }
                        }
                    }

                    if ui.button("Cancelar").clicked() {
                        self.report_target = None;
                        self.error = None;
                    }
                });
            });
    }
}

impl Default for MembersView {
    fn default() -> Self {
        Self::new()
    }
}
