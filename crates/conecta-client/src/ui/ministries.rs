use eframe::egui;
use uuid::Uuid;

use crate::backend::BackendClient;
use crate::cache::QueryCache;
use crate::data::ministries;
use crate::state::{Session, ThemeMode};

use super::{format, theme};

/// Navigation requests raised by the ministries screen
pub enum MinistriesAction {
    OpenChannel { ministry_id: Uuid, name: String },
    OpenMembers { ministry_id: Uuid, name: String },
}

pub struct MinistriesView {
    show_create_dialog: bool,
    new_name: String,
    new_description: String,
    editing: Option<Uuid>,
    edit_name: String,
    edit_description: String,
    error: Option<String>,
}

impl MinistriesView {
    pub fn new() -> Self {
        Self {
            show_create_dialog: false,
            new_name: String::new(),
            new_description: String::new(),
            editing: None,
            edit_name: String::new(),
            edit_description: String::new(),
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
    ) -> Option<MinistriesAction> {
        let mut action = None;

        let caps = runtime.block_on(session.capabilities());

        let snap = cache.ensure(runtime, ministries::ministries_key(), {
            let backend = backend.clone();
            move || async move { ministries::list_ministries(&backend).await }
        });

        ui.horizontal(|ui| {
            ui.heading("Ministérios");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if caps.manage_ministries && ui.button("+ Novo Ministério").clicked() {
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
                            egui::RichText::new("Nenhum ministério cadastrado")
                                .italics()
                                .color(theme::text_muted(mode)),
                        );
                    }
                    for ministry in list.iter() {
                        ui.group(|ui| {
                            ui.horizontal(|ui| {
                                ui.vertical(|ui| {
                                    ui.label(egui::RichText::new(&ministry.name).strong());
                                    ui.label(
                                        egui::RichText::new(format::description_or_default(
                                            ministry.description.as_deref(),
                                        ))
                                        .color(theme::text_muted(mode)),
                                    );
                                });

                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| {
                                        if caps.manage_ministries
                                            && ui.small_button("Editar").clicked()
                                        {
                                            self.editing = Some(ministry.id);
                                            self.edit_name = ministry.name.clone();
                                            self.edit_description = ministry
                                                .description
                                                .clone()
                                                .unwrap_or_default();
                                            self.error = None;
                                        }
                                        if ui.small_button("Membros").clicked() {
                                            action = Some(MinistriesAction::OpenMembers {
                                                ministry_id: ministry.id,
                                                name: ministry.name.clone(),
                                            });
                                        }
                                        if ui.small_button("Abrir canal").clicked() {
                                            action = Some(MinistriesAction::OpenChannel {
                                                ministry_id: ministry.id,
                                                name: ministry.name.clone(),
                                            });
                                        }
                                    },
                                );
                            });
                        });
                        ui.add_space(4.0);
                    }
                }
            });

        self.create_dialog(ui, backend, cache, runtime);
        self.edit_dialog(ui, backend, cache, runtime);

        action
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

        egui::Window::new("Novo Ministério")
            .collapsible(false)
            .resizable(false)
            .show(ui.ctx(), |ui| {
                ui.horizontal(|ui| {
                    ui.label("Nome:");
                    ui.text_edit_singleline(&mut self.new_name);
                });
                ui.horizontal(|ui| {
                    ui.label("Descrição:");
                    ui.text_edit_singleline(&mut self.new_description);
                });

                if let Some(error) = &self.error {
                    ui.colored_label(theme::DANGER, error);
                }

                ui.horizontal(|ui| {
                    if ui.button("Criar").clicked() {
                        if self.new_name.trim().is_empty() {
                            self.error = Some("Informe o nome do ministério".to_string());
                        } else {
                            let user_id = runtime.block_on(backend.user_id());
                            let description = match self.new_description.trim() {
                                "" => None,
                                d => Some(d),
                            };

                            let result = runtime.block_on(ministries::create_ministry(
                                backend,
                                self.new_name.trim(),
                                description,
                                user_id.unwrap_or_default(),
                            ));

                            match result {
                                Ok(_) => {
                                    runtime
                                        .block_on(cache.invalidate(&ministries::ministries_key()));
                                    self.new_name.clear();
                                    self.new_description.clear();
                                    self.show_create_dialog = false;
                                    self.error = None;
                                }
                                Err(e) => self.error = Some(e.to_string()),
                            }
                        }
                    }

                    if ui.button("Cancelar").clicked() {
                        self.new_name.clear();
                        self.new_description.clear();
                        self.show_create_dialog = false;
                        self.error = None;
                    }
                });
            });
    }

    fn edit_dialog(
        &mut self,
        ui: &mut egui::Ui,
        backend: &BackendClient,
        cache: &QueryCache,
        runtime: &tokio::runtime::Runtime,
    ) {
        let Some(ministry_id) = self.editing else {
            return;
        };

        egui::Window::new("Editar Ministério")
            .collapsible(false)
            .resizable(false)
            .show(ui.ctx(), |ui| {
                ui.horizontal(|ui| {
                    ui.label("Nome:");
                    ui.text_edit_singleline(&mut self.edit_name);
                });
                ui.horizontal(|ui| {
                    ui.label("Descrição:");
                    ui.text_edit_singleline(&mut self.edit_description);
                });

                if let Some(error) = &self.error {
                    ui.colored_label(theme::DANGER, error);
                }

                ui.horizontal(|ui| {
                    if ui.button("Salvar").clicked() {
                        if self.edit_name.trim().is_empty() {
                            self.error = Some("Informe o nome do ministério".to_string());
                        } else {
                            let description = match self.edit_description.trim() {
                                "" => None,
                                d => Some(d),
                            };

                            let result = runtime.block_on(ministries::update_ministry(
                                backend,
                                ministry_id,
                                self.edit_name.trim(),
                                description,
                            ));

                            match result {
                                Ok(_) => {
                                    runtime
                                        .block_on(cache.invalidate(&ministries::ministries_key()));
                                    self.editing = None;
                                    self.error = None;
                                }
                                Err(e) => self.error = Some(e.to_string()),
                            }
                        }
                    }

                    if ui.button("Cancelar").clicked() {
                        self.editing = None;
                        self.error = None;
                    }
                });
            });
    }
}

impl Default for MinistriesView {
    fn default() -> Self {
        Self::new()
    }
}
