use eframe::egui;
use uuid::Uuid;

use crate::backend::BackendClient;
use crate::cache::QueryCache;
use crate::data::{announcements, ministries};
use crate::state::{Session, ThemeMode};

use super::{format, theme};

pub struct AnnouncementsView {
    show_create_dialog: bool,
    title: String,
    content: String,
    is_global: bool,
    ministry_choice: Option<Uuid>,
    error: Option<String>,
}

impl AnnouncementsView {
    pub fn new() -> Self {
        Self {
            show_create_dialog: false,
            title: String::new(),
            content: String::new(),
            is_global: true,
            ministry_choice: None,
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
    ) {
        let caps = runtime.block_on(session.capabilities());

        let snap = cache.ensure(runtime, announcements::announcements_key(), {
            let backend = backend.clone();
            move || async move { announcements::list_announcements(&backend).await }
        });

        ui.horizontal(|ui| {
            ui.heading("Avisos");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if caps.create_announcements && ui.button("+ Novo Aviso").clicked() {
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
                            egui::RichText::new("Nenhum aviso publicado")
                                .italics()
                                .color(theme::text_muted(mode)),
                        );
                    }
                    for announcement in list.iter() {
                        ui.group(|ui| {
                            ui.horizontal(|ui| {
                                ui.label(egui::RichText::new(&announcement.title).strong());
                                let scope = if announcement.is_global {
                                    "Geral"
                                } else {
                                    announcement
                                        .ministry
                                        .as_ref()
                                        .map(|m| m.name.as_str())
                                        .unwrap_or("Ministério")
                                };
                                ui.label(
                                    egui::RichText::new(scope).small().color(theme::PRIMARY),
                                );
                            });
                            ui.label(&announcement.content);

                            let author = announcement
                                .author
                                .as_ref()
                                .map(|a| a.name.as_str())
                                .unwrap_or("Desconhecido");
                            ui.label(
                                egui::RichText::new(format!(
                                    "{} · {}",
                                    author,
                                    format::date_time(announcement.created_at)
                                ))
                                .small()
                                .color(theme::text_muted(mode)),
                            );
                        });
                        ui.add_space(4.0);
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

        egui::Window::new("Novo Aviso")
            .collapsible(false)
            .resizable(false)
            .show(ui.ctx(), |ui| {
                ui.horizontal(|ui| {
                    ui.label("Título:");
                    ui.text_edit_singleline(&mut self.title);
                });
                ui.label("Conteúdo:");
                ui.text_edit_multiline(&mut self.content);

                ui.checkbox(&mut self.is_global, "Aviso geral (toda a igreja)");

                if !self.is_global {
                    let selected_name = self
                        .ministry_choice
                        .and_then(|id| {
                            ministries_snap
                                .data
                                .as_ref()
                                .and_then(|list| list.iter().find(|m| m.id == id))
                                .map(|m| m.name.clone())
                        })
                        .unwrap_or_else(|| "Selecione...".to_string());

                    egui::ComboBox::from_label("Ministério")
                        .selected_text(selected_name)
                        .show_ui(ui, |ui| {
                            if let Some(list) = &ministries_snap.data {
                                for ministry in list.iter() {
                                    ui.selectable_value(
                                        &mut self.ministry_choice,
                                        Some(ministry.id),
                                        &ministry.name,
                                    );
                                }
                            }
                        });
                }

                if let Some(error) = &self.error {
                    ui.colored_label(theme::DANGER, error);
                }

                ui.horizontal(|ui| {
                    if ui.button("Publicar").clicked() {
                        if self.title.trim().is_empty() || self.content.trim().is_empty() {
                            self.error = Some("Preencha todos os campos".to_string());
                        } else if !self.is_global && self.ministry_choice.is_none() {
                            self.error = Some("Selecione o ministério".to_string());
                        } else {
                            let author_id =
                                runtime.block_on(backend.user_id()).unwrap_or_default();
                            let ministry_id = if self.is_global {
                                None
                            } else {
                                self.ministry_choice
                            };

                            let result = runtime.block_on(announcements::create_announcement(
                                backend,
                                self.title.trim(),
                                self.content.trim(),
                                author_id,
                                self.is_global,
                                ministry_id,
                            ));

                            match result {
                                Ok(_) => {
                                    runtime.block_on(
                                        cache.invalidate(&announcements::announcements_key()),
                                    );
                                    self.title.clear();
                                    self.content.clear();
                                    self.is_global = true;
                                    self.ministry_choice = None;
                                    self.show_create_dialog = false;
                                    self.error = None;
                                }
                                Err(e) => self.error = Some(e.to_string()),
                            }
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

impl Default for AnnouncementsView {
    fn default() -> Self {
        Self::new()
    }
}
