use eframe::egui;
use uuid::Uuid;

use crate::backend::BackendClient;
use crate::cache::QueryCache;
use crate::data::{announcements, ministries};
use crate::state::{Session, ThemeMode};

use super::{format, theme};

/// Navigation requests raised by the home screen
pub enum HomeAction {
    OpenAnnouncements,
    OpenChannel { ministry_id: Uuid, name: String },
}

pub struct HomeView;

impl HomeView {
    pub fn new() -> Self {
        Self
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        backend: &BackendClient,
        cache: &QueryCache,
        session: &Session,
        runtime: &tokio::runtime::Runtime,
        mode: ThemeMode,
    ) -> Option<HomeAction> {
        let mut action = None;

        let profile = runtime.block_on(session.profile());

        if let Some(profile) = &profile {
            ui.heading(format!("Olá, {}", profile.name));
        } else {
            ui.heading("Olá");
        }
        ui.add_space(8.0);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                // Recent announcements
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new("AVISOS RECENTES")
                            .small()
                            .color(theme::text_muted(mode)),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("Ver todos").clicked() {
                            action = Some(HomeAction::OpenAnnouncements);
                        }
                    });
                });

                let announcements_snap =
                    cache.ensure(runtime, announcements::announcements_key(), {
                        let backend = backend.clone();
                        move || async move { announcements::list_announcements(&backend).await }
                    });

                match (&announcements_snap.data, &announcements_snap.error) {
                    (None, Some(error)) => {
                        ui.colored_label(theme::DANGER, error);
                    }
                    (None, None) => {
                        ui.spinner();
                    }
                    (Some(list), _) => {
                        if list.is_empty() {
                            ui.label(
                                egui::RichText::new("Nenhum aviso no momento")
                                    .italics()
                                    .color(theme::text_muted(mode)),
                            );
                        }
                        for announcement in list.iter().take(3) {
                            ui.group(|ui| {
                                ui.label(egui::RichText::new(&announcement.title).strong());
                                ui.label(&announcement.content);
                                ui.label(
                                    egui::RichText::new(format::date_time(
                                        announcement.created_at,
                                    ))
                                    .small()
                                    .color(theme::text_muted(mode)),
                                );
                            });
                            ui.add_space(4.0);
                        }
                    }
                }

                ui.add_space(12.0);

                // The user's ministries
                ui.label(
                    egui::RichText::new("MEUS MINISTÉRIOS")
                        .small()
                        .color(theme::text_muted(mode)),
                );

                let Some(user_id) = profile.as_ref().map(|p| p.id) else {
                    ui.label(
                        egui::RichText::new("Perfil indisponível")
                            .italics()
                            .color(theme::text_muted(mode)),
                    );
                    return;
                };

                let ministries_snap =
                    cache.ensure(runtime, ministries::user_ministries_key(user_id), {
                        let backend = backend.clone();
                        move || async move {
                            ministries::list_user_ministries(&backend, user_id).await
                        }
                    });

                match (&ministries_snap.data, &ministries_snap.error) {
                    (None, Some(error)) => {
                        ui.colored_label(theme::DANGER, error);
                    }
                    (None, None) => {
                        ui.spinner();
                    }
                    (Some(list), _) => {
                        if list.is_empty() {
                            ui.label(
                                egui::RichText::new("Você ainda não participa de um ministério")
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
                                            if ui.small_button("Abrir canal").clicked() {
                                                action = Some(HomeAction::OpenChannel {
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
                }
            });

        action
    }
}

impl Default for HomeView {
    fn default() -> Self {
        Self::new()
    }
}
