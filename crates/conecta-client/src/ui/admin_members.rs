use eframe::egui;

use conecta_protocol::GlobalRole;

use crate::backend::BackendClient;
use crate::cache::QueryCache;
use crate::data::profiles;
use crate::state::{Session, ThemeMode};

use super::{format, theme};

fn role_label(role: GlobalRole) -> &'static str {
    match role {
        GlobalRole::Member => "Membro",
        GlobalRole::Leader => "Líder",
        GlobalRole::Pastor => "Pastor",
    }
}

/// Church-wide member administration: search and global role changes
pub struct AdminMembersView {
    search: String,
    error: Option<String>,
}

impl AdminMembersView {
    pub fn new() -> Self {
        Self {
            search: String::new(),
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
        let snap = cache.ensure(runtime, profiles::admin_members_key(), {
            let backend = backend.clone();
            move || async move { profiles::list_all_members(&backend).await }
        });

        ui.heading("Membros da Igreja");
        ui.add_space(4.0);
        ui.add(
            egui::TextEdit::singleline(&mut self.search).hint_text("Buscar nome ou email..."),
        );

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
                    let needle = self.search.trim().to_lowercase();
                    let filtered: Vec<_> = list
                        .iter()
                        .filter(|p| {
                            needle.is_empty()
                                || p.name.to_lowercase().contains(&needle)
                                || p.email.to_lowercase().contains(&needle)
                        })
                        .collect();

                    ui.label(
                        egui::RichText::new(format!("MEMBROS — {}", filtered.len()))
                            .small()
                            .color(theme::text_muted(mode)),
                    );
                    ui.add_space(4.0);

                    for profile in filtered {
                        ui.horizontal(|ui| {
                            let (response, painter) = ui
                                .allocate_painter(egui::vec2(32.0, 32.0), egui::Sense::hover());
                            let rect = response.rect;
                            painter.circle_filled(rect.center(), 14.0, theme::AVATAR_BG);
                            painter.text(
                                rect.center(),
                                egui::Align2::CENTER_CENTER,
                                format::initial(&profile.name),
                                egui::FontId::proportional(12.0),
                                egui::Color32::WHITE,
                            );

                            ui.add_space(4.0);

                            ui.vertical(|ui| {
                                ui.label(&profile.name);
                                ui.label(
                                    egui::RichText::new(&profile.email)
                                        .small()
                                        .color(theme::text_muted(mode)),
                                );
                            });

                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    let mut role = profile.global_role;
                                    egui::ComboBox::from_id_salt(profile.id)
                                        .selected_text(role_label(role))
                                        .show_ui(ui, |ui| {
                                            ui.selectable_value(
                                                &mut role,
                                                GlobalRole::Member,
                                                "Membro",
                                            );
                                            ui.selectable_value(
                                                &mut role,
                                                GlobalRole::Leader,
                                                "Líder",
                                            );
                                            ui.selectable_value(
                                                &mut role,
                                                GlobalRole::Pastor,
                                                "Pastor",
                                            );
                                        });

                                    if role != profile.global_role {
                                        match runtime.block_on(profiles::update_member_role(
                                            backend, profile.id, role,
                                        )) {
                                            Ok(()) => {
                                                runtime.block_on(async {
                                                    cache
                                                        .invalidate(&profiles::admin_members_key())
                                                        .await;
                                                    // Changing our own role changes what we may see
                                                    session.refresh(backend).await;
                                                });
                                            }
                                            Err(e) => self.error = Some(e.to_string()),
                                        }
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
    }
}

impl Default for AdminMembersView {
    fn default() -> Self {
        Self::new()
    }
}
