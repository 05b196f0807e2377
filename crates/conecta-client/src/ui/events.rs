use chrono::{Local, NaiveDateTime, TimeZone, Utc};
use eframe::egui;
use uuid::Uuid;

use conecta_protocol::{EventRsvp, RsvpStatus};

use crate::backend::BackendClient;
use crate::cache::QueryCache;
use crate::data::{events, ministries};
use crate::state::{Session, ThemeMode};

use super::{format, theme};

/// Navigation requests raised by the events screen
pub enum EventsAction {
    OpenDetails { event_id: Uuid },
}

pub struct EventsView {
    show_create_dialog: bool,
    title: String,
    description: String,
    location: String,
    date_input: String,
    ministry_choice: Option<Uuid>,
    error: Option<String>,
}

impl EventsView {
    pub fn new() -> Self {
        Self {
            show_create_dialog: false,
            title: String::new(),
            description: String::new(),
            location: String::new(),
            date_input: String::new(),
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
    ) -> Option<EventsAction> {
        let mut action = None;

        let caps = runtime.block_on(session.capabilities());

        let snap = cache.ensure(runtime, events::events_key(), {
            let backend = backend.clone();
            move || async move { events::list_events(&backend).await }
        });

        ui.horizontal(|ui| {
            ui.heading("Eventos");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if caps.create_events && ui.button("+ Novo Evento").clicked() {
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
                            egui::RichText::new("Nenhum evento agendado")
                                .italics()
                                .color(theme::text_muted(mode)),
                        );
                    }
                    for event in list.iter() {
                        ui.group(|ui| {
                            ui.horizontal(|ui| {
                                ui.vertical(|ui| {
                                    ui.label(egui::RichText::new(&event.title).strong());
                                    ui.label(
                                        egui::RichText::new(format!(
                                            "{} · {}",
                                            format::date_time(event.event_date),
                                            event.location
                                        ))
                                        .color(theme::text_muted(mode)),
                                    );
                                    let scope = event
                                        .ministry
                                        .as_ref()
                                        .map(|m| m.name.as_str())
                                        .unwrap_or("Geral");
                                    ui.label(
                                        egui::RichText::new(scope)
                                            .small()
                                            .color(theme::PRIMARY),
                                    );
                                });
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| {
                                        if ui.small_button("Detalhes").clicked() {
                                            action = Some(EventsAction::OpenDetails {
                                                event_id: event.id,
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

        let ministries_snap = cache.ensure(runtime, ministries::ministries_key(), {
            let backend = backend.clone();
            move || async move { ministries::list_ministries(&backend).await }
        });

        egui::Window::new("Novo Evento")
            .collapsible(false)
            .resizable(false)
            .show(ui.ctx(), |ui| {
                ui.horizontal(|ui| {
                    ui.label("Título:");
                    ui.text_edit_singleline(&mut self.title);
                });
                ui.horizontal(|ui| {
                    ui.label("Descrição:");
                    ui.text_edit_singleline(&mut self.description);
                });
                ui.horizontal(|ui| {
                    ui.label("Local:");
                    ui.text_edit_singleline(&mut self.location);
                });
                ui.horizontal(|ui| {
                    ui.label("Data:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.date_input)
                            .hint_text("31/12/2026 19:00"),
                    );
                });

                let selected_name = self
                    .ministry_choice
                    .and_then(|id| {
                        ministries_snap
                            .data
                            .as_ref()
                            .and_then(|list| list.iter().find(|m| m.id == id))
                            .map(|m| m.name.clone())
                    })
                    .unwrap_or_else(|| "Geral".to_string());

                egui::ComboBox::from_label("Ministério")
                    .selected_text(selected_name)
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.ministry_choice, None, "Geral");
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

                if let Some(error) = &self.error {
                    ui.colored_label(theme::DANGER, error);
                }

                ui.horizontal(|ui| {
                    if ui.button("Criar").clicked() {
                        self.submit(backend, cache, runtime);
                    }

                    if ui.button("Cancelar").clicked() {
                        self.show_create_dialog = false;
                        self.error = None;
                    }
                });
            });
    }

    fn submit(
        &mut self,
        backend: &BackendClient,
        cache: &QueryCache,
        runtime: &tokio::runtime::Runtime,
    ) {
        if self.title.trim().is_empty()
            || self.location.trim().is_empty()
            || self.date_input.trim().is_empty()
        {
            self.error = Some("Preencha todos os campos".to_string());
            return;
        }

        let Ok(naive) = NaiveDateTime::parse_from_str(self.date_input.trim(), "%d/%m/%Y %H:%M")
        else {
            self.error = Some("Data inválida. Use o formato 31/12/2026 19:00".to_string());
            return;
        };
        let Some(event_date) = Local
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
        else {
            self.error = Some("Data inválida".to_string());
            return;
        };

        let user_id = runtime.block_on(backend.user_id()).unwrap_or_default();

        let result = runtime.block_on(events::create_event(
            backend,
            self.title.trim(),
            self.description.trim(),
            self.location.trim(),
            event_date,
            self.ministry_choice,
            user_id,
        ));

        match result {
            Ok(_) => {
                runtime.block_on(cache.invalidate(&events::events_key()));
                self.title.clear();
                self.description.clear();
                self.location.clear();
                self.date_input.clear();
                self.ministry_choice = None;
                self.show_create_dialog = false;
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }
}

impl Default for EventsView {
    fn default() -> Self {
        Self::new()
    }
}

pub struct EventDetailsView {
    error: Option<String>,
}

impl EventDetailsView {
    pub fn new() -> Self {
        Self { error: None }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        backend: &BackendClient,
        cache: &QueryCache,
        runtime: &tokio::runtime::Runtime,
        mode: ThemeMode,
        event_id: Uuid,
    ) {
        let events_snap = cache.ensure(runtime, events::events_key(), {
            let backend = backend.clone();
            move || async move { events::list_events(&backend).await }
        });

        let event = events_snap
            .data
            .as_ref()
            .and_then(|list| list.iter().find(|e| e.id == event_id).cloned());

        let Some(event) = event else {
            ui.spinner();
            return;
        };

        let current_user = runtime.block_on(backend.user_id());

        ui.heading(&event.title);
        ui.label(
            egui::RichText::new(format!(
                "{} · {}",
                format::date_time(event.event_date),
                event.location
            ))
            .color(theme::text_muted(mode)),
        );
        if !event.description.is_empty() {
            ui.add_space(4.0);
            ui.label(&event.description);
        }

        ui.separator();

        // The user's own RSVP
        if let Some(user_id) = current_user {
            let rsvp_snap = cache.ensure(runtime, events::user_rsvp_key(event_id, user_id), {
                let backend = backend.clone();
                move || async move { events::get_user_rsvp(&backend, event_id, user_id).await }
            });

            let status = rsvp_snap
                .data
                .as_deref()
                .and_then(|r| r.as_ref())
                .map(|r| r.status);

            ui.horizontal(|ui| {
                match status {
                    Some(RsvpStatus::Confirmed) => {
                        ui.colored_label(theme::SUCCESS, "Presença confirmada");
                    }
                    Some(RsvpStatus::Declined) => {
                        ui.colored_label(theme::DANGER, "Você não vai");
                    }
                    None => {
                        ui.label(
                            egui::RichText::new("Você ainda não respondeu")
                                .color(theme::text_muted(mode)),
                        );
                    }
                }

                if ui.button("Confirmar presença").clicked() {
                    self.set_rsvp(
                        backend,
                        cache,
                        runtime,
                        event_id,
                        user_id,
                        RsvpStatus::Confirmed,
                    );
                }
                if ui.button("Não vou").clicked() {
                    self.set_rsvp(
                        backend,
                        cache,
                        runtime,
                        event_id,
                        user_id,
                        RsvpStatus::Declined,
                    );
                }
                if status.is_some() && ui.small_button("Limpar resposta").clicked() {
                    match runtime.block_on(events::remove_rsvp(backend, event_id, user_id)) {
                        Ok(()) => {
                            runtime.block_on(async {
                                cache
                                    .set_query_data::<Option<EventRsvp>, _>(
                                        &events::user_rsvp_key(event_id, user_id),
                                        |_| Some(None),
                                    )
                                    .await;
                                cache.invalidate(&events::attendees_key(event_id)).await;
                            });
                            self.error = None;
                        }
                        Err(e) => self.error = Some(e.to_string()),
                    }
                }
            });

            if let Some(error) = &self.error {
                ui.colored_label(theme::DANGER, error);
            }
        }

        ui.separator();

        // Confirmed attendees
        let attendees_snap = cache.ensure(runtime, events::attendees_key(event_id), {
            let backend = backend.clone();
            move || async move { events::list_attendees(&backend, event_id).await }
        });

        match (&attendees_snap.data, &attendees_snap.error) {
            (None, Some(error)) => {
                ui.colored_label(theme::DANGER, error);
            }
            (None, None) => {
                ui.spinner();
            }
            (Some(list), _) => {
                ui.label(
                    egui::RichText::new(format!("CONFIRMADOS — {}", list.len()))
                        .small()
                        .color(theme::text_muted(mode)),
                );
                ui.add_space(4.0);
                for rsvp in list.iter() {
                    let name = rsvp
                        .profile
                        .as_ref()
                        .map(|p| p.name.as_str())
                        .unwrap_or("Desconhecido");
                    ui.label(format!("• {}", name));
                }
            }
        }
    }

    fn set_rsvp(
        &mut self,
        backend: &BackendClient,
        cache: &QueryCache,
        runtime: &tokio::runtime::Runtime,
        event_id: Uuid,
        user_id: Uuid,
        status: RsvpStatus,
    ) {
        match runtime.block_on(events::set_rsvp(backend, event_id, user_id, status)) {
            Ok(rsvp) => {
                runtime.block_on(async {
                    // Show the new status immediately, then refresh the
                    // attendee list in the background.
                    cache
                        .set_query_data::<Option<EventRsvp>, _>(
                            &events::user_rsvp_key(event_id, user_id),
                            |_| Some(Some(rsvp)),
                        )
                        .await;
                    cache.invalidate(&events::attendees_key(event_id)).await;
                });
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }
}

impl Default for EventDetailsView {
    fn default() -> Self {
        Self::new()
    }
}
