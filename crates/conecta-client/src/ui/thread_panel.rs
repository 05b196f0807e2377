use eframe::egui;
use uuid::Uuid;

use conecta_protocol::{AttachmentKind, Message};

use crate::backend::BackendClient;
use crate::cache::merge::merge_by_id;
use crate::cache::QueryCache;
use crate::data::messages::{self, Thread};
use crate::state::ThemeMode;

use super::{format, theme};

pub struct ThreadView {
    reply_input: String,
    /// Root message whose realtime subscription this instance owns
    synced: Option<Uuid>,
}

impl ThreadView {
    pub fn new() -> Self {
        Self {
            reply_input: String::new(),
            synced: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        backend: &BackendClient,
        cache: &QueryCache,
        runtime: &tokio::runtime::Runtime,
        mode: ThemeMode,
        ministry_id: Uuid,
        root_id: Uuid,
    ) {
        // Own subscription per thread; replaced when another thread opens
        if self.synced != Some(root_id) {
            if let Some(old) = self.synced.take() {
                let backend = backend.clone();
                runtime.spawn(async move {
                    messages::stop_thread_sync(&backend, old).await;
                });
            }
            self.synced = Some(root_id);
            self.reply_input.clear();

            runtime.block_on(cache.invalidate(&messages::thread_key(root_id)));
            runtime.spawn(messages::run_thread_sync(
                backend.clone(),
                cache.clone(),
                root_id,
            ));
        }

        let snap = cache.ensure(runtime, messages::thread_key(root_id), {
            let backend = backend.clone();
            move || async move { messages::fetch_thread(&backend, root_id).await }
        });

        let current_user = runtime.block_on(backend.user_id());

        ui.vertical(|ui| {
            ui.heading("Thread");
            ui.separator();

            let available_height = ui.available_height() - 70.0;

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .max_height(available_height)
                .stick_to_bottom(true)
                .show(ui, |ui| match (&snap.data, &snap.error) {
                    (None, Some(error)) => {
                        ui.colored_label(theme::DANGER, error);
                    }
                    (None, None) => {
                        ui.spinner();
                    }
                    (Some(thread), _) => {
                        render_thread_message(ui, &thread.root, mode);
                        ui.separator();

                        let count = thread.replies.len();
                        ui.label(
                            egui::RichText::new(format!(
                                "{} resposta{}",
                                count,
                                if count == 1 { "" } else { "s" }
                            ))
                            .small()
                            .color(theme::text_muted(mode)),
                        );
                        ui.add_space(8.0);

                        if thread.replies.is_empty() {
                            ui.label(
                                egui::RichText::new("Nenhuma resposta ainda. Comece a conversa!")
                                    .italics()
                                    .color(theme::text_muted(mode)),
                            );
                        } else {
                            for reply in &thread.replies {
                                render_thread_message(ui, reply, mode);
                                ui.add_space(8.0);
                            }
                        }
                    }
                });

            ui.separator();

            ui.horizontal(|ui| {
                let response = ui.add(
                    egui::TextEdit::multiline(&mut self.reply_input)
                        .hint_text("Responder na thread...")
                        .desired_width(ui.available_width() - 80.0)
                        .desired_rows(2)
                        .lock_focus(true),
                );

                if response.has_focus() {
                    let enter_pressed = ui.input(|i| i.key_pressed(egui::Key::Enter));
                    let shift_held = ui.input(|i| i.modifiers.shift);

                    if enter_pressed && !shift_held {
                        if self.reply_input.ends_with('\n') {
                            self.reply_input.pop();
                        }
                        self.send_reply(ministry_id, root_id, current_user, backend, cache, runtime);
                    }
                }

                if ui.button("Responder").clicked() {
                    self.send_reply(ministry_id, root_id, current_user, backend, cache, runtime);
                }
            });
        });
    }

    fn send_reply(
        &mut self,
        ministry_id: Uuid,
        root_id: Uuid,
        current_user: Option<Uuid>,
        backend: &BackendClient,
        cache: &QueryCache,
        runtime: &tokio::runtime::Runtime,
    ) {
        let Some(user_id) = current_user else {
            return;
        };
        if self.reply_input.trim().is_empty() {
            return;
        }

        let content = self.reply_input.clone();
        self.reply_input.clear();

        let backend = backend.clone();
        let cache = cache.clone();

        runtime.spawn(async move {
            match messages::send_message(
                &backend,
                ministry_id,
                user_id,
                &content,
                Some(root_id),
                None,
            )
            .await
            {
                Ok(sent) => {
                    cache
                        .set_query_data::<Thread, _>(&messages::thread_key(root_id), |old| {
                            let mut thread = old?.clone();
                            merge_by_id(&mut thread.replies, sent, |m| m.id);
                            Some(thread)
                        })
                        .await;
                }
                Err(e) => {
                    tracing::error!("failed to send thread reply: {e:#}");
                }
            }
        });
    }

    /// Tear down the realtime subscription when the screen goes away
    pub fn cleanup(&mut self, backend: &BackendClient, runtime: &tokio::runtime::Runtime) {
        if let Some(root_id) = self.synced.take() {
            let backend = backend.clone();
            runtime.spawn(async move {
                messages::stop_thread_sync(&backend, root_id).await;
            });
        }
        self.reply_input.clear();
    }
}

fn render_thread_message(ui: &mut egui::Ui, message: &Message, mode: ThemeMode) {
    let author_name = message
        .author
        .as_ref()
        .map(|a| a.name.as_str())
        .unwrap_or("Desconhecido");

    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(author_name)
                .strong()
                .color(theme::PRIMARY),
        );
        ui.label(
            egui::RichText::new(format::message_time(message.created_at))
                .small()
                .color(theme::text_muted(mode)),
        );
    });

    ui.indent(message.id, |ui| {
        ui.label(&message.content);

        if let Some(att) = message.attachments.first() {
            let icon = match att.file_type {
                AttachmentKind::Image => "🖼",
                AttachmentKind::Document => "📄",
            };
            if ui.link(format!("{icon} {}", att.file_name)).clicked() {
                if let Err(e) = open::that(&att.file_url) {
                    tracing::error!("failed to open attachment: {}", e);
                }
            }
        }
    });
}

impl Default for ThreadView {
    fn default() -> Self {
        Self::new()
    }
}
