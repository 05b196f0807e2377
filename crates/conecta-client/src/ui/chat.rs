use eframe::egui;
use uuid::Uuid;

use conecta_protocol::{AttachmentKind, Message};

use crate::backend::{content_type_for, validate_attachment, BackendClient};
use crate::cache::merge::merge_by_id;
use crate::cache::QueryCache;
use crate::data::messages::{self, PendingAttachment};
use crate::state::ThemeMode;

use super::{format, theme};

const REACTION_EMOJIS: [&str; 3] = ["🙏", "❤", "🙌"];

/// Navigation request raised by the chat screen
pub enum ChatAction {
    OpenThread { root_id: Uuid },
}

pub struct ChatView {
    message_input: String,
    pending_attachment: Option<PendingAttachment>,
    /// Ministry whose realtime sync this instance currently owns
    synced: Option<Uuid>,
    error: Option<String>,
}

impl ChatView {
    pub fn new() -> Self {
        Self {
            message_input: String::new(),
            pending_attachment: None,
            synced: None,
            error: None,
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
        ministry_name: &str,
    ) -> Option<ChatAction> {
        let mut action = None;

        // One subscription per screen instance; switching ministries tears
        // the old one down and starts fresh.
        if self.synced != Some(ministry_id) {
            if let Some(old) = self.synced.take() {
                let backend = backend.clone();
                runtime.spawn(async move {
                    messages::stop_channel_sync(&backend, old).await;
                });
            }
            self.synced = Some(ministry_id);
            self.message_input.clear();
            self.pending_attachment = None;
            self.error = None;

            runtime.block_on(cache.invalidate(&messages::channel_key(ministry_id)));
            runtime.spawn(messages::run_channel_sync(
                backend.clone(),
                cache.clone(),
                ministry_id,
            ));
        }

        let snap = cache.ensure(runtime, messages::channel_key(ministry_id), {
            let backend = backend.clone();
            move || async move { messages::fetch_channel(&backend, ministry_id).await }
        });

        let current_user = runtime.block_on(backend.user_id());

        ui.vertical(|ui| {
            ui.horizontal(|ui| {
                ui.heading(format!("# {}", ministry_name));
            });

            ui.separator();

            let available_height = ui.available_height() - 80.0;

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .max_height(available_height)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    match (&snap.data, &snap.error) {
                        (None, Some(error)) => {
                            ui.colored_label(theme::DANGER, error);
                        }
                        (None, None) => {
                            ui.spinner();
                        }
                        (Some(list), _) => {
                            if list.is_empty() {
                                ui.label(
                                    egui::RichText::new("Nenhuma mensagem ainda. Diga olá!")
                                        .italics()
                                        .color(theme::text_muted(mode)),
                                );
                            }
                            for message in list.iter() {
                                if let Some(a) = self.render_message(
                                    ui,
                                    message,
                                    current_user,
                                    backend,
                                    cache,
                                    runtime,
                                    mode,
                                    ministry_id,
                                ) {
                                    action = Some(a);
                                }
                                ui.add_space(8.0);
                            }
                        }
                    }
                });

            ui.separator();

            if let Some(file_name) = self.pending_attachment.as_ref().map(|a| a.file_name.clone()) {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(format!("📎 {file_name}"))
                            .color(theme::text_muted(mode)),
                    );
                    if ui.small_button("✕").clicked() {
                        self.pending_attachment = None;
                    }
                });
            }

            if let Some(error) = &self.error {
                ui.colored_label(theme::DANGER, error);
            }

            ui.horizontal(|ui| {
                if ui.button("📎").on_hover_text("Anexar arquivo").clicked() {
                    self.pick_attachment();
                }

                let response = ui.add(
                    egui::TextEdit::multiline(&mut self.message_input)
                        .hint_text("Digite sua mensagem...")
                        .desired_width(ui.available_width() - 80.0)
                        .desired_rows(2)
                        .lock_focus(true),
                );

                // Enter sends, Shift+Enter inserts the newline
                if response.has_focus() {
                    let enter_pressed = ui.input(|i| i.key_pressed(egui::Key::Enter));
                    let shift_held = ui.input(|i| i.modifiers.shift);

                    if enter_pressed && !shift_held {
                        if self.message_input.ends_with('\n') {
                            self.message_input.pop();
                        }
                        self.send(ministry_id, current_user, backend, cache, runtime);
                    }
                }

                if ui.button("Enviar").clicked() {
                    self.send(ministry_id, current_user, backend, cache, runtime);
                }
            });
        });

        action
    }

    #[allow(clippy::too_many_arguments)]
    fn render_message(
        &mut self,
        ui: &mut egui::Ui,
        message: &Message,
        current_user: Option<Uuid>,
        backend: &BackendClient,
        cache: &QueryCache,
        runtime: &tokio::runtime::Runtime,
        mode: ThemeMode,
        ministry_id: Uuid,
    ) -> Option<ChatAction> {
        let mut action = None;

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

            // The relation is one-to-many but only the first attachment is
            // rendered.
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

            ui.horizontal(|ui| {
                for emoji in REACTION_EMOJIS {
                    let count = message
                        .reactions
                        .iter()
                        .filter(|r| r.emoji == emoji)
                        .count();
                    let label = if count > 0 {
                        format!("{emoji} {count}")
                    } else {
                        emoji.to_string()
                    };

                    if ui.small_button(label).clicked() {
                        if let Some(user_id) = current_user {
                            self.toggle_reaction(
                                message, user_id, emoji, backend, cache, runtime, ministry_id,
                            );
                        }
                    }
                }

                if ui
                    .small_button("🧵")
                    .on_hover_text("Abrir thread")
                    .clicked()
                {
                    action = Some(ChatAction::OpenThread {
                        root_id: message.id,
                    });
                }
            });
        });

        action
    }

    fn pick_attachment(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("Imagens ou PDF", &["jpg", "jpeg", "png", "gif", "pdf"])
            .pick_file();

        let Some(path) = picked else {
            return;
        };

        match std::fs::read(&path) {
            Ok(bytes) => {
                let content_type = content_type_for(&path).to_string();
                match validate_attachment(&content_type, bytes.len() as u64) {
                    Ok(()) => {
                        self.error = None;
                        self.pending_attachment = Some(PendingAttachment {
                            file_name: path
                                .file_name()
                                .map(|n| n.to_string_lossy().into_owned())
                                .unwrap_or_else(|| "arquivo".to_string()),
                            content_type,
                            bytes,
                        });
                    }
                    Err(e) => self.error = Some(e.to_string()),
                }
            }
            Err(e) => {
                self.error = Some(format!("Não foi possível ler o arquivo: {e}"));
            }
        }
    }

    fn send(
        &mut self,
        ministry_id: Uuid,
        current_user: Option<Uuid>,
        backend: &BackendClient,
        cache: &QueryCache,
        runtime: &tokio::runtime::Runtime,
    ) {
        let Some(user_id) = current_user else {
            return;
        };
        if self.message_input.trim().is_empty() && self.pending_attachment.is_none() {
            return;
        }

        let content = self.message_input.clone();
        let attachment = self.pending_attachment.take();
        self.message_input.clear();

        let backend = backend.clone();
        let cache = cache.clone();

        runtime.spawn(async move {
            match messages::send_message(&backend, ministry_id, user_id, &content, None, attachment)
                .await
            {
                Ok(sent) => {
                    // Patch so the sender sees it before the realtime echo;
                    // the echo merges idempotently by id.
                    cache
                        .set_query_data::<Vec<Message>, _>(
                            &messages::channel_key(ministry_id),
                            |old| {
                                let mut list = old.cloned().unwrap_or_default();
                                merge_by_id(&mut list, sent, |m| m.id);
                                Some(list)
                            },
                        )
                        .await;
                }
                Err(e) => {
                    tracing::error!("failed to send message: {e:#}");
                }
            }
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn toggle_reaction(
        &self,
        message: &Message,
        user_id: Uuid,
        emoji: &str,
        backend: &BackendClient,
        cache: &QueryCache,
        runtime: &tokio::runtime::Runtime,
        ministry_id: Uuid,
    ) {
        let backend = backend.clone();
        let cache = cache.clone();
        let message = message.clone();
        let emoji = emoji.to_string();

        runtime.spawn(async move {
            match messages::toggle_reaction(&backend, &message, user_id, &emoji).await {
                Ok(updated) => {
                    cache
                        .set_query_data::<Vec<Message>, _>(
                            &messages::channel_key(ministry_id),
                            |old| {
                                let mut list = old.cloned().unwrap_or_default();
                                merge_by_id(&mut list, updated, |m| m.id);
                                Some(list)
                            },
                        )
                        .await;
                }
                Err(e) => {
                    tracing::error!("failed to toggle reaction: {e:#}");
                }
            }
        });
    }

    /// Tear down the realtime subscription when the screen goes away
    pub fn cleanup(&mut self, backend: &BackendClient, runtime: &tokio::runtime::Runtime) {
        if let Some(ministry_id) = self.synced.take() {
            let backend = backend.clone();
            runtime.spawn(async move {
                messages::stop_channel_sync(&backend, ministry_id).await;
            });
        }
        self.message_input.clear();
        self.pending_attachment = None;
        self.error = None;
    }
}

impl Default for ChatView {
    fn default() -> Self {
        Self::new()
    }
}
