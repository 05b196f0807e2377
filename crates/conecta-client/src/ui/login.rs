use eframe::egui;

use crate::backend::BackendClient;
use crate::data::invites;

use super::theme;

pub struct LoginView {
    mode: LoginMode,
    email: String,
    password: String,
    confirm_password: String,
    invite_code: String,
    error: Option<String>,
    is_loading: bool,
}

enum LoginMode {
    Login,
    InviteRegister,
}

impl LoginView {
    pub fn new() -> Self {
        Self {
            mode: LoginMode::Login,
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            invite_code: String::new(),
            error: None,
            is_loading: false,
        }
    }

    /// Returns true once a session exists
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        backend: &BackendClient,
        runtime: &tokio::runtime::Runtime,
    ) -> bool {
        let mut signed_in = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(100.0);

                ui.heading("Conecta");
                ui.label(
                    egui::RichText::new(match self.mode {
                        LoginMode::Login => "Entre com sua conta",
                        LoginMode::InviteRegister => {
                            "Insira seu código de convite para criar sua conta"
                        }
                    })
                    .color(theme::TEXT_MUTED_LIGHT),
                );
                ui.add_space(20.0);

                ui.group(|ui| {
                    ui.set_width(320.0);

                    ui.horizontal(|ui| {
                        ui.label("E-mail:");
                        ui.text_edit_singleline(&mut self.email);
                    });

                    match self.mode {
                        LoginMode::Login => {
                            ui.horizontal(|ui| {
                                ui.label("Senha:");
                                ui.add(
                                    egui::TextEdit::singleline(&mut self.password).password(true),
                                );
                            });

                            ui.add_space(10.0);

                            if ui.button("Entrar").clicked() && !self.is_loading {
                                self.error = None;
                                self.is_loading = true;

                                if self.email.trim().is_empty() || self.password.is_empty() {
                                    self.error = Some("Preencha todos os campos".to_string());
                                } else {
                                    let email = self.email.trim().to_string();
                                    let password = self.password.clone();

                                    match runtime.block_on(backend.sign_in(&email, &password)) {
                                        Ok(_) => signed_in = true,
                                        Err(e) => self.error = Some(e.to_string()),
                                    }
                                }

                                self.is_loading = false;
                            }

                            ui.add_space(5.0);

                            if ui.link("Tenho um código de convite").clicked() {
                                self.mode = LoginMode::InviteRegister;
                                self.error = None;
                            }
                        }
                        LoginMode::InviteRegister => {
                            ui.horizontal(|ui| {
                                ui.label("Código de Convite:");
                                ui.text_edit_singleline(&mut self.invite_code);
                            });

                            ui.horizontal(|ui| {
                                ui.label("Senha:");
                                ui.add(
                                    egui::TextEdit::singleline(&mut self.password).password(true),
                                );
                            });

                            ui.horizontal(|ui| {
                                ui.label("Confirmar Senha:");
                                ui.add(
                                    egui::TextEdit::singleline(&mut self.confirm_password)
                                        .password(true),
                                );
                            });

                            ui.add_space(10.0);

                            if ui.button("Criar Conta").clicked() && !self.is_loading {
                                self.error = None;
                                self.is_loading = true;

                                if self.email.trim().is_empty()
                                    || self.invite_code.trim().is_empty()
                                    || self.password.is_empty()
                                {
                                    self.error = Some("Preencha todos os campos".to_string());
                                } else if self.password != self.confirm_password {
                                    self.error = Some("As senhas não coincidem".to_string());
                                } else {
                                    let email = self.email.trim().to_string();
                                    let code = self.invite_code.trim().to_string();
                                    let password = self.password.clone();

                                    match runtime.block_on(invites::redeem_invite(
                                        backend, &email, &code, &password,
                                    )) {
                                        Ok(_) => signed_in = true,
                                        Err(e) => self.error = Some(e.to_string()),
                                    }
                                }

                                self.is_loading = false;
                            }

                            ui.add_space(5.0);

                            if ui.link("Voltar ao Login").clicked() {
                                self.mode = LoginMode::Login;
                                self.error = None;
                            }
                        }
                    }

                    if let Some(error) = &self.error {
                        ui.add_space(10.0);
                        ui.colored_label(theme::DANGER, error);
                    }

                    if self.is_loading {
                        ui.add_space(10.0);
                        ui.spinner();
                    }
                });
            });
        });

        signed_in
    }
}

impl Default for LoginView {
    fn default() -> Self {
        Self::new()
    }
}
