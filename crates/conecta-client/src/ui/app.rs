use eframe::egui;

use crate::backend::{BackendClient, BackendConfig};
use crate::cache::QueryCache;
use crate::state::{PersistentSettings, Session};

use super::login::LoginView;
use super::main_view::MainView;
use super::theme;

pub struct ConectaApp {
    backend: BackendClient,
    cache: QueryCache,
    session: Session,
    settings: PersistentSettings,
    runtime: tokio::runtime::Runtime,
    view: View,
    login_view: LoginView,
    main_view: MainView,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum View {
    Login,
    Main,
}

impl ConectaApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = PersistentSettings::load();
        theme::apply(&cc.egui_ctx, settings.theme);

        let mut style = (*cc.egui_ctx.style()).clone();
        style.spacing.item_spacing = egui::vec2(8.0, 8.0);
        cc.egui_ctx.set_style(style);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("Failed to create Tokio runtime");

        let backend = BackendClient::new(BackendConfig::from_env());

        Self {
            backend,
            cache: QueryCache::new(),
            session: Session::new(),
            settings,
            runtime,
            view: View::Login,
            login_view: LoginView::new(),
            main_view: MainView::new(),
        }
    }
}

impl eframe::App for ConectaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Request continuous repainting so realtime merges show up
        ctx.request_repaint();

        match self.view {
            View::Login => {
                if self.login_view.show(ctx, &self.backend, &self.runtime) {
                    // Load the profile before the authenticated stack renders
                    self.runtime.block_on(self.session.load(&self.backend));
                    self.view = View::Main;
                    self.login_view = LoginView::new();
                }
            }
            View::Main => {
                // Session presence gates the stacks: sign-out and account
                // deletion drop the session, so the root switches here.
                if !self.runtime.block_on(self.backend.is_authenticated()) {
                    self.view = View::Login;
                    self.main_view = MainView::new();
                    return;
                }

                self.main_view.show(
                    ctx,
                    &self.backend,
                    &self.cache,
                    &self.session,
                    &self.runtime,
                    &mut self.settings,
                );
            }
        }
    }
}
