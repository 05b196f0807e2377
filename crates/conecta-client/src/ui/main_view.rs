use eframe::egui;
use uuid::Uuid;

use crate::backend::BackendClient;
use crate::cache::QueryCache;
use crate::state::{PersistentSettings, Session};

use super::admin_members::AdminMembersView;
use super::announcements::AnnouncementsView;
use super::chat::{ChatAction, ChatView};
use super::events::{EventDetailsView, EventsAction, EventsView};
use super::home::{HomeAction, HomeView};
use super::invites::InvitesView;
use super::members::MembersView;
use super::ministries::{MinistriesAction, MinistriesView};
use super::profile::{ProfileAction, ProfileView};
use super::settings::SettingsView;
use super::thread_panel::ThreadView;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Tab {
    Home,
    Ministries,
    Events,
    Profile,
}

/// Typed route graph; parameters travel with the route
#[derive(Clone)]
enum Route {
    MinistryChannel { ministry_id: Uuid, name: String },
    Thread { ministry_id: Uuid, root_id: Uuid },
    MinistryMembers { ministry_id: Uuid, name: String },
    EventDetails { event_id: Uuid },
    Announcements,
    Invites,
    AdminMembers,
    Settings,
}

pub struct MainView {
    tab: Tab,
    stack: Vec<Route>,
    home: HomeView,
    ministries: MinistriesView,
    events: EventsView,
    event_details: EventDetailsView,
    profile: ProfileView,
    announcements: AnnouncementsView,
    invites: InvitesView,
    admin_members: AdminMembersView,
    chat: ChatView,
    thread: ThreadView,
    members: MembersView,
    settings_view: SettingsView,
}

impl MainView {
    pub fn new() -> Self {
        Self {
            tab: Tab::Home,
            stack: Vec::new(),
            home: HomeView::new(),
            ministries: MinistriesView::new(),
            events: EventsView::new(),
            event_details: EventDetailsView::new(),
            profile: ProfileView::new(),
            announcements: AnnouncementsView::new(),
            invites: InvitesView::new(),
            admin_members: AdminMembersView::new(),
            chat: ChatView::new(),
            thread: ThreadView::new(),
            members: MembersView::new(),
            settings_view: SettingsView::new(),
        }
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        backend: &BackendClient,
        cache: &QueryCache,
        session: &Session,
        runtime: &tokio::runtime::Runtime,
        settings: &mut PersistentSettings,
    ) {
        let mode = settings.theme;

        // Bottom tab bar; switching tabs resets the route stack
        egui::TopBottomPanel::bottom("tab_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for (tab, label) in [
                    (Tab::Home, "Início"),
                    (Tab::Ministries, "Ministérios"),
                    (Tab::Events, "Eventos"),
                    (Tab::Profile, "Perfil"),
                ] {
                    if ui
                        .selectable_label(self.tab == tab && self.stack.is_empty(), label)
                        .clicked()
                    {
                        self.unwind_stack(backend, runtime);
                        self.tab = tab;
                    }
                }
            });
        });

        // Back bar for stacked routes
        if !self.stack.is_empty() {
            egui::TopBottomPanel::top("back_bar").show(ctx, |ui| {
                if ui.button("← Voltar").clicked() {
                    self.pop_route(backend, runtime);
                }
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            match self.stack.last().cloned() {
                Some(Route::MinistryChannel { ministry_id, name }) => {
                    if let Some(ChatAction::OpenThread { root_id }) = self.chat.show(
                        ui,
                        backend,
                        cache,
                        runtime,
                        mode,
                        ministry_id,
                        &name,
                    ) {
                        self.stack.push(Route::Thread {
                            ministry_id,
                            root_id,
                        });
                    }
                }
                Some(Route::Thread {
                    ministry_id,
                    root_id,
                }) => {
                    self.thread
                        .show(ui, backend, cache, runtime, mode, ministry_id, root_id);
                }
                Some(Route::MinistryMembers { ministry_id, name }) => {
                    self.members.show(
                        ui,
                        backend,
                        cache,
                        session,
                        runtime,
                        mode,
                        ministry_id,
                        &name,
                    );
                }
                Some(Route::EventDetails { event_id }) => {
                    self.event_details
                        .show(ui, backend, cache, runtime, mode, event_id);
                }
                Some(Route::Announcements) => {
                    self.announcements
                        .show(ui, backend, cache, session, runtime, mode);
                }
                Some(Route::Invites) => {
                    self.invites.show(ui, backend, cache, runtime, mode);
                }
                Some(Route::AdminMembers) => {
                    self.admin_members
                        .show(ui, backend, cache, session, runtime, mode);
                }
                Some(Route::Settings) => {
                    self.settings_view
                        .show(ui, backend, cache, session, runtime, settings);
                }
                None => match self.tab {
                    Tab::Home => {
                        match self.home.show(ui, backend, cache, session, runtime, mode) {
                            Some(HomeAction::OpenAnnouncements) => {
                                self.stack.push(Route::Announcements);
                            }
                            Some(HomeAction::OpenChannel { ministry_id, name }) => {
                                self.stack.push(Route::MinistryChannel { ministry_id, name });
                            }
                            None => {}
                        }
                    }
                    Tab::Ministries => {
                        match self
                            .ministries
                            .show(ui, backend, cache, session, runtime, mode)
                        {
                            Some(MinistriesAction::OpenChannel { ministry_id, name }) => {
                                self.stack.push(Route::MinistryChannel { ministry_id, name });
                            }
                            Some(MinistriesAction::OpenMembers { ministry_id, name }) => {
                                self.stack.push(Route::MinistryMembers { ministry_id, name });
                            }
                            None => {}
                        }
                    }
                    Tab::Events => {
                        if let Some(EventsAction::OpenDetails { event_id }) =
                            self.events.show(ui, backend, cache, session, runtime, mode)
                        {
                            self.stack.push(Route::EventDetails { event_id });
                        }
                    }
                    Tab::Profile => {
                        match self
                            .profile
                            .show(ui, backend, cache, session, runtime, mode)
                        {
                            Some(ProfileAction::OpenSettings) => {
                                self.stack.push(Route::Settings);
                            }
                            Some(ProfileAction::OpenInvites) => {
                                self.stack.push(Route::Invites);
                            }
                            Some(ProfileAction::OpenAdminMembers) => {
                                self.stack.push(Route::AdminMembers);
                            }
                            None => {}
                        }
                    }
                },
            }
        });
    }

    /// Pop the top route, releasing any realtime subscription it owned
    fn pop_route(&mut self, backend: &BackendClient, runtime: &tokio::runtime::Runtime) {
        match self.stack.pop() {
            Some(Route::MinistryChannel { .. }) => self.chat.cleanup(backend, runtime),
            Some(Route::Thread { .. }) => self.thread.cleanup(backend, runtime),
            _ => {}
        }
    }

    /// Drop the whole stack (tab switch, sign-out)
    fn unwind_stack(&mut self, backend: &BackendClient, runtime: &tokio::runtime::Runtime) {
        while !self.stack.is_empty() {
            self.pop_route(backend, runtime);
        }
    }
}

impl Default for MainView {
    fn default() -> Self {
        Self::new()
    }
}
