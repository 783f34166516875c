use super::state::AppState;
use super::toast::ToastManager;
use super::{TimeboxApp, LOCAL_USER_ID};
use crate::models::user::UserSession;
use crate::schedule::{DayNavigation, GestureController, ScheduleStore};
use crate::services::auth::{AuthError, AuthService, HostedIdentity};
use crate::services::backend::SqliteBackend;
use crate::services::config::AppConfig;
use chrono::Local;

impl TimeboxApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig, backend: SqliteBackend) -> Self {
        cc.egui_ctx.style_mut(|style| style.spacing.item_spacing = egui::vec2(8.0, 6.0));

        let auth = match HostedIdentity::new(&config.identity.url, &config.identity.anon_key) {
            Ok(provider) => Some(AuthService::new(provider)),
            Err(AuthError::NotConfigured) => {
                log::warn!("No identity provider configured, using the local profile");
                None
            }
            Err(e) => {
                log::error!("Identity provider unavailable ({}), using the local profile", e);
                None
            }
        };
        let local_session = auth.is_none().then(|| UserSession {
            id: LOCAL_USER_ID.to_string(),
            email: String::new(),
            access_token: None,
        });

        let navigation = DayNavigation::from_local_clock();
        let state = AppState::new(navigation.today());

        Self {
            config,
            store: ScheduleStore::new(backend),
            auth,
            local_session,
            navigation,
            gestures: GestureController::new(),
            state,
            toasts: ToastManager::new(),
        }
    }

    pub(super) fn handle_update(&mut self, ctx: &egui::Context) {
        let today = Local::now().date_naive();
        if today != self.navigation.today() {
            log::info!("Date changed to {}", today);
            self.navigation.set_today(today);
        }

        self.poll_oauth(ctx);

        match self.session() {
            Some(session) => {
                self.render_header(ctx, &session);
                self.render_sidebar(ctx, &session);
                self.render_note_panel(ctx, &session);
                self.render_schedule(ctx, &session);
            }
            None => self.render_auth_panel(ctx),
        }

        self.toasts.render(ctx);
    }

    pub(super) fn sign_out(&mut self) {
        if let Some(auth) = self.auth.as_mut() {
            auth.sign_out();
        }
        self.gestures.cancel();
        self.store.clear();
        self.state = AppState::new(self.navigation.today());
        self.toasts.info("Signed out");
    }
}
