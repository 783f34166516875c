//! Sign-in / sign-up screen shown while nobody is signed in.

use std::time::Duration;

use super::state::{AuthMessage, AuthMode};
use super::TimeboxApp;
use crate::services::auth::{AuthError, FieldErrors, SignUpOutcome, OAUTH_PROVIDER};
use egui::{Color32, RichText};

const FORM_WIDTH: f32 = 320.0;
const OAUTH_POLL_INTERVAL: Duration = Duration::from_millis(250);

impl TimeboxApp {
    pub(super) fn render_auth_panel(&mut self, ctx: &egui::Context) {
        let mut submit = false;
        let mut toggle = false;
        let mut oauth = false;
        let mut cancel_oauth = false;
        let waiting = self.auth.as_ref().is_some_and(|auth| auth.oauth_pending());

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.15);
                ui.set_max_width(FORM_WIDTH);

                let form = &mut self.state.auth_form;
                let title = match form.mode {
                    AuthMode::SignIn => "Sign in to Timebox Notes",
                    AuthMode::SignUp => "Create your account",
                };
                ui.heading(title);
                ui.add_space(16.0);

                ui.label("Email");
                let email = ui.add(
                    egui::TextEdit::singleline(&mut form.email)
                        .hint_text("you@example.com")
                        .desired_width(FORM_WIDTH),
                );
                field_errors(ui, &form.errors.email);
                ui.add_space(8.0);

                ui.label("Password");
                let password = ui.add(
                    egui::TextEdit::singleline(&mut form.password)
                        .password(true)
                        .desired_width(FORM_WIDTH),
                );
                field_errors(ui, &form.errors.password);
                ui.add_space(12.0);

                let enter = (email.lost_focus() || password.lost_focus())
                    && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let label = match form.mode {
                    AuthMode::SignIn => "Sign In",
                    AuthMode::SignUp => "Sign Up",
                };
                if ui.add_sized([FORM_WIDTH, 30.0], egui::Button::new(label)).clicked() || enter {
                    submit = true;
                }

                ui.add_space(8.0);
                if waiting {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Waiting for the browser…");
                        if ui.button("Cancel").clicked() {
                            cancel_oauth = true;
                        }
                    });
                } else if ui
                    .add_sized([FORM_WIDTH, 30.0], egui::Button::new("Continue with Google"))
                    .clicked()
                {
                    oauth = true;
                }

                ui.add_space(12.0);
                let switch = match form.mode {
                    AuthMode::SignIn => "Don't have an account? Sign up",
                    AuthMode::SignUp => "Already have an account? Sign in",
                };
                if ui.link(switch).clicked() {
                    toggle = true;
                }

                if let Some(message) = &form.message {
                    ui.add_space(12.0);
                    match message {
                        AuthMessage::Info(text) => {
                            ui.label(RichText::new(text).color(Color32::from_rgb(30, 140, 60)));
                        }
                        AuthMessage::Error(text) => {
                            ui.label(RichText::new(text).color(Color32::from_rgb(200, 50, 50)));
                        }
                    }
                }
            });
        });

        if toggle {
            self.state.auth_form.toggle_mode();
        }
        if submit {
            self.submit_auth_form();
        }
        if oauth {
            self.start_oauth();
        }
        if cancel_oauth {
            if let Some(auth) = self.auth.as_mut() {
                auth.cancel_oauth();
            }
            self.state.auth_form.message = None;
        }
    }

    fn submit_auth_form(&mut self) {
        let Some(auth) = self.auth.as_mut() else {
            return;
        };
        let form = &mut self.state.auth_form;
        form.errors = FieldErrors::default();
        form.message = None;

        let result = match form.mode {
            AuthMode::SignIn => auth.sign_in(&form.email, &form.password).map(|_| None),
            AuthMode::SignUp => auth.sign_up(&form.email, &form.password).map(|outcome| match outcome {
                SignUpOutcome::SignedIn => None,
                SignUpOutcome::ConfirmationRequired => outcome.message(),
            }),
        };

        match result {
            Ok(info) => {
                form.password.clear();
                form.message = info.map(|text| AuthMessage::Info(text.to_string()));
                if self.auth.as_ref().is_some_and(|auth| auth.current_session().is_some()) {
                    self.toasts.success("Signed in");
                }
            }
            Err(AuthError::Validation(errors)) => form.errors = errors,
            Err(err) => {
                log::warn!("Authentication failed: {}", err);
                form.message = Some(AuthMessage::Error(err.to_string()));
            }
        }
    }

    fn start_oauth(&mut self) {
        let Some(auth) = self.auth.as_mut() else {
            return;
        };
        let form = &mut self.state.auth_form;
        form.message = None;

        match auth.start_oauth(OAUTH_PROVIDER, self.config.identity.callback_port) {
            Ok(url) => {
                log::info!("Opening {} sign-in in the browser", OAUTH_PROVIDER);
                if let Err(err) = webbrowser::open(&url) {
                    auth.cancel_oauth();
                    form.message = Some(AuthMessage::Error(format!("Could not open the browser: {}", err)));
                }
            }
            Err(err) => form.message = Some(AuthMessage::Error(err.to_string())),
        }
    }

    /// Pick up the result of a browser sign-in started by [`Self::start_oauth`].
    pub(super) fn poll_oauth(&mut self, ctx: &egui::Context) {
        let Some(auth) = self.auth.as_mut() else {
            return;
        };
        if !auth.oauth_pending() {
            return;
        }

        match auth.poll_oauth() {
            None => ctx.request_repaint_after(OAUTH_POLL_INTERVAL),
            Some(Ok(_)) => {
                self.state.auth_form.password.clear();
                self.state.auth_form.message = None;
                self.toasts.success("Signed in");
            }
            Some(Err(AuthError::Cancelled)) => {}
            Some(Err(err)) => {
                log::warn!("OAuth sign-in failed: {}", err);
                self.state.auth_form.message = Some(AuthMessage::Error(err.to_string()));
            }
        }
    }
}

fn field_errors(ui: &mut egui::Ui, errors: &[String]) {
    for error in errors {
        ui.label(RichText::new(error).small().color(Color32::from_rgb(200, 50, 50)));
    }
}
