//! Identity boundary: sign-in, sign-up, OAuth and sign-out against a hosted
//! identity provider, plus the locally held session.

pub mod callback;
mod hosted;
pub mod validation;

pub use callback::{CallbackListener, PendingOAuth, PkceCodes};
pub use hosted::HostedIdentity;
pub use validation::FieldErrors;

use thiserror::Error;

use crate::models::user::UserSession;

pub const CONFIRM_EMAIL_MESSAGE: &str = "Check your email to confirm your account!";

/// OAuth provider offered on the sign-in screen.
pub const OAUTH_PROVIDER: &str = "google";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Caught locally, nothing was sent.
    #[error("{0}")]
    Validation(FieldErrors),
    /// The provider refused the request.
    #[error("{0}")]
    Rejected(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("sign-in is not configured")]
    NotConfigured,
    #[error("sign-in was cancelled")]
    Cancelled,
}

#[cfg_attr(test, mockall::automock)]
pub trait IdentityProvider {
    fn sign_in(&self, email: &str, password: &str) -> Result<UserSession, AuthError>;

    /// `Ok(None)` means the account exists but the email must be confirmed
    /// before a session is issued.
    fn sign_up(&self, email: &str, password: &str) -> Result<Option<UserSession>, AuthError>;

    /// URL to open in the browser to start a PKCE OAuth sign-in.
    fn authorize_url(
        &self,
        provider: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<String, AuthError>;

    /// Trade the code from the OAuth redirect for a session.
    fn exchange_code(&self, auth_code: &str, code_verifier: &str) -> Result<UserSession, AuthError>;

    fn sign_out(&self, session: &UserSession) -> Result<(), AuthError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn,
    ConfirmationRequired,
}

impl SignUpOutcome {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            SignUpOutcome::SignedIn => None,
            SignUpOutcome::ConfirmationRequired => Some(CONFIRM_EMAIL_MESSAGE),
        }
    }
}

/// Holds the current session and validates forms before calling the
/// provider.
pub struct AuthService<P: IdentityProvider> {
    provider: P,
    session: Option<UserSession>,
    pending: Option<PendingOAuth>,
}

impl<P: IdentityProvider> AuthService<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            session: None,
            pending: None,
        }
    }

    /// `{id, email}` of the signed-in user, if any.
    pub fn current_session(&self) -> Option<&UserSession> {
        self.session.as_ref()
    }

    pub fn sign_in(&mut self, email: &str, password: &str) -> Result<&UserSession, AuthError> {
        validation::validate_sign_in(email, password).map_err(AuthError::Validation)?;

        let session = self.provider.sign_in(email.trim(), password)?;
        log::info!("Signed in as {}", session.id);
        Ok(self.session.insert(session))
    }

    pub fn sign_up(&mut self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        validation::validate_sign_up(email, password).map_err(AuthError::Validation)?;

        match self.provider.sign_up(email.trim(), password)? {
            Some(session) => {
                log::info!("Signed up and signed in as {}", session.id);
                self.session = Some(session);
                Ok(SignUpOutcome::SignedIn)
            }
            None => {
                log::info!("Sign-up for {} awaits email confirmation", email.trim());
                Ok(SignUpOutcome::ConfirmationRequired)
            }
        }
    }

    /// Start listening for an OAuth redirect on `callback_port` and return
    /// the URL to open in the browser. Replaces any sign-in already waiting.
    pub fn start_oauth(&mut self, provider: &str, callback_port: u16) -> Result<String, AuthError> {
        self.cancel_oauth();

        let pkce = PkceCodes::generate();
        let listener = CallbackListener::bind(callback_port)?;
        let url = self
            .provider
            .authorize_url(provider, listener.redirect_uri(), &pkce.challenge)?;
        self.pending = Some(listener.spawn(pkce.verifier));
        log::info!("Started {} sign-in", provider);
        Ok(url)
    }

    pub fn oauth_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Finish a waiting OAuth sign-in once its redirect has arrived.
    ///
    /// `None` while still waiting (or when nothing is waiting).
    pub fn poll_oauth(&mut self) -> Option<Result<&UserSession, AuthError>> {
        let outcome = self.pending.as_ref()?.poll()?;
        let pending = self.pending.take()?;
        let code = match outcome {
            Ok(code) => code,
            Err(err) => return Some(Err(err)),
        };
        Some(self.complete_oauth(&code, pending.verifier()))
    }

    pub fn complete_oauth(&mut self, auth_code: &str, code_verifier: &str) -> Result<&UserSession, AuthError> {
        let session = self.provider.exchange_code(auth_code, code_verifier)?;
        log::info!("Signed in as {} via OAuth", session.id);
        Ok(self.session.insert(session))
    }

    pub fn cancel_oauth(&mut self) {
        if self.pending.take().is_some() {
            log::info!("OAuth sign-in cancelled");
        }
    }

    /// Always clears the local session; a provider failure is only logged.
    pub fn sign_out(&mut self) {
        self.cancel_oauth();
        if let Some(session) = self.session.take() {
            if let Err(err) = self.provider.sign_out(&session) {
                log::warn!("Sign-out request failed for {}: {}", session.id, err);
            }
            log::info!("Signed out {}", session.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    fn session() -> UserSession {
        UserSession {
            id: "u-1".into(),
            email: "test@example.com".into(),
            access_token: Some("tok".into()),
        }
    }

    #[test]
    fn test_invalid_form_never_reaches_provider() {
        let mut provider = MockIdentityProvider::new();
        provider.expect_sign_up().never();
        provider.expect_sign_in().never();

        let mut auth = AuthService::new(provider);
        assert!(matches!(
            auth.sign_up("test@example.com", "abc"),
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(auth.sign_in("bad", "x"), Err(AuthError::Validation(_))));
        assert!(auth.current_session().is_none());
    }

    #[test]
    fn test_sign_in_stores_session() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_sign_in()
            .withf(|email, password| email == "test@example.com" && password == "pw")
            .times(1)
            .returning(|_, _| Ok(session()));

        let mut auth = AuthService::new(provider);
        auth.sign_in(" test@example.com ", "pw").unwrap();
        assert_eq!(auth.current_session().map(|s| s.id.as_str()), Some("u-1"));
    }

    #[test]
    fn test_rejected_sign_in_keeps_signed_out() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_sign_in()
            .returning(|_, _| Err(AuthError::Rejected("Invalid login credentials".into())));

        let mut auth = AuthService::new(provider);
        let err = auth.sign_in("test@example.com", "wrong").unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials");
        assert!(auth.current_session().is_none());
    }

    #[test]
    fn test_sign_up_pending_confirmation() {
        let mut provider = MockIdentityProvider::new();
        provider.expect_sign_up().times(1).returning(|_, _| Ok(None));

        let mut auth = AuthService::new(provider);
        let outcome = auth.sign_up("test@example.com", "StrongP@ss1").unwrap();
        assert_eq!(outcome.message(), Some(CONFIRM_EMAIL_MESSAGE));
        assert!(auth.current_session().is_none());
    }

    #[test]
    fn test_sign_out_clears_session_even_when_provider_fails() {
        let mut provider = MockIdentityProvider::new();
        provider.expect_sign_in().returning(|_, _| Ok(session()));
        provider
            .expect_sign_out()
            .times(1)
            .returning(|_| Err(AuthError::Network("offline".into())));

        let mut auth = AuthService::new(provider);
        auth.sign_in("test@example.com", "pw").unwrap();
        auth.sign_out();
        assert!(auth.current_session().is_none());

        auth.sign_out();
    }

    /// Start an OAuth sign-in against `provider` and return the redirect URI
    /// the listener is waiting on.
    fn start(auth: &mut AuthService<MockIdentityProvider>, redirect: &Arc<Mutex<String>>) -> String {
        let url = auth.start_oauth(OAUTH_PROVIDER, 0).unwrap();
        assert_eq!(url, "https://auth.example.com/authorize");
        assert!(auth.oauth_pending());
        let redirect = redirect.lock().unwrap().clone();
        assert!(redirect.starts_with("http://127.0.0.1:"));
        redirect
    }

    fn mock_authorize(provider: &mut MockIdentityProvider) -> Arc<Mutex<String>> {
        let redirect = Arc::new(Mutex::new(String::new()));
        let captured = Arc::clone(&redirect);
        provider
            .expect_authorize_url()
            .withf(|name, _, challenge| name == "google" && challenge.len() == 43)
            .times(1)
            .returning(move |_, redirect_to, _| {
                *captured.lock().unwrap() = redirect_to.to_string();
                Ok("https://auth.example.com/authorize".to_string())
            });
        redirect
    }

    fn poll_until_done(auth: &mut AuthService<MockIdentityProvider>) -> Result<String, AuthError> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(outcome) = auth.poll_oauth() {
                return outcome.map(|session| session.id.clone());
            }
            assert!(Instant::now() < deadline, "OAuth redirect never arrived");
            std::thread::sleep(Duration::from_millis(20));
        }
    }

    #[test]
    fn test_oauth_redirect_completes_sign_in() {
        let mut provider = MockIdentityProvider::new();
        let redirect = mock_authorize(&mut provider);
        provider
            .expect_exchange_code()
            .withf(|code, verifier| code == "abc" && verifier.len() == 64)
            .times(1)
            .returning(|_, _| Ok(session()));

        let mut auth = AuthService::new(provider);
        let redirect = start(&mut auth, &redirect);
        assert!(auth.poll_oauth().is_none());

        reqwest::blocking::get(format!("{}&code=abc", redirect)).unwrap();

        assert_eq!(poll_until_done(&mut auth), Ok("u-1".to_string()));
        assert!(!auth.oauth_pending());
        assert_eq!(auth.current_session().map(|s| s.id.as_str()), Some("u-1"));
    }

    #[test]
    fn test_oauth_redirect_with_wrong_state_never_exchanges() {
        let mut provider = MockIdentityProvider::new();
        let redirect = mock_authorize(&mut provider);
        provider.expect_exchange_code().never();

        let mut auth = AuthService::new(provider);
        let redirect = start(&mut auth, &redirect);
        let (base, _) = redirect.split_once('?').unwrap();

        reqwest::blocking::get(format!("{}?state=forged&code=abc", base)).unwrap();

        assert!(matches!(poll_until_done(&mut auth), Err(AuthError::Rejected(_))));
        assert!(!auth.oauth_pending());
        assert!(auth.current_session().is_none());
    }

    #[test]
    fn test_failed_exchange_keeps_signed_out() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_exchange_code()
            .returning(|_, _| Err(AuthError::Rejected("invalid flow state".into())));

        let mut auth = AuthService::new(provider);
        let err = auth.complete_oauth("abc", "verifier").unwrap_err();
        assert_eq!(err.to_string(), "invalid flow state");
        assert!(auth.current_session().is_none());
    }

    #[test]
    fn test_cancel_oauth_stops_waiting() {
        let mut provider = MockIdentityProvider::new();
        let redirect = mock_authorize(&mut provider);
        provider.expect_exchange_code().never();

        let mut auth = AuthService::new(provider);
        start(&mut auth, &redirect);
        auth.cancel_oauth();

        assert!(!auth.oauth_pending());
        assert!(auth.poll_oauth().is_none());
    }
}
