//! Loopback listener that receives the browser redirect at the end of an
//! OAuth sign-in, plus the PKCE codes that tie the redirect to this app.
//!
//! The listener runs on its own thread and hands the authorization code back
//! over a channel; the UI polls [`PendingOAuth::poll`] once per frame.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::Url;
use sha2::{Digest, Sha256};
use tiny_http::{Response, Server};

use super::AuthError;

pub const CALLBACK_PATH: &str = "/auth/callback";

/// How long the browser has to come back before the listener gives up.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(10 * 60);
const ACCEPT_INTERVAL: Duration = Duration::from_millis(200);
const VERIFIER_LEN: usize = 64;
const STATE_LEN: usize = 32;

const SUCCESS_PAGE: &str = "Signed in. You can close this window and return to Timebox Notes.";
const FAILURE_PAGE: &str = "Sign-in failed. Return to Timebox Notes and try again.";

/// Proof key for one authorization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceCodes {
    pub verifier: String,
    /// `base64url(sha256(verifier))`, sent with the authorize request.
    pub challenge: String,
}

impl PkceCodes {
    pub fn generate() -> Self {
        Self::from_verifier(random_token(VERIFIER_LEN))
    }

    pub fn from_verifier(verifier: String) -> Self {
        let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
        Self {
            verifier,
            challenge,
        }
    }
}

/// A bound loopback port that has not started waiting yet.
pub struct CallbackListener {
    server: Server,
    state: String,
    redirect_uri: String,
}

impl CallbackListener {
    /// Listen on `127.0.0.1:port`; port 0 picks any free port.
    pub fn bind(port: u16) -> Result<Self, AuthError> {
        let server = Server::http(("127.0.0.1", port)).map_err(|e| {
            AuthError::Network(format!("Could not listen for the sign-in redirect on port {}: {}", port, e))
        })?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .ok_or_else(|| AuthError::Network("Sign-in listener has no local port".to_string()))?;

        let state = random_token(STATE_LEN);
        let redirect_uri = format!("http://127.0.0.1:{}{}?state={}", port, CALLBACK_PATH, state);
        log::debug!("Listening for the sign-in redirect on port {}", port);

        Ok(Self {
            server,
            state,
            redirect_uri,
        })
    }

    /// Where the provider should send the browser, state included.
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Wait for the redirect on a background thread.
    pub fn spawn(self, verifier: String) -> PendingOAuth {
        let (tx, receiver) = mpsc::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        thread::spawn(move || {
            let outcome = self.wait_for_redirect(&flag);
            if let Err(err) = &outcome {
                log::warn!("OAuth redirect not completed: {}", err);
            }
            let _ = tx.send(outcome);
        });

        PendingOAuth {
            verifier,
            receiver,
            cancelled,
        }
    }

    fn wait_for_redirect(&self, cancelled: &AtomicBool) -> Result<String, AuthError> {
        let deadline = Instant::now() + LOGIN_TIMEOUT;

        while Instant::now() < deadline {
            if cancelled.load(Ordering::Relaxed) {
                return Err(AuthError::Cancelled);
            }

            let request = match self.server.recv_timeout(ACCEPT_INTERVAL) {
                Ok(Some(request)) => request,
                Ok(None) => continue,
                Err(e) => return Err(AuthError::Network(format!("Sign-in listener failed: {}", e))),
            };

            let Some(outcome) = parse_callback(request.url(), &self.state) else {
                let _ = request.respond(Response::from_string("Not Found").with_status_code(404));
                continue;
            };

            let page = if outcome.is_ok() { SUCCESS_PAGE } else { FAILURE_PAGE };
            if let Err(e) = request.respond(Response::from_string(page)) {
                log::warn!("Failed to answer the sign-in redirect: {}", e);
            }
            return outcome;
        }

        Err(AuthError::Rejected("Sign-in timed out, please try again".to_string()))
    }
}

/// An OAuth sign-in waiting for the browser to come back.
///
/// Dropping it stops the listener.
pub struct PendingOAuth {
    verifier: String,
    receiver: Receiver<Result<String, AuthError>>,
    cancelled: Arc<AtomicBool>,
}

impl PendingOAuth {
    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    /// The authorization code once the redirect arrived; `None` while waiting.
    pub fn poll(&self) -> Option<Result<String, AuthError>> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(AuthError::Network(
                "Sign-in listener stopped unexpectedly".to_string(),
            ))),
        }
    }
}

impl Drop for PendingOAuth {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

/// Read the authorization code out of a redirect request target.
///
/// `None` when the request is not for [`CALLBACK_PATH`] (a favicon, say).
pub(crate) fn parse_callback(target: &str, expected_state: &str) -> Option<Result<String, AuthError>> {
    let url = Url::parse(&format!("http://127.0.0.1{}", target)).ok()?;
    if url.path() != CALLBACK_PATH {
        return None;
    }
    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

    if let Some(error) = params.get("error") {
        let detail = params.get("error_description").unwrap_or(error);
        return Some(Err(AuthError::Rejected(detail.clone())));
    }
    if params.get("state").map(String::as_str) != Some(expected_state) {
        return Some(Err(AuthError::Rejected(
            "Sign-in state did not match, please try again".to_string(),
        )));
    }
    Some(match params.get("code").filter(|code| !code.is_empty()) {
        Some(code) => Ok(code.clone()),
        None => Err(AuthError::Rejected("Missing authorization code".to_string())),
    })
}

fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
