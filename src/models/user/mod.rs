// User session module

use serde::{Deserialize, Serialize};

/// The signed-in identity as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl UserSession {
    /// Greeting name: the part of the email before '@'.
    pub fn display_name(&self) -> &str {
        self.email
            .split('@')
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or("User")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let session = UserSession {
            id: "u1".into(),
            email: "ada@example.com".into(),
            access_token: None,
        };
        assert_eq!(session.display_name(), "ada");

        let anonymous = UserSession {
            email: String::new(),
            ..session
        };
        assert_eq!(anonymous.display_name(), "User");
    }
}
