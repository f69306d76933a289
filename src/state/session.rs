//! Authentication session

/// Who is using the client. Owned by `AppState`; only the app replaces it
/// on login or logout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated {
        email: String,
        name: Option<String>,
        access_token: String,
    },
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// Name to greet the user with, falling back to the email
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { email, name, .. } => {
                Some(name.as_deref().filter(|n| !n.is_empty()).unwrap_or(email))
            }
        }
    }
}
