//! Session identity types
//!
//! A [`Principal`] is a snapshot of whoever the identity provider considers
//! signed in. The facade turns it into a [`ResolvedCaller`] once per
//! operation and pattern-matches on that instead of re-deriving ids.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// OAuth scope requested when signing in to import from spreadsheets
pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";

/// The authenticated (or anonymous) identity of the current session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Provider-assigned unique user id
    pub uid: String,
    /// True for anonymous guest sessions
    pub is_anonymous: bool,
    /// Display name, when the provider supplies one
    pub display_name: Option<String>,
}

impl Principal {
    /// Creates a registered principal
    pub fn registered(uid: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            uid: uid.into(),
            is_anonymous: false,
            display_name,
        }
    }

    /// Creates an anonymous principal
    pub fn anonymous(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            is_anonymous: true,
            display_name: None,
        }
    }
}

/// Who is calling, resolved once per facade operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedCaller {
    /// A signed-in, non-anonymous user
    Registered { uid: String },
    /// An anonymous guest session
    Anonymous { uid: String },
    /// Nobody is signed in
    Absent,
}

impl ResolvedCaller {
    /// Returns the caller's uid, if any
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        match self {
            Self::Registered { uid } | Self::Anonymous { uid } => Some(uid),
            Self::Absent => None,
        }
    }

    /// Returns true if no principal is signed in
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl From<Option<&Principal>> for ResolvedCaller {
    fn from(principal: Option<&Principal>) -> Self {
        match principal {
            Some(p) if p.is_anonymous => Self::Anonymous { uid: p.uid.clone() },
            Some(p) => Self::Registered { uid: p.uid.clone() },
            None => Self::Absent,
        }
    }
}

/// Interactive sign-in providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Google,
    Facebook,
    Twitter,
    Email,
}

impl AuthProvider {
    /// Parses a provider name, falling back to Google for unknown names
    ///
    /// Matching is case-insensitive. Unknown providers are not an error.
    pub fn from_name_lenient(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "facebook" => Self::Facebook,
            "twitter" => Self::Twitter,
            "email" => Self::Email,
            _ => Self::Google,
        }
    }

    /// Returns the provider's canonical lowercase name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
            Self::Email => "email",
        }
    }
}

impl Display for AuthProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for a provider sign-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInRequest {
    /// Provider used for the credential flow
    pub provider: AuthProvider,
    /// Language the auth UI is shown in
    pub language_code: String,
    /// Additional OAuth scopes to request
    pub scopes: Vec<String>,
}

impl SignInRequest {
    pub fn new(provider: AuthProvider, language_code: impl Into<String>) -> Self {
        Self {
            provider,
            language_code: language_code.into(),
            scopes: Vec::new(),
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.push(scope.into());
        self
    }
}

/// Options for the embedded sign-in widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInUiOptions {
    /// Providers offered, in display order
    pub providers: Vec<AuthProvider>,
    /// Use a popup instead of a full-page redirect
    pub popup_flow: bool,
    /// Force the Google account chooser
    pub google_select_account: bool,
    /// Terms of service link
    pub tos_url: String,
    /// Privacy policy link
    pub privacy_policy_url: String,
}

impl Default for SignInUiOptions {
    fn default() -> Self {
        Self {
            providers: vec![AuthProvider::Google, AuthProvider::Twitter, AuthProvider::Email],
            popup_flow: true,
            google_select_account: true,
            tos_url: "/faq/terms".to_string(),
            privacy_policy_url: "/privacy-policy.html".to_string(),
        }
    }
}
