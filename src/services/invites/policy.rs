use serde::{Deserialize, Serialize};

/// Signups from this domain are activated even in invite-only mode.
pub const EXEMPT_EMAIL_DOMAIN: &str = "mozilla.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteMode {
    Open,
    InviteOnly,
}

impl InviteMode {
    pub fn from_invite_only_flag(invite_only: bool) -> Self {
        if invite_only {
            InviteMode::InviteOnly
        } else {
            InviteMode::Open
        }
    }
}

/// Target state for a user and their profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub is_active: bool,
    pub invite_pending: bool,
}

impl Activation {
    pub const ACTIVE: Activation = Activation {
        is_active: true,
        invite_pending: false,
    };
    pub const PENDING: Activation = Activation {
        is_active: false,
        invite_pending: true,
    };
}

pub fn is_exempt_email(email: &str) -> bool {
    email
        .trim()
        .rsplit_once('@')
        .map(|(_, domain)| domain.eq_ignore_ascii_case(EXEMPT_EMAIL_DOMAIN))
        .unwrap_or(false)
}

pub fn on_signup(mode: InviteMode, email: &str) -> Activation {
    match mode {
        InviteMode::Open => Activation::ACTIVE,
        InviteMode::InviteOnly if is_exempt_email(email) => Activation::ACTIVE,
        InviteMode::InviteOnly => Activation::PENDING,
    }
}

/// `None` means the login leaves the user untouched.
pub fn on_external_login(mode: InviteMode, invite_pending: bool) -> Option<Activation> {
    match mode {
        InviteMode::Open if invite_pending => Some(Activation::ACTIVE),
        _ => None,
    }
}
