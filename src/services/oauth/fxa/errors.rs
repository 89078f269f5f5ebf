use std::fmt;

use crate::services::account_events::AccountEventError;

#[derive(Debug)]
pub enum FxaAuthError {
    MissingStateCookie,
    InvalidState,
    MissingCode,
    TokenExchangeFailed,
    InvalidTokenJson,
    ProfileFetchFailed,
    InvalidProfile,
    NoEmailFound,
    EmailLinkedElsewhere,
    InvitePending,
    AccountDisabled,
    SessionCreationFailed,
    DbError(sqlx::Error),
}

impl fmt::Display for FxaAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use FxaAuthError::*;
        match self {
            MissingStateCookie => write!(f, "Missing 'oauth_state' cookie"),
            InvalidState => write!(f, "Invalid state parameter"),
            MissingCode => write!(f, "Missing 'code' param"),
            TokenExchangeFailed => write!(f, "Firefox Accounts token request failed"),
            InvalidTokenJson => write!(f, "Invalid token JSON"),
            ProfileFetchFailed => write!(f, "Failed to fetch Firefox Accounts profile"),
            InvalidProfile => write!(f, "Invalid profile"),
            NoEmailFound => write!(f, "No email found in profile"),
            EmailLinkedElsewhere => write!(
                f,
                "An account with this email already exists. Please sign in the way you originally signed up."
            ),
            InvitePending => write!(
                f,
                "Thanks for signing up! Your account is waiting for an invitation."
            ),
            AccountDisabled => write!(f, "This account has been disabled."),
            SessionCreationFailed => write!(f, "Failed to create session"),
            DbError(_) => write!(
                f,
                "Something went wrong while signing you in. Please try again."
            ),
        }
    }
}

impl From<sqlx::Error> for FxaAuthError {
    fn from(e: sqlx::Error) -> Self {
        FxaAuthError::DbError(e)
    }
}

impl From<AccountEventError> for FxaAuthError {
    fn from(e: AccountEventError) -> Self {
        match e {
            AccountEventError::Database(err) => FxaAuthError::DbError(err),
        }
    }
}
