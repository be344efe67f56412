// emsctl - api/auth.rs
//
// Session and authentication types. The service owns the authentication
// protocol; the console only carries the token around and reacts to the
// MFA signal, so these types name exactly the fields it reads.

use serde::{Deserialize, Serialize};

/// An authenticated session: who logged in and the bearer token the
/// service issued. Created by `RestClient::login`, persisted between
/// invocations by `app::session`, attached to every request by the
/// client, and destroyed on logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub token: String,
}

/// Outcome of an authenticate call with accepted credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// A token was issued; the caller should persist the session.
    Session(Session),

    /// The account has MFA enabled and no code was supplied. Retry the
    /// login with a code to obtain a session.
    MfaRequired,
}

/// Enrolment material returned by the MFA setup endpoint. The secret is
/// shown for manual entry and the otpauth URL feeds a QR generator.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaSetup {
    pub secret: String,
    pub qr_url: String,
}
