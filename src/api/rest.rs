// emsctl - api/rest.rs
//
// reqwest client for the employee service. Implements the Backend trait
// used by the pipelines and carries the auth, MFA and profile endpoints
// that the console forwards verbatim. Every error keeps the request URL
// so failures in bulk operations point at the record that caused them.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Method;
use serde::Deserialize;

use crate::api::auth::{AuthOutcome, MfaSetup, Session};
use crate::api::backend::Backend;
use crate::core::model::{Department, Employee, LineCount, NewEmployee};
use crate::util::error::ApiError;

/// HTTP client bound to one employee service instance. When a session is
/// present its token is attached as a bearer header on every request.
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    session: Option<Session>,
}

/// Wire shape of the authenticate response. `token` is legitimately
/// absent when the account still needs an MFA code.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    mfa_enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MfaStatusResponse {
    #[serde(default)]
    mfa_enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileImageResponse {
    #[serde(default)]
    profile_image: Option<String>,
}

impl RestClient {
    /// Build a client for `base_url` (trailing slashes are trimmed so
    /// path concatenation stays predictable).
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session: Option<Session>,
    ) -> Result<RestClient, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Transport {
                url: base_url.to_string(),
                source,
            })?;

        Ok(RestClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    // -- authentication ----------------------------------------------------

    /// Authenticate against the service. Accounts with MFA enabled get
    /// `AuthOutcome::MfaRequired` until a code is supplied.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        code: Option<&str>,
    ) -> Result<AuthOutcome, ApiError> {
        let url = format!("{}/authenticate", self.base_url);
        let body = login_body(username, password, code);
        let response = Self::send(self.request(Method::POST, &url).json(&body), &url).await?;
        let auth: AuthResponse = Self::parse_response(response, &url).await?;
        interpret_auth(auth, username, code.is_some(), &url)
    }

    /// Register a new console account.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let url = format!("{}/register", self.base_url);
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });
        Self::send(self.request(Method::POST, &url).json(&body), &url).await?;
        Ok(())
    }

    /// Reset an account password. Accounts with MFA enabled must supply
    /// a current code.
    pub async fn reset_password(
        &self,
        username: &str,
        new_password: &str,
        code: Option<&str>,
    ) -> Result<(), ApiError> {
        let url = format!("{}/reset-password", self.base_url);
        let mut body = serde_json::json!({
            "username": username,
            "newPassword": new_password,
        });
        if let Some(code) = code {
            body["code"] = serde_json::Value::String(code.to_string());
        }
        Self::send(self.request(Method::POST, &url).json(&body), &url).await?;
        Ok(())
    }

    // -- MFA ---------------------------------------------------------------

    /// Whether the account currently requires an MFA code at login.
    pub async fn mfa_status(&self, username: &str) -> Result<bool, ApiError> {
        let url = format!("{}/mfa/status/{username}", self.base_url);
        let response = Self::send(self.request(Method::GET, &url), &url).await?;
        let status: MfaStatusResponse = Self::parse_response(response, &url).await?;
        Ok(status.mfa_enabled)
    }

    /// Begin MFA enrolment: the service returns the shared secret and an
    /// otpauth URL. Enrolment only takes effect after `mfa_enable`
    /// confirms a code generated from that secret.
    pub async fn mfa_setup(&self, username: &str) -> Result<MfaSetup, ApiError> {
        let url = format!("{}/mfa/setup", self.base_url);
        let body = serde_json::json!({ "username": username });
        let response = Self::send(self.request(Method::POST, &url).json(&body), &url).await?;
        Self::parse_response(response, &url).await
    }

    /// Confirm enrolment with a code generated from the setup secret.
    pub async fn mfa_enable(&self, username: &str, code: &str) -> Result<(), ApiError> {
        let url = format!("{}/mfa/enable", self.base_url);
        let body = serde_json::json!({
            "username": username,
            "code": code,
        });
        Self::send(self.request(Method::POST, &url).json(&body), &url).await?;
        Ok(())
    }

    /// Turn MFA off for the account.
    pub async fn mfa_disable(&self, username: &str) -> Result<(), ApiError> {
        let url = format!("{}/mfa/disable", self.base_url);
        let body = serde_json::json!({ "username": username });
        Self::send(self.request(Method::POST, &url).json(&body), &url).await?;
        Ok(())
    }

    // -- profile -----------------------------------------------------------

    /// Store a profile image for the account. The image travels as a
    /// base64 data URL, which is the only shape the service accepts.
    pub async fn upload_profile_image(
        &self,
        username: &str,
        mime: &str,
        bytes: &[u8],
    ) -> Result<(), ApiError> {
        let url = format!("{}/profile-image", self.base_url);
        let body = serde_json::json!({
            "username": username,
            "profileImage": image_data_url(mime, bytes),
        });
        Self::send(self.request(Method::POST, &url).json(&body), &url).await?;
        Ok(())
    }

    /// Fetch the stored profile image as a data URL, or None when the
    /// account has never uploaded one.
    pub async fn fetch_profile_image(&self, username: &str) -> Result<Option<String>, ApiError> {
        let url = format!("{}/profile-image/{username}", self.base_url);
        let response = Self::send(self.request(Method::GET, &url), &url).await?;
        let profile: ProfileImageResponse = Self::parse_response(response, &url).await?;
        Ok(profile.profile_image)
    }

    // -- single records ----------------------------------------------------

    pub async fn get_employee(&self, id: u64) -> Result<Employee, ApiError> {
        let url = format!("{}/api/employees/{id}", self.base_url);
        let response = Self::send(self.request(Method::GET, &url), &url).await?;
        Self::parse_response(response, &url).await
    }

    pub async fn update_employee(
        &self,
        id: u64,
        payload: &NewEmployee,
    ) -> Result<Employee, ApiError> {
        let url = format!("{}/api/employees/{id}", self.base_url);
        let response = Self::send(self.request(Method::PUT, &url).json(payload), &url).await?;
        Self::parse_response(response, &url).await
    }

    pub async fn create_department(&self, name: &str) -> Result<Department, ApiError> {
        let url = format!("{}/api/departments", self.base_url);
        let body = serde_json::json!({ "name": name });
        let response = Self::send(self.request(Method::POST, &url).json(&body), &url).await?;
        Self::parse_response(response, &url).await
    }

    pub async fn update_department(&self, id: u64, name: &str) -> Result<Department, ApiError> {
        let url = format!("{}/api/departments/{id}", self.base_url);
        let body = serde_json::json!({ "name": name });
        let response = Self::send(self.request(Method::PUT, &url).json(&body), &url).await?;
        Self::parse_response(response, &url).await
    }

    // -- plumbing ----------------------------------------------------------

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some(session) = &self.session {
            builder = builder.bearer_auth(&session.token);
        }
        builder
    }

    async fn send(
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        Self::ensure_success(response, url).await
    }

    async fn ensure_success(
        response: reqwest::Response,
        url: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        url: &str,
    ) -> Result<T, ApiError> {
        response
            .json::<T>()
            .await
            .map_err(|source| ApiError::Decode {
                url: url.to_string(),
                source,
            })
    }
}

#[async_trait]
impl Backend for RestClient {
    async fn list_employees(&self) -> Result<Vec<Employee>, ApiError> {
        let url = format!("{}/api/employees", self.base_url);
        let response = Self::send(self.request(Method::GET, &url), &url).await?;
        Self::parse_response(response, &url).await
    }

    async fn create_employee(&self, payload: &NewEmployee) -> Result<Employee, ApiError> {
        let url = format!("{}/api/employees", self.base_url);
        let response = Self::send(self.request(Method::POST, &url).json(payload), &url).await?;
        Self::parse_response(response, &url).await
    }

    async fn delete_employee(&self, id: u64) -> Result<(), ApiError> {
        let url = format!("{}/api/employees/{id}", self.base_url);
        Self::send(self.request(Method::DELETE, &url), &url).await?;
        Ok(())
    }

    async fn list_departments(&self) -> Result<Vec<Department>, ApiError> {
        let url = format!("{}/api/departments", self.base_url);
        let response = Self::send(self.request(Method::GET, &url), &url).await?;
        Self::parse_response(response, &url).await
    }

    async fn delete_department(&self, id: u64) -> Result<(), ApiError> {
        let url = format!("{}/api/departments/{id}", self.base_url);
        Self::send(self.request(Method::DELETE, &url), &url).await?;
        Ok(())
    }

    async fn fetch_logs(&self, lines: LineCount) -> Result<String, ApiError> {
        let url = format!(
            "{}/api/employees/logs?lines={}",
            self.base_url,
            lines.get()
        );
        let response = Self::send(self.request(Method::GET, &url), &url).await?;
        response
            .text()
            .await
            .map_err(|source| ApiError::Decode { url, source })
    }
}

/// Authenticate request body. The code key is omitted entirely when no
/// code was supplied, matching what the service expects.
fn login_body(username: &str, password: &str, code: Option<&str>) -> serde_json::Value {
    let mut body = serde_json::json!({
        "username": username,
        "password": password,
    });
    if let Some(code) = code {
        body["code"] = serde_json::Value::String(code.to_string());
    }
    body
}

/// Turn an authenticate response into an outcome. The `mfaEnabled` flag
/// is the authoritative gate: when it is set and no code was sent, the
/// response is an MFA challenge even if a token happens to be present.
fn interpret_auth(
    response: AuthResponse,
    username: &str,
    had_code: bool,
    url: &str,
) -> Result<AuthOutcome, ApiError> {
    if response.mfa_enabled && !had_code {
        return Ok(AuthOutcome::MfaRequired);
    }
    match response.token {
        Some(token) => Ok(AuthOutcome::Session(Session {
            username: username.to_string(),
            token,
        })),
        None => Err(ApiError::MissingField {
            url: url.to_string(),
            field: "token",
        }),
    }
}

fn image_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}
