//! Identity Toolkit accounts plus a Firestore `users/{uid}` profile document.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use shared::domain::{CenterRef, ProfileUpdate, User, UserId};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{
    mock::default_username,
    validation::{Credentials, NewAccount},
    AuthBackend, AuthError,
};

pub const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com";
pub const FIRESTORE_URL: &str = "https://firestore.googleapis.com";

#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    pub identity_url: String,
    pub firestore_url: String,
}

impl FirebaseConfig {
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            identity_url: IDENTITY_TOOLKIT_URL.to_string(),
            firestore_url: FIRESTORE_URL.to_string(),
        }
    }

    /// Points both APIs at one base URL (emulators and tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        self.identity_url = base_url.to_string();
        self.firestore_url = base_url.to_string();
        self
    }
}

#[derive(Debug, Clone)]
struct SignedIn {
    uid: String,
    id_token: String,
    email: String,
    display_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateAccountRequest<'a> {
    id_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo_url: Option<&'a str>,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    id_token: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct FirebaseAuthBackend {
    http: Client,
    config: FirebaseConfig,
    session: Mutex<Option<SignedIn>>,
}

impl FirebaseAuthBackend {
    pub fn new(config: FirebaseConfig) -> Self {
        Self {
            http: Client::new(),
            config,
            session: Mutex::new(None),
        }
    }

    fn accounts_url(&self, method: &str) -> String {
        format!("{}/v1/accounts:{method}", self.config.identity_url)
    }

    fn user_document_url(&self, uid: &str) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/users/{uid}",
            self.config.firestore_url, self.config.project_id
        )
    }

    async fn accounts_call<B: Serialize + ?Sized>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<AccountResponse, AuthError> {
        let response = self
            .http
            .post(self.accounts_url(method))
            .query(&[("key", self.config.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(unavailable)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }
        response.json().await.map_err(unavailable)
    }

    async fn fetch_profile(&self, session: &SignedIn) -> Result<Option<User>, AuthError> {
        let response = self
            .http
            .get(self.user_document_url(&session.uid))
            .bearer_auth(&session.id_token)
            .send()
            .await
            .map_err(unavailable)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let document: Value = response
            .error_for_status()
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)?;
        Ok(Some(user_from_document(session, &document)))
    }

    async fn write_profile(
        &self,
        session: &SignedIn,
        fields: Map<String, Value>,
        mask: &[&str],
    ) -> Result<(), AuthError> {
        let query: Vec<(&str, &str)> = mask
            .iter()
            .map(|path| ("updateMask.fieldPaths", *path))
            .collect();
        self.http
            .patch(self.user_document_url(&session.uid))
            .bearer_auth(&session.id_token)
            .query(&query)
            .json(&json!({ "fields": fields }))
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?;
        Ok(())
    }

    async fn current_session(&self) -> Result<SignedIn, AuthError> {
        self.session
            .lock()
            .await
            .clone()
            .ok_or(AuthError::NotSignedIn)
    }
}

#[async_trait]
impl AuthBackend for FirebaseAuthBackend {
    fn name(&self) -> &'static str {
        "firebase"
    }

    async fn restore(&self, cached: Option<User>) -> Result<Option<User>, AuthError> {
        let Some(session) = self.session.lock().await.clone() else {
            return Ok(cached);
        };
        let profile = self.fetch_profile(&session).await?;
        if profile.is_none() {
            warn!(uid = %session.uid, "account exists without a profile document");
        }
        Ok(profile)
    }

    async fn login(&self, credentials: &Credentials) -> Result<User, AuthError> {
        let account = self
            .accounts_call(
                "signInWithPassword",
                &PasswordRequest {
                    email: &credentials.email,
                    password: &credentials.password,
                    return_secure_token: true,
                },
            )
            .await?;
        let session = SignedIn {
            uid: account.local_id,
            id_token: account.id_token,
            email: account.email,
            display_name: account.display_name,
        };

        let Some(user) = self.fetch_profile(&session).await? else {
            warn!(uid = %session.uid, "account exists without a profile document");
            return Err(AuthError::ProfileMissing(UserId::new(session.uid)));
        };
        *self.session.lock().await = Some(session);
        Ok(user)
    }

    async fn signup(&self, new_account: &NewAccount) -> Result<User, AuthError> {
        let account = self
            .accounts_call(
                "signUp",
                &PasswordRequest {
                    email: &new_account.email,
                    password: &new_account.password,
                    return_secure_token: true,
                },
            )
            .await?;
        let session = SignedIn {
            uid: account.local_id,
            id_token: account.id_token,
            email: new_account.email.clone(),
            display_name: Some(new_account.name.clone()),
        };

        self.accounts_call(
            "update",
            &UpdateAccountRequest {
                id_token: &session.id_token,
                display_name: Some(&new_account.name),
                photo_url: None,
                return_secure_token: false,
            },
        )
        .await?;

        let username = if new_account.username.is_empty() {
            default_username(&new_account.name)
        } else {
            new_account.username.clone()
        };
        let user = User {
            id: UserId::new(session.uid.clone()),
            name: new_account.name.clone(),
            username,
            email: new_account.email.clone(),
            phone: new_account.phone.clone(),
            address: new_account.address.clone(),
            district: new_account.district.clone(),
            center: new_account.center.clone(),
            profile_image: None,
        };
        self.write_profile(&session, user_fields(&user), &[]).await?;
        debug!(uid = %session.uid, "profile document created");
        *self.session.lock().await = Some(session);
        Ok(user)
    }

    async fn logout(&self) -> Result<(), AuthError> {
        self.session.lock().await.take();
        Ok(())
    }

    async fn update_profile(
        &self,
        user: &User,
        update: &ProfileUpdate,
    ) -> Result<User, AuthError> {
        let session = self.current_session().await?;
        let (fields, mask) = update_fields(update);
        self.write_profile(&session, fields, &mask).await?;

        if update.name.is_some() || update.profile_image.is_some() {
            self.accounts_call(
                "update",
                &UpdateAccountRequest {
                    id_token: &session.id_token,
                    display_name: update.name.as_deref(),
                    photo_url: update.profile_image.as_deref(),
                    return_secure_token: false,
                },
            )
            .await?;
        }

        let mut updated = user.clone();
        update.apply_to(&mut updated);
        Ok(updated)
    }
}

fn unavailable(err: reqwest::Error) -> AuthError {
    AuthError::Unavailable(err.to_string())
}

fn classify_failure(status: StatusCode, body: &str) -> AuthError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| status.to_string());
    // Identity Toolkit appends detail after " : ".
    let code = message.split(" : ").next().unwrap_or_default();
    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
            AuthError::InvalidCredentials
        }
        "EMAIL_EXISTS" => AuthError::EmailTaken,
        _ => AuthError::Unavailable(format!("{status}: {message}")),
    }
}

fn string_value(value: &str) -> Value {
    json!({ "stringValue": value })
}

fn center_value(center: &CenterRef) -> Value {
    json!({
        "mapValue": {
            "fields": {
                "id": string_value(&center.id),
                "name": string_value(&center.name),
            }
        }
    })
}

fn user_fields(user: &User) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("id".into(), string_value(user.id.as_str()));
    fields.insert("name".into(), string_value(&user.name));
    fields.insert("username".into(), string_value(&user.username));
    fields.insert("email".into(), string_value(&user.email));
    fields.insert("phone".into(), string_value(&user.phone));
    fields.insert("address".into(), string_value(&user.address));
    fields.insert("district".into(), string_value(&user.district));
    fields.insert("center".into(), center_value(&user.center));
    fields.insert(
        "profileImage".into(),
        string_value(user.profile_image.as_deref().unwrap_or_default()),
    );
    fields
}

fn update_fields(update: &ProfileUpdate) -> (Map<String, Value>, Vec<&'static str>) {
    let mut fields = Map::new();
    let mut mask = Vec::new();
    let strings = [
        ("name", &update.name),
        ("username", &update.username),
        ("phone", &update.phone),
        ("address", &update.address),
        ("district", &update.district),
        ("profileImage", &update.profile_image),
    ];
    for (path, value) in strings {
        if let Some(value) = value {
            fields.insert(path.into(), string_value(value));
            mask.push(path);
        }
    }
    if let Some(center) = &update.center {
        fields.insert("center".into(), center_value(center));
        mask.push("center");
    }
    (fields, mask)
}

fn field_str(fields: &Value, key: &str) -> Option<String> {
    fields
        .get(key)?
        .get("stringValue")?
        .as_str()
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Document fields win; account attributes fill the gaps.
fn user_from_document(session: &SignedIn, document: &Value) -> User {
    let fields = document.get("fields").cloned().unwrap_or(Value::Null);
    let center = fields
        .get("center")
        .and_then(|c| c.get("mapValue"))
        .and_then(|c| c.get("fields"))
        .map(|c| CenterRef {
            id: field_str(c, "id").unwrap_or_default(),
            name: field_str(c, "name").unwrap_or_default(),
        })
        .unwrap_or_default();

    User {
        id: UserId::new(session.uid.clone()),
        name: field_str(&fields, "name")
            .or_else(|| session.display_name.clone())
            .unwrap_or_default(),
        username: field_str(&fields, "username").unwrap_or_default(),
        email: session.email.clone(),
        phone: field_str(&fields, "phone").unwrap_or_default(),
        address: field_str(&fields, "address").unwrap_or_default(),
        district: field_str(&fields, "district").unwrap_or_default(),
        center,
        profile_image: field_str(&fields, "profileImage"),
    }
}

#[cfg(test)]
#[path = "../tests/firebase_tests.rs"]
mod tests;
