use std::sync::Arc;

use async_trait::async_trait;
use directory::DirectoryStore;
use shared::{
    domain::{ProfileUpdate, User, UserId},
    error::{ApiError, ErrorCode},
};
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

pub mod firebase;
pub mod mock;
pub mod validation;

use validation::{validate_profile_update, Credentials, LoginForm, NewAccount, SignupForm};
pub use validation::{Field, FieldError, ValidationErrors};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("an account already exists for this email")]
    EmailTaken,
    #[error("no user is signed in")]
    NotSignedIn,
    #[error("no profile document for user {0}")]
    ProfileMissing(UserId),
    #[error("auth backend unavailable: {0}")]
    Unavailable(String),
    #[error("session storage failed: {0}")]
    Storage(#[source] anyhow::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let code = match &err {
            AuthError::Validation(_) => ErrorCode::Validation,
            AuthError::InvalidCredentials | AuthError::NotSignedIn => ErrorCode::Unauthorized,
            AuthError::EmailTaken => ErrorCode::Validation,
            AuthError::ProfileMissing(_) => ErrorCode::NotFound,
            AuthError::Unavailable(_) => ErrorCode::Unavailable,
            AuthError::Storage(_) => ErrorCode::Internal,
        };
        ApiError::new(code, err.to_string())
    }
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Confirms a cached user at start-up. `Ok(None)` signs the user out.
    async fn restore(&self, cached: Option<User>) -> Result<Option<User>, AuthError>;
    async fn login(&self, credentials: &Credentials) -> Result<User, AuthError>;
    async fn signup(&self, account: &NewAccount) -> Result<User, AuthError>;
    async fn logout(&self) -> Result<(), AuthError>;
    async fn update_profile(&self, user: &User, update: &ProfileUpdate)
        -> Result<User, AuthError>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> anyhow::Result<Option<User>>;
    async fn save(&self, user: &User) -> anyhow::Result<()>;
    async fn clear(&self) -> anyhow::Result<()>;
}

#[async_trait]
impl SessionStore for storage::Storage {
    async fn load(&self) -> anyhow::Result<Option<User>> {
        Ok(self.load_session_user().await?.map(|stored| stored.user))
    }

    async fn save(&self, user: &User) -> anyhow::Result<()> {
        self.save_session_user(user).await
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.clear_session_user().await.map(|_| ())
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    user: Mutex<Option<User>>,
}

impl MemorySessionStore {
    pub fn with_user(user: User) -> Self {
        Self {
            user: Mutex::new(Some(user)),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> anyhow::Result<Option<User>> {
        Ok(self.user.lock().await.clone())
    }

    async fn save(&self, user: &User) -> anyhow::Result<()> {
        *self.user.lock().await = Some(user.clone());
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.user.lock().await.take();
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub is_loading: bool,
}

pub struct AuthSession {
    backend: Arc<dyn AuthBackend>,
    store: Arc<dyn SessionStore>,
    state: watch::Sender<SessionSnapshot>,
}

impl AuthSession {
    pub fn new(backend: Arc<dyn AuthBackend>, store: Arc<dyn SessionStore>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot {
            user: None,
            is_loading: true,
        });
        Self {
            backend,
            store,
            state,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Never fails: unreadable caches and backend errors leave the user
    /// signed out or on the cached copy, respectively.
    pub async fn restore(&self) -> Option<User> {
        self.set_loading(true);
        let cached = match self.store.load().await {
            Ok(cached) => cached,
            Err(err) => {
                warn!(error = %err, "failed to load cached user");
                None
            }
        };

        let user = match self.backend.restore(cached.clone()).await {
            Ok(Some(user)) => {
                self.persist(&user).await;
                Some(user)
            }
            Ok(None) => {
                if let Err(err) = self.store.clear().await {
                    warn!(error = %err, "failed to clear cached user");
                }
                None
            }
            Err(err) => {
                warn!(backend = self.backend.name(), error = %err, "session restore failed");
                cached
            }
        };
        self.finish(user.clone());
        user
    }

    pub async fn login(&self, form: &LoginForm) -> Result<User, AuthError> {
        let credentials = form.validate()?;
        self.set_loading(true);
        let result = self.backend.login(&credentials).await;
        self.complete_sign_in(result, "login").await
    }

    pub async fn signup(
        &self,
        form: &SignupForm,
        directory: &DirectoryStore,
    ) -> Result<User, AuthError> {
        let account = form.validate(directory)?;
        self.set_loading(true);
        let result = self.backend.signup(&account).await;
        self.complete_sign_in(result, "signup").await
    }

    /// The local user is only dropped once the backend agreed.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.set_loading(true);
        if let Err(err) = self.backend.logout().await {
            warn!(error = %err, "logout failed");
            self.set_loading(false);
            return Err(err);
        }
        let cleared = self.store.clear().await;
        self.finish(None);
        info!(backend = self.backend.name(), "signed out");
        cleared.map_err(AuthError::Storage)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, AuthError> {
        let current = self.user().ok_or(AuthError::NotSignedIn)?;
        validate_profile_update(update)?;
        if update.is_empty() {
            return Ok(current);
        }

        let updated = self.backend.update_profile(&current, update).await?;
        self.store
            .save(&updated)
            .await
            .map_err(AuthError::Storage)?;
        self.state.send_modify(|state| state.user = Some(updated.clone()));
        info!(user_id = %updated.id, "profile updated");
        Ok(updated)
    }

    async fn complete_sign_in(
        &self,
        result: Result<User, AuthError>,
        action: &'static str,
    ) -> Result<User, AuthError> {
        let user = match result {
            Ok(user) => user,
            Err(err) => {
                warn!(action, backend = self.backend.name(), error = %err, "authentication failed");
                self.set_loading(false);
                return Err(err);
            }
        };
        if let Err(err) = self.store.save(&user).await {
            self.set_loading(false);
            return Err(AuthError::Storage(err));
        }
        info!(action, backend = self.backend.name(), user_id = %user.id, "signed in");
        self.finish(Some(user.clone()));
        Ok(user)
    }

    async fn persist(&self, user: &User) {
        if let Err(err) = self.store.save(user).await {
            warn!(error = %err, "failed to cache user");
        }
    }

    fn set_loading(&self, is_loading: bool) {
        self.state.send_modify(|state| state.is_loading = is_loading);
    }

    fn finish(&self, user: Option<User>) {
        self.state.send_replace(SessionSnapshot {
            user,
            is_loading: false,
        });
    }
}

#[cfg(test)]
#[path = "../tests/auth_tests.rs"]
mod tests;
