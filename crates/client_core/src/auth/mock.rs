use std::{sync::LazyLock, time::Duration};

use async_trait::async_trait;
use regex::Regex;
use shared::domain::{CenterRef, ProfileUpdate, User, UserId};
use tracing::debug;

use super::{
    validation::{Credentials, NewAccount},
    AuthBackend, AuthError,
};

pub const DEFAULT_LOGIN_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_SIGNUP_DELAY: Duration = Duration::from_millis(1500);
pub const DEFAULT_PROFILE_IMAGE: &str = "https://i.pravatar.cc/300";

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

pub fn demo_user(email: &str) -> User {
    User {
        id: UserId::from("1"),
        name: "Demo User".into(),
        username: "demouser".into(),
        email: email.to_string(),
        phone: "9876543210".into(),
        address: "123 Demo Street, Demo City".into(),
        district: "Pune".into(),
        center: CenterRef {
            id: "1".into(),
            name: "Anantrao Pawar College of Engineering and Research (APCOER)".into(),
        },
        profile_image: Some(DEFAULT_PROFILE_IMAGE.into()),
    }
}

/// `"Asha  Patil"` becomes `"asha.patil"`.
pub fn default_username(name: &str) -> String {
    WHITESPACE.replace_all(&name.to_lowercase(), ".").into_owned()
}

#[derive(Debug, Clone)]
pub struct MockAuthBackend {
    login_delay: Duration,
    signup_delay: Duration,
}

impl Default for MockAuthBackend {
    fn default() -> Self {
        Self::new(DEFAULT_LOGIN_DELAY, DEFAULT_SIGNUP_DELAY)
    }
}

impl MockAuthBackend {
    pub fn new(login_delay: Duration, signup_delay: Duration) -> Self {
        Self {
            login_delay,
            signup_delay,
        }
    }

    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }
}

#[async_trait]
impl AuthBackend for MockAuthBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn restore(&self, cached: Option<User>) -> Result<Option<User>, AuthError> {
        Ok(cached)
    }

    async fn login(&self, credentials: &Credentials) -> Result<User, AuthError> {
        tokio::time::sleep(self.login_delay).await;
        debug!(email = %credentials.email, "mock login accepted");
        Ok(demo_user(&credentials.email))
    }

    async fn signup(&self, account: &NewAccount) -> Result<User, AuthError> {
        tokio::time::sleep(self.signup_delay).await;
        let username = if account.username.is_empty() {
            default_username(&account.name)
        } else {
            account.username.clone()
        };
        Ok(User {
            id: UserId::generate(),
            name: account.name.clone(),
            username,
            email: account.email.clone(),
            phone: account.phone.clone(),
            address: account.address.clone(),
            district: account.district.clone(),
            center: account.center.clone(),
            profile_image: Some(DEFAULT_PROFILE_IMAGE.into()),
        })
    }

    async fn logout(&self) -> Result<(), AuthError> {
        Ok(())
    }

    async fn update_profile(
        &self,
        user: &User,
        update: &ProfileUpdate,
    ) -> Result<User, AuthError> {
        let mut updated = user.clone();
        update.apply_to(&mut updated);
        Ok(updated)
    }
}
