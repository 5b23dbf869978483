use std::{fmt, sync::LazyLock};

use directory::DirectoryStore;
use regex::Regex;
use shared::domain::{CenterId, CenterRef, ProfileUpdate};
use thiserror::Error;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));
static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("valid username pattern"));
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{10}$").expect("valid phone pattern"));

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_NAME_LEN: usize = 2;
pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_ADDRESS_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Username,
    Phone,
    Email,
    Address,
    District,
    Center,
    Password,
    ConfirmPassword,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Name => "name",
            Field::Username => "username",
            Field::Phone => "phone",
            Field::Email => "email",
            Field::Address => "address",
            Field::District => "district",
            Field::Center => "center",
            Field::Password => "password",
            Field::ConfirmPassword => "confirm_password",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", summary(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn message_for(&self, field: Field) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message)
    }

    fn check(&mut self, field: Field, result: Result<(), &'static str>) {
        if let Err(message) = result {
            self.errors.push(FieldError { field, message });
        }
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.trim().is_empty() {
        Err("Email is required")
    } else if !EMAIL.is_match(email) {
        Err("Please enter a valid email")
    } else {
        Ok(())
    }
}

pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.is_empty() {
        Err("Password is required")
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        Err("Password must be at least 6 characters")
    } else {
        Ok(())
    }
}

pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        Err("Name is required")
    } else if name.chars().count() < MIN_NAME_LEN {
        Err("Name must be at least 2 characters")
    } else {
        Ok(())
    }
}

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.trim().is_empty() {
        Err("Username is required")
    } else if username.chars().count() < MIN_USERNAME_LEN {
        Err("Username must be at least 3 characters")
    } else if !USERNAME.is_match(username) {
        Err("Username can only contain letters, numbers, and underscores")
    } else {
        Ok(())
    }
}

pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    if phone.trim().is_empty() {
        Err("Phone number is required")
    } else if !PHONE.is_match(phone) {
        Err("Please enter a valid 10-digit phone number")
    } else {
        Ok(())
    }
}

pub fn validate_address(address: &str) -> Result<(), &'static str> {
    if address.trim().is_empty() {
        Err("Address is required")
    } else if address.chars().count() < MIN_ADDRESS_LEN {
        Err("Please enter a complete address")
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check(Field::Email, validate_email(&self.email));
        errors.check(Field::Password, validate_password(&self.password));
        errors.into_result(Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub name: String,
    pub username: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub district: Option<String>,
    pub center_id: Option<CenterId>,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub username: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub district: String,
    pub center: CenterRef,
    pub password: String,
}

impl SignupForm {
    /// The district must exist and the center must belong to it. A blank
    /// username is left for the backend to derive from the name.
    pub fn validate(&self, directory: &DirectoryStore) -> Result<NewAccount, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check(Field::Name, validate_name(&self.name));
        let username = self.username.trim();
        if !username.is_empty() {
            errors.check(Field::Username, validate_username(username));
        }
        errors.check(Field::Phone, validate_phone(&self.phone));
        errors.check(Field::Email, validate_email(&self.email));
        errors.check(Field::Address, validate_address(&self.address));

        let district = self
            .district
            .as_deref()
            .filter(|d| directory.has_district(d));
        if district.is_none() {
            errors.check(Field::District, Err("Please select a district"));
        }

        let center = self
            .center_id
            .as_ref()
            .and_then(|id| directory.get(id))
            .filter(|center| Some(center.district.as_str()) == district);
        if center.is_none() {
            errors.check(Field::Center, Err("Please select a learning center"));
        }

        errors.check(Field::Password, validate_password(&self.password));
        if self.confirm_password.is_empty() {
            errors.check(Field::ConfirmPassword, Err("Please confirm your password"));
        } else if self.confirm_password != self.password {
            errors.check(Field::ConfirmPassword, Err("Passwords do not match"));
        }

        let (Some(district), Some(center)) = (district, center) else {
            return Err(errors);
        };
        errors.into_result(NewAccount {
            name: self.name.clone(),
            username: username.to_string(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
            district: district.to_string(),
            center: CenterRef {
                id: center.id.to_string(),
                name: center.name.clone(),
            },
            password: self.password.clone(),
        })
    }
}

pub fn validate_profile_update(update: &ProfileUpdate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if let Some(name) = &update.name {
        errors.check(Field::Name, validate_name(name));
    }
    if let Some(username) = &update.username {
        errors.check(Field::Username, validate_username(username));
    }
    if let Some(phone) = &update.phone {
        errors.check(Field::Phone, validate_phone(phone));
    }
    if let Some(address) = &update.address {
        errors.check(Field::Address, validate_address(address));
    }
    errors.into_result(())
}

#[cfg(test)]
#[path = "../tests/validation_tests.rs"]
mod tests;
