//! User entity and its password handling.

use crate::utils::error::{AppError, Result};
use crate::utils::validation::{validate_email, validate_password};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl Address {
    pub fn new(street: &str, city: &str, state: &str, zip_code: &str) -> Self {
        Self {
            street: street.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            zip_code: zip_code.to_string(),
            country: "US".to_string(),
        }
    }

    pub fn with_country(mut self, country: &str) -> Self {
        self.country = country.to_string();
        self
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {} {}, {}",
            self.street, self.city, self.state, self.zip_code, self.country
        )
    }
}

/// Salted SHA-256 digest stored as `salt_hex:digest_hex`.
#[derive(Clone, Default, PartialEq, Eq)]
struct PasswordHash(String);

impl PasswordHash {
    fn create(raw_password: &str) -> Self {
        let salt: [u8; 16] = rand::thread_rng().gen();
        let salt = hex::encode(salt);
        let digest = Self::digest(&salt, raw_password);
        Self(format!("{}:{}", salt, digest))
    }

    fn digest(salt: &str, raw_password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(raw_password.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn verify(&self, raw_password: &str) -> bool {
        match self.0.split_once(':') {
            Some((salt, digest)) => Self::digest(salt, raw_password) == digest,
            None => false,
        }
    }

    fn is_set(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_set() { "PasswordHash(***)" } else { "PasswordHash(unset)" })
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub username: String,
    pub email: String,
    password_hash: PasswordHash,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub addresses: Vec<Address>,
}

/// Serializable view of a user without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub created_at: String,
}

impl User {
    /// Creates a user without a password; the email must be well formed.
    pub fn new(username: &str, email: &str) -> Result<Self> {
        if !validate_email(email) {
            return Err(AppError::validation(format!(
                "Invalid email address: {}",
                email
            )));
        }

        Ok(Self {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: PasswordHash::default(),
            first_name: String::new(),
            last_name: String::new(),
            is_active: true,
            is_admin: false,
            created_at: Utc::now(),
            last_login: None,
            addresses: Vec::new(),
        })
    }

    pub fn create(username: &str, email: &str, password: &str) -> Result<Self> {
        let mut user = Self::new(username, email)?;
        user.set_password(password)?;
        Ok(user)
    }

    pub fn with_name(mut self, first_name: &str, last_name: &str) -> Self {
        self.first_name = first_name.to_string();
        self.last_name = last_name.to_string();
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn set_password(&mut self, raw_password: &str) -> Result<()> {
        if !validate_password(raw_password) {
            return Err(AppError::validation(
                "Password does not meet requirements.",
            ));
        }
        self.password_hash = PasswordHash::create(raw_password);
        Ok(())
    }

    pub fn check_password(&self, raw_password: &str) -> bool {
        self.password_hash.is_set() && self.password_hash.verify(raw_password)
    }

    pub fn add_address(&mut self, address: Address) {
        self.addresses.push(address);
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            username: self.username.clone(),
            email: self.email.clone(),
            full_name: self.full_name(),
            is_active: self.is_active,
            created_at: self.created_at.to_rfc3339(),
        }
    }
}
