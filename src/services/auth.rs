use crate::config::AppConfig;
use crate::domain::user::User;
use crate::utils::error::{AppError, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::collections::HashMap;

const TOKEN_BYTES: usize = 32;

/// Registration input.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl NewUser {
    pub fn new(username: &str, email: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    pub fn name(mut self, first_name: &str, last_name: &str) -> Self {
        self.first_name = first_name.to_string();
        self.last_name = last_name.to_string();
        self
    }
}

#[derive(Debug, Clone)]
struct Session {
    username: String,
    expires_at: DateTime<Utc>,
}

/// In-memory user registry with bearer-token sessions.
pub struct AuthService {
    users: HashMap<String, User>,
    tokens: HashMap<String, Session>,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            users: HashMap::new(),
            tokens: HashMap::new(),
            token_ttl: Duration::hours(config.token_expiry_hours),
        }
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn register(&mut self, new_user: NewUser) -> Result<&User> {
        if self.users.contains_key(&new_user.username) {
            return Err(AppError::ConflictError(format!(
                "Username '{}' is already taken.",
                new_user.username
            )));
        }

        let user = User::create(&new_user.username, &new_user.email, &new_user.password)?
            .with_name(&new_user.first_name, &new_user.last_name);

        tracing::info!("Registered new user: {}", user.username);
        let user: &User = self.users.entry(new_user.username).or_insert(user);
        Ok(user)
    }

    /// Returns a fresh session token.
    pub fn login(&mut self, username: &str, password: &str) -> Result<String> {
        let user = match self.users.get_mut(username) {
            Some(user) if user.check_password(password) => user,
            _ => {
                return Err(AppError::AuthenticationError(
                    "Invalid username or password.".to_string(),
                ))
            }
        };
        if !user.is_active {
            return Err(AppError::AuthenticationError(
                "Account is deactivated.".to_string(),
            ));
        }

        let now = Utc::now();
        user.last_login = Some(now);

        let token = generate_token();
        self.tokens.insert(
            token.clone(),
            Session {
                username: username.to_string(),
                expires_at: now + self.token_ttl,
            },
        );

        tracing::info!("User '{}' logged in.", username);
        Ok(token)
    }

    pub fn logout(&mut self, token: &str) {
        if let Some(session) = self.tokens.remove(token) {
            tracing::info!("User '{}' logged out.", session.username);
        }
    }

    /// Expired tokens are dropped on lookup.
    pub fn get_user_from_token(&mut self, token: &str) -> Option<&User> {
        let session = self.tokens.get(token)?;
        if Utc::now() > session.expires_at {
            self.tokens.remove(token);
            return None;
        }
        let username = session.username.clone();
        self.users.get(&username)
    }

    /// Marks the account inactive and revokes its open sessions.
    pub fn deactivate(&mut self, username: &str) -> Result<()> {
        let user = self
            .users
            .get_mut(username)
            .ok_or_else(|| AppError::NotFoundError(format!("user '{}'", username)))?;
        user.is_active = false;

        self.tokens.retain(|_, session| session.username != username);
        tracing::info!("Deactivated user '{}'", username);
        Ok(())
    }

    pub fn user(&self, username: &str) -> Option<&User> {
        self.users.get(username)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn active_sessions(&self) -> usize {
        self.tokens.len()
    }
}

fn generate_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::thread_rng().gen();
    URL_SAFE_NO_PAD.encode(bytes)
}
