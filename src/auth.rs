use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Duration, Utc};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use serde::{Deserialize, Serialize};
use tracing;

use crate::config::Config;
use crate::model::{AuthResponse, HarmouraClient};

const LOGIN_ATTEMPTS: usize = 3;

/// Signed-in user and the backend's tokens
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub remember_me: bool,
}

impl Session {
    /// Access tokens live 24 h with remember-me, 1 h without.
    pub fn lifetime(remember_me: bool) -> Duration {
        if remember_me {
            Duration::hours(24)
        } else {
            Duration::hours(1)
        }
    }

    pub fn from_response(response: AuthResponse, remember_me: bool, now: DateTime<Utc>) -> Self {
        Self {
            username: response.username,
            access_token: response.tokens.access,
            refresh_token: response.tokens.refresh,
            expires_at: now + Self::lifetime(remember_me),
            remember_me,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Cached session at `path`, if there is one that has not expired yet.
pub fn load_cached(path: &Path, now: DateTime<Utc>) -> Option<Session> {
    let contents = fs::read_to_string(path).ok()?;
    let session = match serde_json::from_str::<Session>(&contents) {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "Discarding unreadable session cache");
            let _ = fs::remove_file(path);
            return None;
        }
    };

    if session.is_expired_at(now) {
        tracing::info!(username = %session.username, "Cached session expired");
        let _ = fs::remove_file(path);
        return None;
    }
    Some(session)
}

/// Persist the session. Only remember-me sessions touch the disk.
pub fn save(path: &Path, session: &Session) -> Result<()> {
    if !session.remember_me {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(session)?)?;
    tracing::debug!(path = %path.display(), "Saved session to disk");
    Ok(())
}

/// Forget the cached session. Missing files are fine.
pub fn clear(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "Removed cached session");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn prompt_line(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Err(anyhow!("Input closed"));
    }
    Ok(line.trim().to_string())
}

/// Read a line without echoing it.
fn prompt_password(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    terminal::enable_raw_mode()?;
    let result = read_hidden();
    terminal::disable_raw_mode()?;
    println!();
    result
}

fn read_hidden() -> Result<String> {
    let mut password = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Enter => return Ok(password),
                KeyCode::Backspace => {
                    password.pop();
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err(anyhow!("Cancelled"));
                }
                KeyCode::Esc => return Err(anyhow!("Cancelled")),
                KeyCode::Char(c) => password.push(c),
                _ => {}
            }
        }
    }
}

fn prompt_yes_no(label: &str) -> Result<bool> {
    let answer = prompt_line(label)?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}

/// Reuse a cached session or sign in on the terminal.
pub async fn establish_session(client: &HarmouraClient, config: &Config) -> Result<Session> {
    let path = config.session_path();
    if let Some(session) = load_cached(&path, Utc::now()) {
        tracing::info!(username = %session.username, "Reusing cached session");
        return Ok(session);
    }

    println!("Sign in to Harmoura at {}", config.base_url);
    for attempt in 1..=LOGIN_ATTEMPTS {
        let email = prompt_line("Email: ")?;
        let password = prompt_password("Password: ")?;
        let remember_me = prompt_yes_no("Remember me? [y/N]: ")?;

        match client.login(&email, &password, remember_me).await {
            Ok(response) => {
                let session = Session::from_response(response, remember_me, Utc::now());
                save(&path, &session)?;
                println!("Signed in as {}", session.username);
                tracing::info!(username = %session.username, remember_me, "Signed in");
                return Ok(session);
            }
            Err(e) => {
                tracing::warn!(attempt, error = %e, "Sign in failed");
                println!("Sign in failed: {}", e);
            }
        }
    }

    Err(anyhow!("Sign in failed after {} attempts", LOGIN_ATTEMPTS))
}

/// Create an account on the terminal and keep its session in memory.
pub async fn register_account(client: &HarmouraClient, config: &Config) -> Result<Session> {
    println!("Create a Harmoura account at {}", config.base_url);
    let username = prompt_line("Username: ")?;
    let email = prompt_line("Email: ")?;
    let password = prompt_password("Password: ")?;
    let confirm = prompt_password("Confirm password: ")?;
    if password != confirm {
        return Err(anyhow!("Passwords do not match"));
    }

    let response = client.register(&username, &email, &password).await?;
    if !response.message.is_empty() {
        println!("{}", response.message);
    }
    tracing::info!(username = %response.username, "Registered account");
    Ok(Session::from_response(response, false, Utc::now()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AuthTokens;

    fn response() -> AuthResponse {
        AuthResponse {
            message: "Login successful".to_string(),
            username: "asha".to_string(),
            tokens: AuthTokens {
                refresh: "refresh-token".to_string(),
                access: "access-token".to_string(),
            },
        }
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("harmoura-auth-{}-{}", name, std::process::id()))
            .join("session.json")
    }

    #[test]
    fn lifetime_follows_remember_me() {
        let now = Utc::now();
        let short = Session::from_response(response(), false, now);
        let long = Session::from_response(response(), true, now);

        assert_eq!(short.expires_at, now + Duration::hours(1));
        assert_eq!(long.expires_at, now + Duration::hours(24));
        assert!(!short.is_expired_at(now + Duration::minutes(59)));
        assert!(short.is_expired_at(now + Duration::minutes(60)));
    }

    #[test]
    fn remembered_sessions_round_trip_through_disk() {
        let path = temp_path("remembered");
        let now = Utc::now();
        let session = Session::from_response(response(), true, now);

        save(&path, &session).unwrap();
        assert_eq!(load_cached(&path, now), Some(session));

        clear(&path).unwrap();
        assert!(!path.exists());
        clear(&path).unwrap();
    }

    #[test]
    fn unremembered_sessions_stay_in_memory() {
        let path = temp_path("memory");
        save(&path, &Session::from_response(response(), false, Utc::now())).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn expired_cache_is_discarded() {
        let path = temp_path("expired");
        let then = Utc::now() - Duration::hours(30);
        save(&path, &Session::from_response(response(), true, then)).unwrap();

        assert_eq!(load_cached(&path, Utc::now()), None);
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_cache_is_discarded() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(load_cached(&path, Utc::now()), None);
        assert!(!path.exists());
    }
}
