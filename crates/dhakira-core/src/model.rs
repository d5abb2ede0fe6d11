//! Core data model types for dhakira.
//!
//! These are the flat JSON shapes exchanged with the backend. The client
//! does no normalization beyond what serde defaults provide.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A curriculum stage code such as `PS1`, `JS4` or `HSS3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageCode(String);

impl StageCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StageCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for StageCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StageCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Opaque identifier correlating a conversation with its backend history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionNonce(String);

impl SessionNonce {
    pub fn new(nonce: impl Into<String>) -> Self {
        Self(nonce.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The signed-in student, as stored in the local profile slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub firstname: String,
    pub educational_level: StageCode,
}

/// Login form.
///
/// Note: Custom Debug impl masks the password to keep it out of logs.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Sign-up form.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub firstname: String,
    pub educational_level: StageCode,
}

impl Registration {
    /// The profile the client stores after a successful sign-up.
    ///
    /// The backend answers sign-up with a bare message, so the profile is
    /// assembled from the submitted fields.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            email: self.email.clone(),
            firstname: self.firstname.clone(),
            educational_level: self.educational_level.clone(),
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("password", &"***")
            .field("firstname", &self.firstname)
            .field("educational_level", &self.educational_level)
            .finish()
    }
}

/// Profile edit, also used to persist a stage advancement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub email: String,
    pub firstname: String,
    pub educational_level: StageCode,
}

impl ProfileUpdate {
    /// Build an update that only moves `profile` to a new stage.
    pub fn stage_of(profile: &UserProfile, stage: StageCode) -> Self {
        Self {
            email: profile.email.clone(),
            firstname: profile.firstname.clone(),
            educational_level: stage,
        }
    }
}

/// `{"user": {...}}` returned by login and profile update.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEnvelope {
    pub user: UserProfile,
}

/// `{"message": "..."}` returned by sign-up.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageEnvelope {
    #[serde(default)]
    pub message: String,
}
