//! Application-wide state: who is signed in, and who wants to know.

use anyhow::Result;
use tokio::sync::watch;

use crate::error::ClientError;
use crate::model::{StageCode, UserProfile};
use crate::router::{guard, Route};
use crate::store::ProfileStore;

/// A change to the signed-in profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    LoggedIn(UserProfile),
    ProfileEdited {
        firstname: String,
        educational_level: StageCode,
    },
    StageAdvanced(StageCode),
    LoggedOut,
}

/// Owns the profile slot and broadcasts every change to it.
pub struct AppContext {
    store: ProfileStore,
    profile: Option<UserProfile>,
    tx: watch::Sender<Option<UserProfile>>,
}

impl AppContext {
    /// Open the context, loading whatever profile the store holds.
    pub fn open(store: ProfileStore) -> Result<Self> {
        let profile = store.load()?;
        let (tx, _) = watch::channel(profile.clone());
        Ok(Self { store, profile, tx })
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn require_profile(&self) -> Result<&UserProfile, ClientError> {
        self.profile.as_ref().ok_or(ClientError::NotLoggedIn)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UserProfile>> {
        self.tx.subscribe()
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    /// Resolve a navigation through the session guard.
    pub fn route(&self, requested: Route) -> Route {
        guard(requested, self.profile.as_ref())
    }

    /// Apply `action`, persist the result and notify subscribers.
    ///
    /// Edits without a signed-in profile fail with [`ClientError::NotLoggedIn`].
    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        let next = match action {
            Action::LoggedIn(profile) => Some(profile),
            Action::LoggedOut => None,
            Action::ProfileEdited {
                firstname,
                educational_level,
            } => {
                let mut profile = self.require_profile()?.clone();
                profile.firstname = firstname;
                profile.educational_level = educational_level;
                Some(profile)
            }
            Action::StageAdvanced(stage) => {
                let mut profile = self.require_profile()?.clone();
                tracing::info!(
                    "advancing {} from {} to {}",
                    profile.email,
                    profile.educational_level,
                    stage
                );
                profile.educational_level = stage;
                Some(profile)
            }
        };

        match &next {
            Some(profile) => self.store.save(profile)?,
            None => self.store.clear()?,
        }
        self.profile = next;
        self.tx.send_replace(self.profile.clone());
        Ok(())
    }

    /// The page a login or logout leads to.
    pub fn landing_after(action: &Action) -> Route {
        match action {
            Action::LoggedOut => Route::Login,
            _ => Route::Chat,
        }
    }
}
