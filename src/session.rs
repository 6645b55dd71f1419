//! Session
//!
//! Who is using the storefront. Identity is captured, never verified: a login
//! is a name, a phone and a region, and the admin role comes from the
//! configured admin login names.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{config::IdentityConfig, regions::Region};

/// Session errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Login without a name
    #[error("Mohon isi nama Anda.")]
    MissingName,

    /// Registration with a missing field
    #[error("Mohon lengkapi semua data termasuk lokasi.")]
    IncompleteRegistration,

    /// The operation needs a logged-in actor
    #[error("Silakan masuk terlebih dahulu.")]
    NotAuthenticated,

    /// The operation needs the admin role
    #[error("Hanya admin yang dapat melakukan tindakan ini.")]
    NotAdmin,
}

/// Identity captured at login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name
    pub name: String,

    /// Phone number as entered
    pub phone: String,

    /// Home region
    pub region: Region,
}

/// Current actor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Actor {
    /// Nobody logged in
    #[default]
    Anonymous,

    /// Purchaser
    User(Profile),

    /// Order reviewer
    Admin(Profile),
}

impl Actor {
    /// Profile of a logged-in actor.
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            Actor::Anonymous => None,
            Actor::User(profile) | Actor::Admin(profile) => Some(profile),
        }
    }

    /// Whether anyone is logged in.
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Actor::Anonymous)
    }

    /// Whether the actor holds the admin role.
    pub fn is_admin(&self) -> bool {
        matches!(self, Actor::Admin(_))
    }
}

/// Login or registration form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Name as typed
    pub name: String,

    /// Phone as typed
    pub phone: String,

    /// Selected region
    pub region: Option<Region>,
}

impl Credentials {
    /// Form with every field filled in.
    pub fn new(name: impl Into<String>, phone: impl Into<String>, region: Region) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            region: Some(region),
        }
    }
}

/// Session
#[derive(Clone, Debug)]
pub struct Session {
    identity: IdentityConfig,
    actor: Actor,
}

impl Session {
    /// Anonymous session.
    pub fn new(identity: IdentityConfig) -> Self {
        Self {
            identity,
            actor: Actor::Anonymous,
        }
    }

    /// Current actor.
    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Logs in. A blank phone or missing region falls back to the configured
    /// defaults; an admin login name grants the admin role.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingName`] for a blank name.
    pub fn login(&mut self, credentials: Credentials) -> Result<&Actor, AuthError> {
        let name = credentials.name.trim();

        if name.is_empty() {
            return Err(AuthError::MissingName);
        }

        let phone = if credentials.phone.trim().is_empty() {
            self.identity.fallback_phone.clone()
        } else {
            credentials.phone.trim().to_string()
        };

        let region = credentials.region.unwrap_or(self.identity.fallback_region);

        self.actor = if self.identity.is_admin_name(name) {
            Actor::Admin(Profile {
                name: self.identity.admin_display_name.clone(),
                phone,
                region,
            })
        } else {
            Actor::User(Profile {
                name: name.to_string(),
                phone,
                region,
            })
        };

        info!(admin = self.actor.is_admin(), "logged in");

        Ok(&self.actor)
    }

    /// Registers a new identity; every field is required.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::IncompleteRegistration`] when the name, phone or
    /// region is missing.
    pub fn register(&mut self, credentials: Credentials) -> Result<&Actor, AuthError> {
        if credentials.name.trim().is_empty()
            || credentials.phone.trim().is_empty()
            || credentials.region.is_none()
        {
            return Err(AuthError::IncompleteRegistration);
        }

        self.login(credentials)
    }

    /// Logs out, returning the previous actor.
    pub fn logout(&mut self) -> Actor {
        info!("logged out");

        std::mem::take(&mut self.actor)
    }

    /// Profile of the logged-in actor.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotAuthenticated`] when nobody is logged in.
    pub fn require_profile(&self) -> Result<&Profile, AuthError> {
        self.actor.profile().ok_or(AuthError::NotAuthenticated)
    }

    /// Profile of the logged-in admin.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotAuthenticated`] when nobody is logged in and
    /// [`AuthError::NotAdmin`] for a purchaser.
    pub fn require_admin(&self) -> Result<&Profile, AuthError> {
        match &self.actor {
            Actor::Admin(profile) => Ok(profile),
            Actor::User(_) => Err(AuthError::NotAdmin),
            Actor::Anonymous => Err(AuthError::NotAuthenticated),
        }
    }
}
