use std::net::SocketAddr;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// A user record as seen by the gate: identity, granted authorities and
/// whether the account may log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetails {
    pub username: String,
    pub authorities: Vec<String>,
    pub enabled: bool,
}

/// Metadata about the request an authentication was established on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDetails {
    pub request_id: Uuid,
    pub remote_addr: Option<SocketAddr>,
}

impl RequestDetails {
    pub fn new(remote_addr: Option<SocketAddr>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            remote_addr,
        }
    }
}

/// An authenticated principal bound to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authentication {
    pub principal: UserDetails,
    pub authorities: Vec<String>,
    pub details: RequestDetails,
}

impl Authentication {
    pub fn new(principal: UserDetails, details: RequestDetails) -> Self {
        let authorities = principal.authorities.clone();
        Self {
            principal,
            authorities,
            details,
        }
    }

    pub fn username(&self) -> &str {
        &self.principal.username
    }
}

/// Per-request security state, passed along the handling chain by value.
///
/// Starts empty and can be populated at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityContext {
    authentication: Option<Authentication>,
}

impl SecurityContext {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn authenticated(authentication: Authentication) -> Self {
        Self {
            authentication: Some(authentication),
        }
    }

    pub fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authentication.is_some()
    }

    /// Store `authentication` unless one is already present.
    ///
    /// Returns whether the context changed.
    pub fn set_if_absent(&mut self, authentication: Authentication) -> bool {
        if self.authentication.is_some() {
            return false;
        }
        self.authentication = Some(authentication);
        true
    }
}
