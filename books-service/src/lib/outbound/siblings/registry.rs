use std::collections::HashMap;
use std::fmt;

use reqwest::Url;
use thiserror::Error;

use crate::book::errors::SiblingError;

/// Logical names of the services this one calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceName {
    Auth,
    Downloads,
    Wishlist,
    Subscription,
    Review,
}

impl ServiceName {
    pub const ALL: [ServiceName; 5] = [
        ServiceName::Auth,
        ServiceName::Downloads,
        ServiceName::Wishlist,
        ServiceName::Subscription,
        ServiceName::Review,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceName::Auth => "auth",
            ServiceName::Downloads => "downloads",
            ServiceName::Wishlist => "wishlist",
            ServiceName::Subscription => "subscription",
            ServiceName::Review => "review",
        }
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("No address configured for service: {0}")]
    Missing(&'static str),

    #[error("Invalid address for service {service}: {message}")]
    InvalidAddress {
        service: &'static str,
        message: String,
    },
}

/// Base addresses of sibling services, validated once at startup.
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    addresses: HashMap<ServiceName, Url>,
}

impl ServiceRegistry {
    /// Build the registry from the `services` configuration table.
    ///
    /// Entries for unknown names are ignored.
    ///
    /// # Errors
    /// * `Missing` - A known service has no entry
    /// * `InvalidAddress` - An entry is not an absolute http(s) URL
    pub fn from_config(services: &HashMap<String, String>) -> Result<Self, RegistryError> {
        let mut addresses = HashMap::new();

        for name in ServiceName::ALL {
            let raw = services
                .get(name.as_str())
                .ok_or(RegistryError::Missing(name.as_str()))?;

            let url = Url::parse(raw.trim()).map_err(|e| RegistryError::InvalidAddress {
                service: name.as_str(),
                message: e.to_string(),
            })?;

            if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
                return Err(RegistryError::InvalidAddress {
                    service: name.as_str(),
                    message: format!("unsupported address {raw}"),
                });
            }

            addresses.insert(name, url);
        }

        Ok(Self { addresses })
    }

    /// URL of `segments` under the service's base address. Segments are
    /// percent-encoded.
    pub fn url(&self, service: ServiceName, segments: &[&str]) -> Result<Url, SiblingError> {
        let mut url = self
            .addresses
            .get(&service)
            .cloned()
            .ok_or_else(|| SiblingError::UnknownService(service.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| SiblingError::UnknownService(service.to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }
}
