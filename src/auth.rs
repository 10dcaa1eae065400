//! Authentication tokens sent as part of the `HELLO`/`LOGON` handshake.

use std::fmt;

use crate::types::{BoltMap, BoltType};

/// Credentials presented to the server when a connection is established.
///
/// The shape mirrors what the server's auth providers actually accept: `basic` for the built-in
/// username/password provider, `bearer` for SSO/OIDC tokens, `kerberos` for a base64 ticket, and
/// `custom` for anything else a pluggable `AuthenticationProvider` on the server understands.
#[derive(Clone)]
pub enum AuthToken {
    Basic {
        principal: String,
        credentials: String,
        realm: Option<String>,
    },
    Bearer {
        token: String,
    },
    Kerberos {
        ticket: String,
    },
    Custom {
        principal: String,
        credentials: String,
        realm: String,
        scheme: String,
        parameters: BoltMap,
    },
    None,
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // credentials are never rendered, even in Debug output.
        match self {
            AuthToken::Basic { principal, .. } => f
                .debug_struct("Basic")
                .field("principal", principal)
                .finish(),
            AuthToken::Bearer { .. } => f.debug_struct("Bearer").finish(),
            AuthToken::Kerberos { .. } => f.debug_struct("Kerberos").finish(),
            AuthToken::Custom {
                principal, scheme, ..
            } => f
                .debug_struct("Custom")
                .field("principal", principal)
                .field("scheme", scheme)
                .finish(),
            AuthToken::None => f.write_str("None"),
        }
    }
}

impl AuthToken {
    pub fn basic(principal: impl Into<String>, credentials: impl Into<String>) -> Self {
        AuthToken::Basic {
            principal: principal.into(),
            credentials: credentials.into(),
            realm: None,
        }
    }

    pub fn basic_with_realm(
        principal: impl Into<String>,
        credentials: impl Into<String>,
        realm: impl Into<String>,
    ) -> Self {
        AuthToken::Basic {
            principal: principal.into(),
            credentials: credentials.into(),
            realm: Some(realm.into()),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        AuthToken::Bearer {
            token: token.into(),
        }
    }

    pub fn kerberos(ticket: impl Into<String>) -> Self {
        AuthToken::Kerberos {
            ticket: ticket.into(),
        }
    }

    pub fn custom(
        principal: impl Into<String>,
        credentials: impl Into<String>,
        realm: impl Into<String>,
        scheme: impl Into<String>,
    ) -> Self {
        AuthToken::Custom {
            principal: principal.into(),
            credentials: credentials.into(),
            realm: realm.into(),
            scheme: scheme.into(),
            parameters: BoltMap::default(),
        }
    }

    /// Builds the `extra` map merged into the `HELLO`/`LOGON` message.
    pub(crate) fn to_extra(&self) -> BoltMap {
        let mut extra = BoltMap::default();
        match self {
            AuthToken::Basic {
                principal,
                credentials,
                realm,
            } => {
                extra.put("scheme".into(), "basic".into());
                extra.put("principal".into(), principal.as_str().into());
                extra.put("credentials".into(), credentials.as_str().into());
                if let Some(realm) = realm {
                    extra.put("realm".into(), realm.as_str().into());
                }
            }
            AuthToken::Bearer { token } => {
                extra.put("scheme".into(), "bearer".into());
                extra.put("credentials".into(), token.as_str().into());
            }
            AuthToken::Kerberos { ticket } => {
                extra.put("scheme".into(), "kerberos".into());
                extra.put("principal".into(), "".into());
                extra.put("credentials".into(), ticket.as_str().into());
            }
            AuthToken::Custom {
                principal,
                credentials,
                realm,
                scheme,
                parameters,
            } => {
                extra.put("scheme".into(), scheme.as_str().into());
                extra.put("principal".into(), principal.as_str().into());
                extra.put("credentials".into(), credentials.as_str().into());
                extra.put("realm".into(), realm.as_str().into());
                for (k, v) in parameters.value.iter() {
                    extra.put(k.clone(), v.clone());
                }
            }
            AuthToken::None => {
                extra.put("scheme".into(), "none".into());
            }
        }
        extra
    }
}

impl From<AuthToken> for BoltType {
    fn from(token: AuthToken) -> Self {
        BoltType::Map(token.to_extra())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_extra_never_leaks_credentials_in_debug() {
        let token = AuthToken::basic("neo4j", "s3cr3t");
        let rendered = format!("{:?}", token);
        assert!(!rendered.contains("s3cr3t"));
    }

    #[test]
    fn basic_extra_has_scheme_and_principal() {
        let extra = AuthToken::basic("neo4j", "s3cr3t").to_extra();
        assert_eq!(extra.get::<String>("scheme").as_deref(), Some("basic"));
        assert_eq!(extra.get::<String>("principal").as_deref(), Some("neo4j"));
        assert_eq!(
            extra.get::<String>("credentials").as_deref(),
            Some("s3cr3t")
        );
    }
}
