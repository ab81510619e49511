//! Role resolution.
//!
//! A user is elevated when a marker document exists at `roles_admin/{uid}`.
//! Everything else resolves to [`Role::Standard`]: no user, an absent marker
//! and a failed lookup alike. Ambiguity never grants privilege. The
//! [`RoleBasis`] records which of those cases applied so operational faults
//! stay visible in logs and responses.
//!
//! [`RoleResolver`] holds the role for one session. Its cache is keyed on the
//! identity it was computed for and is invalidated by
//! [`RoleResolver::identity_changed`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::ports::{DocumentStore, RoleQuery};
use crate::domain::{UserId, paths};

/// Privilege level of the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Administrative access.
    Elevated,
    /// Default access.
    Standard,
}

/// Why a role was assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoleBasis {
    /// No user was signed in; the store was not consulted.
    Anonymous,
    /// The admin marker exists.
    MarkerPresent,
    /// The admin marker does not exist.
    MarkerAbsent,
    /// The marker lookup failed.
    LookupFailed {
        /// Failure reported by the store.
        message: String,
    },
}

/// Final answer of a role lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleResolution {
    /// Assigned role.
    pub role: Role,
    /// Reason for the assignment.
    pub basis: RoleBasis,
}

impl RoleResolution {
    fn standard(basis: RoleBasis) -> Self {
        Self {
            role: Role::Standard,
            basis,
        }
    }

    /// Whether the user holds elevated privileges.
    pub fn is_elevated(&self) -> bool {
        self.role == Role::Elevated
    }
}

/// Observable state of a [`RoleResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleState {
    /// A lookup is pending for the current identity.
    Loading,
    /// The role for the current identity is known.
    Resolved(RoleResolution),
}

#[derive(Debug)]
struct Session {
    identity: Option<UserId>,
    generation: u64,
    state: RoleState,
}

/// Session-scoped role cache.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use carehub::domain::{Role, RoleResolver, RoleState};
/// use carehub::outbound::memory::InMemoryDocumentStore;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let resolver = RoleResolver::new(Arc::new(InMemoryDocumentStore::new()));
/// assert_eq!(resolver.state(), RoleState::Loading);
/// let resolution = resolver.resolve(None).await;
/// assert_eq!(resolution.role, Role::Standard);
/// # });
/// ```
pub struct RoleResolver<S: ?Sized> {
    store: Arc<S>,
    session: Mutex<Session>,
}

impl<S: ?Sized> RoleResolver<S> {
    /// Resolver with no identity, in the loading state.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            session: Mutex::new(Session {
                identity: None,
                generation: 0,
                state: RoleState::Loading,
            }),
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current state for the current identity.
    pub fn state(&self) -> RoleState {
        self.session().state.clone()
    }

    /// Record a sign-in, sign-out or user switch.
    ///
    /// A different identity drops the cached role and returns the resolver to
    /// [`RoleState::Loading`]; lookups still in flight for the previous
    /// identity will not be cached. Repeating the current identity is a no-op.
    pub fn identity_changed(&self, identity: Option<UserId>) {
        let mut session = self.session();
        if session.identity == identity {
            return;
        }
        session.identity = identity;
        Self::invalidate(&mut session);
    }

    fn invalidate(session: &mut Session) {
        session.generation += 1;
        session.state = RoleState::Loading;
    }
}

impl<S> RoleResolver<S>
where
    S: DocumentStore + ?Sized,
{
    /// Resolve the role for `identity`.
    ///
    /// Returns the cached resolution when `identity` matches the one already
    /// resolved. Otherwise this switches to `identity`, probes the marker and
    /// caches the result unless the identity changed while probing. The
    /// returned resolution always answers for `identity`.
    pub async fn resolve(&self, identity: Option<&UserId>) -> RoleResolution {
        let generation = {
            let mut session = self.session();
            if session.identity.as_ref() != identity {
                session.identity = identity.cloned();
                Self::invalidate(&mut session);
            } else if let RoleState::Resolved(resolution) = &session.state {
                return resolution.clone();
            }
            session.generation
        };
        self.probe_and_store(identity, generation).await
    }

    /// Discard the cached role and probe again for the current identity.
    pub async fn refresh(&self) -> RoleResolution {
        let (identity, generation) = {
            let mut session = self.session();
            Self::invalidate(&mut session);
            (session.identity.clone(), session.generation)
        };
        self.probe_and_store(identity.as_ref(), generation).await
    }

    async fn probe_and_store(&self, identity: Option<&UserId>, generation: u64) -> RoleResolution {
        let resolution = self.probe(identity).await;
        let mut session = self.session();
        if session.generation == generation {
            session.state = RoleState::Resolved(resolution.clone());
        } else {
            debug!("identity changed during role lookup; discarding result");
        }
        resolution
    }

    async fn probe(&self, identity: Option<&UserId>) -> RoleResolution {
        let Some(user_id) = identity else {
            return RoleResolution::standard(RoleBasis::Anonymous);
        };
        match self.store.get(&paths::admin_role_marker(user_id)).await {
            Ok(Some(_)) => RoleResolution {
                role: Role::Elevated,
                basis: RoleBasis::MarkerPresent,
            },
            Ok(None) => RoleResolution::standard(RoleBasis::MarkerAbsent),
            Err(error) => {
                warn!(
                    user_id = %user_id,
                    error = %error,
                    "admin marker lookup failed; resolving to standard role"
                );
                RoleResolution::standard(RoleBasis::LookupFailed {
                    message: error.to_string(),
                })
            }
        }
    }
}

/// Role lookups for stateless callers.
///
/// Each call uses a fresh [`RoleResolver`], so nothing is cached between
/// requests or shared between users.
pub struct RoleService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> RoleService<S> {
    /// Create a service over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> RoleQuery for RoleService<S>
where
    S: DocumentStore + ?Sized,
{
    async fn resolve_role(&self, user: Option<UserId>) -> RoleResolution {
        RoleResolver::new(Arc::clone(&self.store))
            .resolve(user.as_ref())
            .await
    }
}
