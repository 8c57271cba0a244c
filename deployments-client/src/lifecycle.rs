//! Scoped create/use/destroy helpers.
//!
//! [`scoped`] creates a resource, hands its ID to a caller scope and always
//! runs the matching teardown afterwards, including when the scope returns
//! an error or panics. Teardown runs exactly once.
//!
//! When both the scope and the teardown fail, the scope's error stays the
//! primary one and the teardown failure travels alongside it in
//! [`ScopeError::ScopeAndRelease`]. Teardown failures are also logged.

use crate::error::ClientError;
use futures::FutureExt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Failure of a scoped resource lifecycle.
#[derive(Debug, Error)]
pub enum ScopeError<E> {
    /// The resource could not be created; the scope did not run.
    #[error("failed to create {resource}: {source}")]
    Acquire {
        resource: &'static str,
        source: ClientError,
    },

    /// The scope failed; teardown succeeded.
    #[error("{0}")]
    Scope(E),

    /// The scope succeeded but teardown failed.
    #[error("failed to clean up {resource} {id}: {source}")]
    Release {
        resource: &'static str,
        id: String,
        source: ClientError,
    },

    /// The scope failed and teardown failed too.
    #[error("{scope} (cleanup of {resource} {id} also failed: {release})")]
    ScopeAndRelease {
        resource: &'static str,
        id: String,
        scope: E,
        release: ClientError,
    },
}

impl<E> ScopeError<E> {
    /// The error returned by the scope, if it failed.
    pub fn scope_error(&self) -> Option<&E> {
        match self {
            Self::Scope(err) | Self::ScopeAndRelease { scope: err, .. } => Some(err),
            _ => None,
        }
    }

    /// The teardown failure, if teardown failed.
    pub fn release_error(&self) -> Option<&ClientError> {
        match self {
            Self::Release { source, .. } => Some(source),
            Self::ScopeAndRelease { release, .. } => Some(release),
            _ => None,
        }
    }
}

impl ScopeError<ClientError> {
    /// Collapse into the primary client error, dropping a secondary teardown failure.
    pub fn into_primary(self) -> ClientError {
        match self {
            Self::Acquire { source, .. } | Self::Release { source, .. } => source,
            Self::Scope(err) | Self::ScopeAndRelease { scope: err, .. } => err,
        }
    }
}

impl From<ScopeError<ClientError>> for ClientError {
    fn from(err: ScopeError<ClientError>) -> Self {
        err.into_primary()
    }
}

/// Create a resource, run `scope` with its ID, then tear it down.
///
/// * `resource` names the resource in errors and logs.
/// * `acquire` creates the resource and yields its ID.
/// * `release` destroys it; it is called exactly once if `acquire` succeeded.
/// * `scope` receives the ID.
///
/// A panic inside `scope` still triggers `release`; the panic is resumed
/// afterwards.
///
/// # Errors
///
/// See [`ScopeError`] for how creation, scope and teardown failures combine.
pub async fn scoped<T, E, A, R, RFut, F, Fut>(
    resource: &'static str,
    acquire: A,
    release: R,
    scope: F,
) -> Result<T, ScopeError<E>>
where
    A: Future<Output = crate::Result<String>>,
    R: FnOnce(String) -> RFut,
    RFut: Future<Output = crate::Result<()>>,
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let id = acquire
        .await
        .map_err(|source| ScopeError::Acquire { resource, source })?;

    let scope_id = id.clone();
    let outcome = AssertUnwindSafe(async move { scope(scope_id).await })
        .catch_unwind()
        .await;

    let released = release(id.clone()).await;
    if let Err(ref err) = released {
        tracing::warn!(resource, id = %id, error = %err, "teardown failed");
    }

    match (outcome, released) {
        (Err(payload), released) => {
            if released.is_err() {
                tracing::error!(resource, id = %id, "teardown failed while unwinding a panicked scope");
            }
            panic::resume_unwind(payload)
        }
        (Ok(Ok(value)), Ok(())) => Ok(value),
        (Ok(Err(scope)), Ok(())) => Err(ScopeError::Scope(scope)),
        (Ok(Ok(_)), Err(source)) => Err(ScopeError::Release {
            resource,
            id,
            source,
        }),
        (Ok(Err(scope)), Err(release)) => Err(ScopeError::ScopeAndRelease {
            resource,
            id,
            scope,
            release,
        }),
    }
}
