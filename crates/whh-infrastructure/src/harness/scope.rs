//! Scoped service accessor
//!
//! One [`TestScope`] is one unit of work of the subject: services resolved
//! from it share a repository handle that is released with the scope.

use crate::harness::subject::{SubjectEntryPoint, SubjectHost};
use dill::Catalog;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;
use whh_domain::error::{Error, Result};

/// Per-test service scope
///
/// Released explicitly with [`release`](Self::release) or on drop.
pub struct TestScope {
    subject: String,
    services: Mutex<Option<Catalog>>,
}

impl TestScope {
    pub(crate) fn new(subject: &str, services: Catalog) -> Self {
        debug!(subject = %subject, "Opened test scope");
        Self {
            subject: subject.to_string(),
            services: Mutex::new(Some(services)),
        }
    }

    /// Resolve a service registered in the scope or the subject's root services
    ///
    /// # Errors
    /// - `InvalidState` once the scope is released
    /// - `NotFound` if nothing of type `T` is registered
    pub fn get<T>(&self) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let services = self.services.lock().unwrap_or_else(PoisonError::into_inner);
        let catalog = services.as_ref().ok_or_else(|| {
            Error::invalid_state(
                format!("test scope of '{}'", self.subject),
                "resolve a service",
                "released",
            )
        })?;
        catalog.get_one::<T>().map_err(|e| {
            Error::not_found(format!(
                "service {} in scope of '{}': {e}",
                std::any::type_name::<T>(),
                self.subject
            ))
        })
    }

    /// Whether the scope was released
    pub fn is_released(&self) -> bool {
        self.services
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Release the scope's services; later calls are no-ops
    pub fn release(&self) {
        let released = self
            .services
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if released.is_some() {
            debug!(subject = %self.subject, "Released test scope");
        }
    }
}

impl Drop for TestScope {
    fn drop(&mut self) {
        self.release();
    }
}

/// Run `body` inside a fresh scope of `host`
///
/// The scope is released when the body returns, fails or panics; a panic
/// is resumed after the release.
///
/// # Errors
/// `ScopeCreation` if the scope cannot be opened, otherwise whatever `body` returns.
pub async fn with_scope<E, F, Fut, T>(host: &SubjectHost<E>, body: F) -> Result<T>
where
    E: SubjectEntryPoint,
    F: FnOnce(Arc<TestScope>) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let scope = Arc::new(host.create_scope().await?);
    let outcome = AssertUnwindSafe(body(Arc::clone(&scope)))
        .catch_unwind()
        .await;
    scope.release();

    match outcome {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
