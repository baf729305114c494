//! # guard-checkout
//!
//! Working checkouts for Guardian audit runs.
//!
//! A [`CheckoutProvider`] turns a repository reference into a [`ScanSession`]:
//! - [`GitCheckout`] clones a URL with `gix` into a temporary directory
//! - [`LocalCheckout`] borrows a directory that already exists
//! - [`RepositoryCheckout`] picks one of the two from the shape of the input
//!
//! This crate isolates the `gix` dependency from the rest of the workspace.

pub mod error;
mod git;
mod local;
mod session;

use std::future::Future;

pub use error::CheckoutError;
pub use git::{GitCheckout, looks_like_remote};
pub use local::LocalCheckout;
pub use session::ScanSession;

/// Acquires a scoped working copy of a repository.
pub trait CheckoutProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns [`CheckoutError`] when the repository cannot be reached or
    /// materialized. Audits treat this as fatal.
    fn acquire(
        &self,
        source: &str,
    ) -> impl Future<Output = Result<ScanSession, CheckoutError>> + Send;
}

/// Clones remotes, borrows local directories.
#[derive(Debug, Clone, Default)]
pub struct RepositoryCheckout {
    git: GitCheckout,
    local: LocalCheckout,
}

impl RepositoryCheckout {
    #[must_use]
    pub const fn new(git: GitCheckout) -> Self {
        Self {
            git,
            local: LocalCheckout,
        }
    }
}

impl CheckoutProvider for RepositoryCheckout {
    async fn acquire(&self, source: &str) -> Result<ScanSession, CheckoutError> {
        if looks_like_remote(source) {
            self.git.acquire(source).await
        } else {
            self.local.acquire(source).await
        }
    }
}
