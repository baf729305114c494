use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tempfile::TempDir;

use crate::error::CheckoutError;
use crate::session::ScanSession;
use crate::CheckoutProvider;

/// Clones a remote repository into a fresh temporary directory.
///
/// Uses gix's blocking client on the blocking thread pool. The clone is
/// shallow unless `depth` is `None`.
#[derive(Debug, Clone)]
pub struct GitCheckout {
    depth: Option<NonZeroU32>,
    parent_dir: Option<PathBuf>,
}

impl Default for GitCheckout {
    fn default() -> Self {
        Self {
            depth: NonZeroU32::new(1),
            parent_dir: None,
        }
    }
}

impl GitCheckout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch full history instead of a depth-1 clone.
    #[must_use]
    pub const fn full_history(mut self) -> Self {
        self.depth = None;
        self
    }

    /// Create temporary checkouts under `dir` instead of the system temp dir.
    #[must_use]
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.parent_dir = Some(dir.into());
        self
    }

    fn temp_dir(&self) -> Result<TempDir, CheckoutError> {
        let builder = {
            let mut b = tempfile::Builder::new();
            b.prefix("guardian-checkout-");
            b
        };
        let dir = match &self.parent_dir {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        Ok(dir)
    }
}

/// `true` for inputs that name a remote rather than a local directory.
#[must_use]
pub fn looks_like_remote(source: &str) -> bool {
    source.contains("://") || (source.starts_with("git@") && source.contains(':'))
}

/// Raises the clone's interrupt flag when the acquiring future goes away.
struct InterruptOnDrop(Arc<AtomicBool>);

impl Drop for InterruptOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

fn clone_into(
    url: &str,
    dest: &Path,
    depth: Option<NonZeroU32>,
    interrupt: &AtomicBool,
) -> Result<(), CheckoutError> {
    let clone_err = |reason: String| CheckoutError::Clone {
        url: url.to_string(),
        reason,
    };

    let mut prepare = gix::prepare_clone(url, dest).map_err(|e| clone_err(e.to_string()))?;
    if let Some(depth) = depth {
        prepare = prepare.with_shallow(gix::remote::fetch::Shallow::DepthAtRemote(depth));
    }

    let (mut checkout, _) = prepare
        .fetch_then_checkout(gix::progress::Discard, interrupt)
        .map_err(|e| clone_err(format!("fetch: {e}")))?;
    checkout
        .main_worktree(gix::progress::Discard, interrupt)
        .map_err(|e| clone_err(format!("checkout: {e}")))?;
    Ok(())
}

impl CheckoutProvider for GitCheckout {
    async fn acquire(&self, source: &str) -> Result<ScanSession, CheckoutError> {
        if !looks_like_remote(source) {
            return Err(CheckoutError::InvalidSource(source.to_string()));
        }

        tracing::info!(url = source, "cloning repository");
        let url = source.to_string();
        let depth = self.depth;
        self.materialize(source, move |dest, interrupt| {
            clone_into(&url, dest, depth, interrupt)
        })
        .await
    }
}

impl GitCheckout {
    /// Run `populate` on the blocking pool against `<temp>/repo`.
    ///
    /// The temporary directory travels with the blocking task and is only
    /// deleted once `populate` returns. Dropping the returned future raises
    /// the interrupt flag so the task stops writing.
    async fn materialize<F>(&self, source: &str, populate: F) -> Result<ScanSession, CheckoutError>
    where
        F: FnOnce(&Path, &AtomicBool) -> Result<(), CheckoutError> + Send + 'static,
    {
        let temp = self.temp_dir()?;
        let interrupt = Arc::new(AtomicBool::new(false));
        let _interrupt_on_drop = InterruptOnDrop(Arc::clone(&interrupt));

        let (temp, dest) = tokio::task::spawn_blocking(move || {
            let dest = temp.path().join("repo");
            populate(&dest, &interrupt).map(|()| (temp, dest))
        })
        .await
        .map_err(|e| CheckoutError::Task(e.to_string()))??;

        let root = dest.canonicalize()?;
        Ok(ScanSession::ephemeral(temp, root, source))
    }
}
