use std::path::PathBuf;

use crate::CheckoutProvider;
use crate::error::CheckoutError;
use crate::session::ScanSession;

/// Audits a directory in place. Release deletes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCheckout;

impl CheckoutProvider for LocalCheckout {
    async fn acquire(&self, source: &str) -> Result<ScanSession, CheckoutError> {
        let path = PathBuf::from(source);
        if !path.exists() {
            return Err(CheckoutError::NotFound(path));
        }
        if !path.is_dir() {
            return Err(CheckoutError::NotADirectory(path));
        }
        let root = path.canonicalize()?;
        tracing::debug!(root = %root.display(), "using local checkout");
        Ok(ScanSession::borrowed(root, source))
    }
}
