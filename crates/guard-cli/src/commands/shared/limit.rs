/// First of: the command's own option, the global `--limit`, the configured fallback.
#[must_use]
pub fn effective_limit(local: Option<u32>, global: Option<u32>, fallback: u32) -> u32 {
    local.or(global).unwrap_or(fallback)
}

/// `store.query_k` as a limit fallback.
#[must_use]
pub fn fallback_k(query_k: usize) -> u32 {
    u32::try_from(query_k).unwrap_or(u32::MAX)
}
