/// Load-or-build helper over a [`ProfileStore`](crate::db::ProfileStore).
///
/// Returns the stored value for `$key` when there is one. Otherwise awaits `$block`
/// (a future yielding `AppResult<T>`), saves the result and returns it. A failed build is
/// propagated and nothing is saved; a failed save is only logged.
///
/// Must be used inside a function returning `AppResult<_>`.
///
/// # Example
/// ```rust,ignore
/// let snapshot = cached!(store, key, async {
///     build_snapshot().await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($store:expr, $key:expr, $block:expr) => {{
        if let Some(stored) = $store.load(&$key).await? {
            tracing::debug!(key = %$key, "Profile snapshot served from store");
            Ok(stored)
        } else {
            let value = $block.await?;
            if let Err(e) = $store.save(&$key, &value).await {
                tracing::warn!(error = %e, key = %$key, "Failed to save profile snapshot");
            }
            Ok(value)
        }
    }};
}
