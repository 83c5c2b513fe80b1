// Remote folder creation. The service is the only authority on which
// folders exist, so every call re-creates the whole chain; creation is
// idempotent on the remote side.

use crate::api::DiskApi;
use crate::error::Result;
use crate::normalize::normalize;
use crate::retry::RetryPolicy;

/// Create every folder on the way to `remote_path`, root first.
///
/// Each segment is normalized, so `/A/B` creates `/a` and then `/a/b`. A
/// segment that keeps failing past the retry budget stops the chain and its
/// error is returned; deeper folders are not attempted.
pub fn ensure_exists<A: DiskApi + ?Sized>(
    api: &A,
    retry: &RetryPolicy,
    remote_path: &str,
) -> Result<()> {
    let mut current = String::new();
    for segment in remote_path.split('/').map(normalize) {
        if segment.is_empty() {
            continue;
        }
        current.push('/');
        current.push_str(&segment);
        retry.run(&format!("create folder {current}"), |_| {
            api.create_folder(&current)
        })?;
        log::debug!("remote folder ready: {current}");
    }
    Ok(())
}
