// Single-file upload: request an upload link, send the bytes, publish the
// resource and read back its public link.

use crate::api::DiskApi;
use crate::error::Result;
use crate::retry::RetryPolicy;
use std::path::Path;

/// Upload `local_file` to `remote_path` and return its public link.
///
/// The four steps form one attempt. A failure at any step starts the next
/// attempt from the beginning, and the overwrite flag on the upload link
/// makes that safe when the bytes already landed.
pub fn upload<A: DiskApi + ?Sized>(
    api: &A,
    retry: &RetryPolicy,
    local_file: &Path,
    remote_path: &str,
) -> Result<String> {
    retry.run(&format!("upload {remote_path}"), |attempt| {
        log::debug!("upload {} -> {remote_path} (attempt {attempt})", local_file.display());
        let target = api.upload_target(remote_path)?;
        api.transfer(&target, local_file)?;
        api.publish(remote_path)?;
        api.public_url(remote_path)
    })
}
