// Share pipeline: validate the local file, upload it unless the key is
// taken, then publish a landing page that links to it.

use crate::error::{Result, ShareError};
use crate::page;
use crate::store::{ObjectStore, ProgressSink, RemoteObject};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// A validated local file and the object key it will be stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadTarget {
    pub path: PathBuf,
    pub key: String,
}

/// The two objects a successful run leaves in the bucket.
#[derive(Debug, Clone)]
pub struct Shared {
    pub file: RemoteObject,
    pub page: RemoteObject,
}

/// Check that `path` is an existing regular file and derive its key (the
/// base file name).
pub fn validate_input(path: &Path) -> Result<UploadTarget> {
    if !path.is_file() {
        return Err(ShareError::FileNotFound(path.to_path_buf()));
    }
    let key = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ShareError::FileNotFound(path.to_path_buf()))?;
    Ok(UploadTarget { path: path.to_path_buf(), key })
}

/// Content type for the uploaded file, guessed from its name.
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path).first_or_octet_stream().to_string()
}

/// Upload `target` and its landing page to `store`.
///
/// When `overwrite` is false an existing object under the same key aborts
/// the run before anything is written. A failed page upload leaves the file
/// object in place.
pub fn share(
    store: &dyn ObjectStore,
    target: &UploadTarget,
    overwrite: bool,
    progress: Arc<dyn ProgressSink>,
) -> Result<Shared> {
    if !overwrite && store.exists(&target.key)? {
        return Err(ShareError::ObjectAlreadyExists(target.key.clone()));
    }

    let content_type = content_type_for(&target.path);
    let file = store.put_file(&target.key, &target.path, &content_type, progress)?;

    let html = page::render(&file.key, file.size, &file.url);
    let page_key = page::random_key();
    let page = store.put_bytes(&page_key, html.into_bytes(), page::PAGE_CONTENT_TYPE)?;
    info!(file = %file.key, page = %page.key, "shared");

    Ok(Shared { file, page })
}
