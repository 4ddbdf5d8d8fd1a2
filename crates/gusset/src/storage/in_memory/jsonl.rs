//! JSONL persistence for the in-memory store.
//!
//! One serialized [`Dependency`] per line. Loading is **resilient**:
//! malformed or invalid lines are skipped and reported as structured
//! [`LoadWarning`]s rather than failing the whole load, so one corrupt
//! record cannot take the dataset hostage. Saving is **atomic**: records
//! are written to a sibling temp file which is then renamed over the
//! target, so a crash mid-write leaves the previous file intact.
//!
//! Note the store performs no cross-process locking. Two processes saving
//! concurrently will not corrupt the file (each rename is atomic) but the
//! last writer wins; serialize external writers if that matters.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

use super::inner::InMemoryStoreInner;
use crate::domain::{Dependency, DependencyFilter, DependencyId};
use crate::error::{Error, Result, StoreErrorKind};
use crate::storage::DependencyStore;

/// Warnings that can occur during JSONL file loading.
///
/// These are non-fatal data-quality problems: the load continues and the
/// offending line is skipped. Callers should surface them to users, since
/// they indicate corruption or manual editing that may need attention.
#[derive(Debug, Clone)]
pub enum LoadWarning {
    /// A line that could not be parsed as JSON.
    ///
    /// **Effect**: line skipped entirely.
    MalformedLine {
        /// 1-based line number in the file
        line_number: usize,
        /// Parser diagnostic
        error: String,
    },

    /// A parsed record that failed invariant validation (self-loop, empty
    /// field, tampered ID).
    ///
    /// **Effect**: record skipped.
    InvalidDependency {
        /// ID of the offending record
        id: DependencyId,
        /// 1-based line number in the file
        line_number: usize,
        /// Validation diagnostic
        error: String,
    },

    /// A record whose edge ID was already seen earlier in the file.
    ///
    /// **Effect**: the later record is skipped; the first occurrence wins.
    DuplicateEdge {
        /// The duplicated edge ID
        id: DependencyId,
        /// 1-based line number of the skipped record
        line_number: usize,
    },
}

/// Load a store from a JSONL file.
///
/// Returns the populated store together with any warnings collected while
/// skipping bad lines.
///
/// # Errors
///
/// Returns [`Error::Store`] (kind `read`) if the file cannot be read at
/// all; individual bad lines are warnings, not errors.
pub async fn load_from_jsonl(path: &Path) -> Result<(Box<dyn DependencyStore>, Vec<LoadWarning>)> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::Store {
            op: "load",
            kind: StoreErrorKind::Read,
            message: format!("{}: {e}", path.display()),
        })?;

    let mut inner = InMemoryStoreInner::new();
    let mut warnings = Vec::new();

    for (index, line) in contents.lines().enumerate() {
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let dep: Dependency = match serde_json::from_str(line) {
            Ok(dep) => dep,
            Err(e) => {
                warnings.push(LoadWarning::MalformedLine {
                    line_number,
                    error: e.to_string(),
                });
                continue;
            }
        };

        if let Err(e) = dep.validate() {
            warnings.push(LoadWarning::InvalidDependency {
                id: dep.id,
                line_number,
                error: e.to_string(),
            });
            continue;
        }

        if inner.deps.contains_key(&dep.id) {
            warnings.push(LoadWarning::DuplicateEdge {
                id: dep.id,
                line_number,
            });
            continue;
        }

        inner.deps.insert(dep.id.clone(), dep);
    }

    Ok((Box::new(Arc::new(Mutex::new(inner))), warnings))
}

/// Atomically save every record in the store to a JSONL file.
///
/// Records are written newest-created first to a sibling `.tmp` file,
/// which is then renamed over the target. On failure the previous file,
/// if any, is left unchanged; a stale temp file may remain and is
/// overwritten by the next successful save.
///
/// # Errors
///
/// Returns [`Error::Store`] with the failing kind tag: `marshal` when a
/// record does not serialize, `write` for filesystem failures.
pub async fn save_to_jsonl(store: &dyn DependencyStore, path: &Path) -> Result<()> {
    let deps = store.list(&DependencyFilter::default()).await?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| write_error(parent, &e))?;
        }
    }

    let tmp_path = tmp_sibling(path);
    let file = File::create(&tmp_path)
        .await
        .map_err(|e| write_error(&tmp_path, &e))?;
    let mut writer = BufWriter::new(file);

    for dep in &deps {
        let line = serde_json::to_string(dep).map_err(|e| Error::Store {
            op: "save",
            kind: StoreErrorKind::Marshal,
            message: format!("{}: {e}", dep.id),
        })?;
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| write_error(&tmp_path, &e))?;
        writer
            .write_all(b"\n")
            .await
            .map_err(|e| write_error(&tmp_path, &e))?;
    }

    writer.flush().await.map_err(|e| write_error(&tmp_path, &e))?;
    drop(writer);

    // Same-filesystem rename is atomic on POSIX; a crash before this
    // point leaves the previous file intact.
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| write_error(path, &e))?;

    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".tmp");
    PathBuf::from(os)
}

fn write_error(path: &Path, error: &std::io::Error) -> Error {
    Error::Store {
        op: "save",
        kind: StoreErrorKind::Write,
        message: format!("{}: {error}", path.display()),
    }
}
