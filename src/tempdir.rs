//! A private, owner-only scratch directory for the lifetime of one
//! invocation. Removed on every exit path -- including `--first` early
//! aborts and fatal errors -- because it is a [`tempfile::TempDir`] whose
//! `Drop` impl deletes it.

use std::path::PathBuf;

use tempfile::TempDir;

pub struct ScratchDir(TempDir);

impl ScratchDir {
    /// Creates the directory under `$TMPDIR` (default `/tmp`), restricted
    /// to the owner.
    pub fn create() -> std::io::Result<Self> {
        let parent = std::env::var_os("TMPDIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("/tmp"));
        let dir = tempfile::Builder::new().prefix("shelltest-").tempdir_in(&parent)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o700))?;
        }

        Ok(ScratchDir(dir))
    }

    pub fn path(&self) -> &std::path::Path {
        self.0.path()
    }
}
