//! Dry-run wrapper around a [`Runtime`].
//!
//! Reads go straight to the wrapped runtime. Writes are printed to stdout
//! and dropped, so a dry run computes and reports exactly what a real run
//! would write without touching the disk.

use anyhow::Result;
use log::info;
use std::path::Path;

use super::Runtime;

pub struct DryRun<R: Runtime> {
    inner: R,
}

impl<R: Runtime> DryRun<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Runtime> Runtime for DryRun<R> {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.inner.read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        info!("[dry-run] skipped writing {} bytes to {:?}", contents.len(), path);
        println!("[dry-run] Would write {}:", path.display());
        println!("{}", String::from_utf8_lossy(contents));
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::eq;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_dry_run_never_writes() {
        let mut inner = MockRuntime::new();
        inner.expect_write().never();

        let runtime = DryRun::new(inner);
        runtime
            .write(Path::new("package.json"), b"{\"a\": 1}")
            .unwrap();
    }

    #[test]
    fn test_dry_run_delegates_reads() {
        let mut inner = MockRuntime::new();
        inner
            .expect_read_to_string()
            .with(eq(PathBuf::from("package.json")))
            .returning(|_| Ok("{}".into()));
        inner
            .expect_exists()
            .with(eq(PathBuf::from("package.json")))
            .returning(|_| true);

        let runtime = DryRun::new(inner);
        assert!(runtime.exists(Path::new("package.json")));
        assert_eq!(
            runtime.read_to_string(Path::new("package.json")).unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_dry_run_leaves_real_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("package.json");
        std::fs::write(&path, "{}").unwrap();

        let runtime = DryRun::new(RealRuntime);
        runtime.write(&path, b"{\"changed\": true}").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
