//! Shared test utilities for the simple-blog test suite.
//!
//! Provides fixture setup, a fixed build date, and lookup helpers that work
//! with scan-phase data structures (`Manifest`, `Post`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let manifest = scan(tmp.path(), &ScanOptions { today: today(), include_drafts: false }).unwrap();
//!
//! let post = find_post(&manifest, "hello-world");
//! assert_eq!(post.title, "Hello World");
//! ```

use chrono::NaiveDate;
use std::path::Path;
use tempfile::TempDir;

use crate::scan::{Manifest, ScanOptions, scan};
use crate::types::Post;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/blog/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/blog");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Fixed build date so defaulted dates are predictable.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
}

/// Scan the fixtures with the fixed build date and drafts excluded.
pub fn scan_fixtures(root: &Path) -> Manifest {
    let options = ScanOptions {
        today: today(),
        include_drafts: false,
    };
    scan(root, &options).unwrap()
}

// =========================================================================
// Manifest lookups: panic with a clear message on miss
// =========================================================================

/// Find a post by output id. Panics if not found.
pub fn find_post<'a>(manifest: &'a Manifest, id: &str) -> &'a Post {
    manifest
        .posts
        .iter()
        .find(|p| p.id == id)
        .unwrap_or_else(|| {
            let ids = post_ids(manifest);
            panic!("post '{id}' not found. Available: {ids:?}")
        })
}

/// All post ids in manifest order.
pub fn post_ids(manifest: &Manifest) -> Vec<&str> {
    manifest.posts.iter().map(|p| p.id.as_str()).collect()
}
