// Copyright (c) The gotest-action Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolution of package import paths to repository-relative source paths.
//!
//! Annotations carry a bare filename (`utils_test.go`); to point a CI host at
//! the actual file we ask `go list` for the package's source directory, join
//! the filename onto it, and strip the workspace root so the result is
//! relative to the repository checkout.

use crate::errors::PackageResolveError;
use camino::Utf8PathBuf;
use std::collections::HashMap;
use tokio::process::Command;
use tracing::debug;

/// Maps a (package, bare filename) pair to a repository-relative source path.
///
/// A trait so the reporter can be driven without a Go toolchain in tests.
/// Implementations take `&mut self` to allow caching across calls within one
/// report pass.
pub trait SourcePathResolver {
    /// Resolves `file` within `package`'s source directory.
    ///
    /// Errors are per-call: a failed lookup affects only the annotation that
    /// requested it.
    fn source_path(
        &mut self,
        package: &str,
        file: &str,
    ) -> impl Future<Output = Result<Utf8PathBuf, PackageResolveError>>;
}

/// Resolves package directories by invoking `go list -f {{.Dir}}`.
///
/// Successful lookups are cached per package, so a package with many
/// annotations spawns a single `go list`. Calls are sequential by
/// construction; this only runs over already-failed tests, so report latency
/// is an acceptable trade for not managing a process pool.
#[derive(Debug, Default)]
pub struct GoListResolver {
    workspace_root: Option<Utf8PathBuf>,
    cache: HashMap<String, Utf8PathBuf>,
}

impl GoListResolver {
    /// Creates a resolver. `workspace_root` (typically `$GITHUB_WORKSPACE`)
    /// is stripped from resolved paths when present.
    pub fn new(workspace_root: Option<Utf8PathBuf>) -> Self {
        Self {
            workspace_root,
            cache: HashMap::new(),
        }
    }

    async fn package_dir(&mut self, package: &str) -> Result<Utf8PathBuf, PackageResolveError> {
        if let Some(dir) = self.cache.get(package) {
            return Ok(dir.clone());
        }

        let output = Command::new("go")
            .args(["list", "-f", "{{.Dir}}", package])
            .output()
            .await
            .map_err(|error| PackageResolveError::Exec {
                package: package.to_owned(),
                error,
            })?;

        if !output.status.success() {
            return Err(PackageResolveError::Failed {
                package: package.to_owned(),
                status: output.status,
            });
        }

        let dir = String::from_utf8_lossy(&output.stdout).trim().to_owned();
        if dir.is_empty() {
            return Err(PackageResolveError::EmptyResult {
                package: package.to_owned(),
            });
        }

        debug!("resolved package {package} to {dir}");
        let dir = Utf8PathBuf::from(dir);
        self.cache.insert(package.to_owned(), dir.clone());
        Ok(dir)
    }

    fn relativize(&self, path: Utf8PathBuf) -> Utf8PathBuf {
        match &self.workspace_root {
            Some(root) => match path.strip_prefix(root) {
                Ok(relative) => relative.to_owned(),
                Err(_) => path,
            },
            None => path,
        }
    }
}

impl SourcePathResolver for GoListResolver {
    async fn source_path(
        &mut self,
        package: &str,
        file: &str,
    ) -> Result<Utf8PathBuf, PackageResolveError> {
        let dir = self.package_dir(package).await?;
        Ok(self.relativize(dir.join(file)))
    }
}

/// A fixed package-to-directory mapping, for tests and dry runs.
#[derive(Debug, Default)]
pub struct StaticResolver {
    dirs: HashMap<String, Utf8PathBuf>,
}

impl StaticResolver {
    /// Creates an empty resolver; every lookup fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `package` to `dir`.
    pub fn insert(&mut self, package: impl Into<String>, dir: impl Into<Utf8PathBuf>) {
        self.dirs.insert(package.into(), dir.into());
    }
}

impl SourcePathResolver for StaticResolver {
    async fn source_path(
        &mut self,
        package: &str,
        file: &str,
    ) -> Result<Utf8PathBuf, PackageResolveError> {
        match self.dirs.get(package) {
            Some(dir) => Ok(dir.join(file)),
            None => Err(PackageResolveError::EmptyResult {
                package: package.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_root_prefix_is_stripped() {
        let resolver = GoListResolver::new(Some(Utf8PathBuf::from("/home/runner/work/repo")));
        assert_eq!(
            resolver.relativize(Utf8PathBuf::from("/home/runner/work/repo/pkg/utils_test.go")),
            Utf8PathBuf::from("pkg/utils_test.go")
        );
    }

    #[test]
    fn paths_outside_the_workspace_are_kept() {
        let resolver = GoListResolver::new(Some(Utf8PathBuf::from("/home/runner/work/repo")));
        assert_eq!(
            resolver.relativize(Utf8PathBuf::from("/go/pkg/mod/dep/file.go")),
            Utf8PathBuf::from("/go/pkg/mod/dep/file.go")
        );
    }

    #[test]
    fn no_workspace_root_keeps_absolute_paths() {
        let resolver = GoListResolver::new(None);
        assert_eq!(
            resolver.relativize(Utf8PathBuf::from("/src/pkg/file.go")),
            Utf8PathBuf::from("/src/pkg/file.go")
        );
    }

    #[tokio::test]
    async fn static_resolver_joins_and_fails_per_call() {
        let mut resolver = StaticResolver::new();
        resolver.insert("example.com/pkg", "pkg");

        let path = resolver
            .source_path("example.com/pkg", "utils_test.go")
            .await
            .expect("mapped package resolves");
        assert_eq!(path, Utf8PathBuf::from("pkg/utils_test.go"));

        resolver
            .source_path("example.com/other", "x.go")
            .await
            .expect_err("unmapped package fails");
    }
}
