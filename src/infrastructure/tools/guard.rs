//! # Path Guard
//!
//! Confines filesystem access to a fixed set of allowed root directories.
//! Paths are resolved (symlinks followed, `..` collapsed) before the containment check,
//! so traversal segments and links cannot be used to step outside a root.

use std::io;
use std::path::{Component, Path, PathBuf};

use crate::domain::error::ToolError;

#[derive(Debug, Clone)]
pub struct PathGuard {
    roots: Vec<PathBuf>,
}

impl PathGuard {
    /// Builds a guard over `roots`. Each root is resolved once here so that
    /// a root given through a symlink still matches resolved request paths.
    pub fn new<I, P>(roots: I) -> io::Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let roots = roots
            .into_iter()
            .map(|root| resolve(root.as_ref()))
            .collect::<io::Result<Vec<_>>>()?;
        Ok(Self { roots })
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn is_allowed(&self, path: impl AsRef<Path>) -> bool {
        match resolve(path.as_ref()) {
            Ok(resolved) => self.contains(&resolved),
            Err(_) => false,
        }
    }

    /// Resolves `path` and returns its canonical form if it lies inside a root.
    pub fn check(&self, path: impl AsRef<Path>) -> Result<PathBuf, ToolError> {
        let path = path.as_ref();
        let resolved =
            resolve(path).map_err(|_| ToolError::PathNotAllowed(path.to_path_buf()))?;
        if self.contains(&resolved) {
            Ok(resolved)
        } else {
            tracing::warn!(
                "Path guard rejected {} (resolved to {})",
                path.display(),
                resolved.display()
            );
            Err(ToolError::PathNotAllowed(path.to_path_buf()))
        }
    }

    // Path::starts_with compares whole components, so `/a/foo` never matches `/a/foobar`.
    fn contains(&self, resolved: &Path) -> bool {
        self.roots.iter().any(|root| resolved.starts_with(root))
    }
}

/// Symlinks followed while resolving one path before giving up.
const MAX_LINK_HOPS: usize = 40;

/// Resolves `path` to an absolute form with every existing prefix canonicalized.
///
/// Components that do not exist yet are appended lexically, so a file that is about to be
/// created still gets a meaningful answer. Dangling symlinks are followed to their target;
/// link cycles are an error.
pub fn resolve(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut hops = 0;
    resolve_from(PathBuf::new(), &absolute, &mut hops)
}

fn resolve_from(mut resolved: PathBuf, rest: &Path, hops: &mut usize) -> io::Result<PathBuf> {
    for component in rest.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                let candidate = resolved.join(name);
                if let Ok(canonical) = std::fs::canonicalize(&candidate) {
                    resolved = canonical;
                    continue;
                }

                let is_link = std::fs::symlink_metadata(&candidate)
                    .map(|meta| meta.file_type().is_symlink())
                    .unwrap_or(false);
                if !is_link {
                    resolved = candidate;
                    continue;
                }

                // Dangling (or looping) link: follow it by hand.
                *hops += 1;
                if *hops > MAX_LINK_HOPS {
                    return Err(io::Error::other(format!(
                        "too many levels of symbolic links at {}",
                        candidate.display()
                    )));
                }
                let target = std::fs::read_link(&candidate)?;
                let base = if target.is_absolute() {
                    PathBuf::new()
                } else {
                    resolved
                };
                resolved = resolve_from(base, &target, hops)?;
            }
        }
    }

    Ok(resolved)
}
