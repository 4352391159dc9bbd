//! Test paths - hierarchical addresses of nodes in a test tree
//!
//! Path syntax:
//! - `""` resolves to the search root itself
//! - `"/Root/Suite/Case"` is absolute: the first name must be the root's name
//! - `"Suite/Case"` is relative: the first name is searched depth-first in the
//!   tree (root included), the remaining names walk down from there
//!
//! Matching is case-sensitive. When siblings share a name the first one in
//! execution order wins.

use crate::test::Test;
use std::fmt;
use thiserror::Error;

/// Path separator between test names
pub const SEPARATOR: char = '/';

/// Test path resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("failed to resolve test name <{name}> of path <{path}>")]
    NotFound { name: String, path: String },

    #[error("test path <{path}> does not name any test")]
    EmptyPath { path: String },

    #[error("path root <{expected}> does not match search root <{actual}>")]
    RootMismatch { expected: String, actual: String },

    #[error("test path index {index} is out of range (path has {len} tests)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Result type for path operations
pub type PathResult<T> = Result<T, PathError>;

/// Ordered list of tests from a root down to a target test
#[derive(Default, Clone)]
pub struct TestPath<'t> {
    tests: Vec<&'t dyn Test>,
}

impl<'t> TestPath<'t> {
    /// Create an empty (invalid) path
    pub fn new() -> Self {
        Self { tests: Vec::new() }
    }

    /// Create a path containing only `test`
    pub fn from_test(test: &'t dyn Test) -> Self {
        Self { tests: vec![test] }
    }

    /// Resolve `path` against `root`
    pub fn resolve(root: &'t dyn Test, path: &str) -> PathResult<Self> {
        let (is_relative, names) = split_path(path);

        if is_relative && path.is_empty() {
            return Ok(Self::from_test(root));
        }

        let (first, rest) = match names.split_first() {
            Some(split) => split,
            None => {
                return Err(PathError::EmptyPath {
                    path: path.to_string(),
                })
            }
        };

        let start = if is_relative {
            root.find_test(first).map_err(|_| PathError::NotFound {
                name: first.to_string(),
                path: path.to_string(),
            })?
        } else {
            root
        };

        if start.name() != *first {
            return Err(PathError::RootMismatch {
                expected: first.to_string(),
                actual: start.name().to_string(),
            });
        }

        let mut resolved = Self::from_test(start);
        let mut parent = start;
        for name in rest {
            let child = parent
                .children()
                .find(|child| child.name() == *name)
                .ok_or_else(|| PathError::NotFound {
                    name: name.to_string(),
                    path: path.to_string(),
                })?;
            resolved.add(child);
            parent = child;
        }

        Ok(resolved)
    }

    /// Append a test at the end of the path
    pub fn add(&mut self, test: &'t dyn Test) {
        self.tests.push(test);
    }

    /// Append every test of `other`
    pub fn add_path(&mut self, other: &TestPath<'t>) {
        self.tests.extend(other.tests.iter().copied());
    }

    /// Insert a test at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert(&mut self, index: usize, test: &'t dyn Test) {
        self.tests.insert(index, test);
    }

    /// Remove the test at `index`
    pub fn remove_test(&mut self, index: usize) -> PathResult<&'t dyn Test> {
        if index >= self.tests.len() {
            return Err(PathError::IndexOutOfRange {
                index,
                len: self.tests.len(),
            });
        }
        Ok(self.tests.remove(index))
    }

    pub fn remove_tests(&mut self) {
        self.tests.clear();
    }

    /// Test at `index`, from the root
    pub fn test_at(&self, index: usize) -> PathResult<&'t dyn Test> {
        self.tests
            .get(index)
            .copied()
            .ok_or(PathError::IndexOutOfRange {
                index,
                len: self.tests.len(),
            })
    }

    /// Last test of the path (the one a runner should run)
    pub fn child_test(&self) -> Option<&'t dyn Test> {
        self.tests.last().copied()
    }

    /// A path is valid when it names at least one test
    pub fn is_valid(&self) -> bool {
        !self.tests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

impl fmt::Display for TestPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for test in &self.tests {
            write!(f, "{}{}", SEPARATOR, test.name())?;
        }
        Ok(())
    }
}

impl fmt::Debug for TestPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TestPath").field(&self.to_string()).finish()
    }
}

/// Split a path string into its names
///
/// Returns whether the path is relative along with the non-empty names.
fn split_path(path: &str) -> (bool, Vec<&str>) {
    let is_relative = !path.starts_with(SEPARATOR);
    let names = path
        .split(SEPARATOR)
        .filter(|name| !name.is_empty())
        .collect();
    (is_relative, names)
}
