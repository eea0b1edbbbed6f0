//! External collaborators the traceability core reads from: the active
//! project, the application's own identity, and the identity/content-hash
//! oracle backed by source control.
//!
//! Everything is passed in explicitly so node factories stay pure functions
//! of their inputs.

use crate::error::{TraceError, TraceResult};
use crate::model::Agent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

/// The project a recording belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectContext {
    /// Stable project identifier
    pub id: String,
    /// Absolute root directory of the project
    pub root_path: PathBuf,
    /// Human-readable project name
    pub name: String,
}

impl ProjectContext {
    pub fn new(id: impl Into<String>, root_path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            root_path: root_path.into(),
            name: name.into(),
        }
    }

    /// Compact URI of the project node
    pub fn uri(&self) -> String {
        format!("intocps:project.{}", self.id)
    }

    /// Project-relative form of `path` with forward slashes.
    ///
    /// Paths outside the project root are returned unchanged.
    pub fn relative_path(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root_path) {
            Ok(rel) => rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => path.to_string_lossy().replace('\\', "/"),
        }
    }

    /// Resolve a project-relative path against the root
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root_path.join(relative)
    }
}

/// Name and version of the hosting application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppIdentity {
    pub name: String,
    pub version: String,
}

impl AppIdentity {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Identity of this crate
    pub fn current() -> Self {
        Self::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }
}

/// Source of author identity and content hashes.
///
/// Calls may block (they typically shell out to git); callers on an async
/// runtime should expect that.
pub trait IdentityOracle: Send + Sync {
    /// The current author as a PROV agent
    fn user_as_agent(&self) -> TraceResult<Agent>;

    /// Content hash of the file at `path`
    fn file_hash(&self, path: &Path) -> TraceResult<String>;

    /// File content recorded under `hash`
    fn past_version(&self, hash: &str) -> TraceResult<Vec<u8>>;
}

/// Oracle backed by the `git` command line, run in the project root.
#[derive(Debug, Clone)]
pub struct GitOracle {
    root: PathBuf,
}

impl GitOracle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn git(&self, args: &[&str]) -> TraceResult<Vec<u8>> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| TraceError::Oracle(format!("cannot run git: {}", e)))?;

        if !output.status.success() {
            return Err(TraceError::Oracle(format!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(output.stdout)
    }

    fn git_string(&self, args: &[&str]) -> TraceResult<String> {
        let out = self.git(args)?;
        Ok(String::from_utf8_lossy(&out).trim().to_string())
    }
}

impl IdentityOracle for GitOracle {
    fn user_as_agent(&self) -> TraceResult<Agent> {
        let name = self.git_string(&["config", "user.name"])?;
        let email = self.git_string(&["config", "user.email"])?;
        Ok(Agent::new(name, email))
    }

    fn file_hash(&self, path: &Path) -> TraceResult<String> {
        let path = path.to_string_lossy();
        self.git_string(&["hash-object", "--", path.as_ref()])
    }

    fn past_version(&self, hash: &str) -> TraceResult<Vec<u8>> {
        self.git(&["cat-file", "-p", hash])
    }
}

/// In-memory oracle with fixed answers.
pub struct FixedOracle {
    agent: Agent,
    hashes: HashMap<PathBuf, String>,
    versions: HashMap<String, Vec<u8>>,
}

impl FixedOracle {
    pub fn new(agent: Agent) -> Self {
        Self {
            agent,
            hashes: HashMap::new(),
            versions: HashMap::new(),
        }
    }

    /// Register the hash reported for `path`
    pub fn with_hash(mut self, path: impl Into<PathBuf>, hash: impl Into<String>) -> Self {
        self.hashes.insert(path.into(), hash.into());
        self
    }

    /// Register the content stored under `hash`
    pub fn with_version(mut self, hash: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.versions.insert(hash.into(), content.into());
        self
    }
}

impl IdentityOracle for FixedOracle {
    fn user_as_agent(&self) -> TraceResult<Agent> {
        Ok(self.agent.clone())
    }

    fn file_hash(&self, path: &Path) -> TraceResult<String> {
        self.hashes
            .get(path)
            .cloned()
            .ok_or_else(|| TraceError::Oracle(format!("no hash for {}", path.display())))
    }

    fn past_version(&self, hash: &str) -> TraceResult<Vec<u8>> {
        self.versions
            .get(hash)
            .cloned()
            .ok_or_else(|| TraceError::Oracle(format!("unknown version {}", hash)))
    }
}
