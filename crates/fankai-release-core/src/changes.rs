//! Changed-file selection
//!
//! The triggering revision's diff is reduced to the set of build-eligible
//! entry-point scripts. An empty selection is a valid terminal state for the
//! whole pipeline, never an error.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Ordered file paths added or modified in the triggering revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet(pub Vec<String>);

impl ChangeSet {
    pub fn new(paths: Vec<String>) -> Self {
        Self(paths)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn paths(&self) -> &[String] {
        &self.0
    }
}

/// A build-eligible entry-point script.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceScript {
    /// Repo-relative path, e.g. `src/Fankai-Sync.py`.
    pub path: String,
}

impl SourceScript {
    /// Name of the produced executable: the file stem of the entry script.
    pub fn output_name(&self) -> &str {
        let name = self.path.rsplit('/').next().unwrap_or(&self.path);
        name.strip_suffix(".py").unwrap_or(name)
    }
}

/// Keep the paths matching the eligible-source predicate: under `src/` with
/// the scripting-language suffix. Order is preserved.
pub fn select_scripts(changes: &ChangeSet) -> Vec<SourceScript> {
    changes
        .paths()
        .iter()
        .filter(|path| is_eligible(path))
        .map(|path| SourceScript { path: path.clone() })
        .collect()
}

fn is_eligible(path: &str) -> bool {
    path.starts_with("src/")
        && Path::new(path).extension().and_then(|ext| ext.to_str()) == Some("py")
}
