//! Build matrix generation
//!
//! Expands the selected scripts into one build task per target platform.
//! The matrix is computed from input data at run time; an empty input yields
//! an empty matrix and the orchestrator skips every downstream stage.

use serde::{Deserialize, Serialize};

use crate::changes::SourceScript;
use crate::platform::Platform;

/// One unit of build work: a script packaged for one platform. Created by
/// the matrix generator, consumed exactly once by a task executor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildTask {
    pub script: SourceScript,
    pub platform: Platform,
}

impl BuildTask {
    /// Deterministic artifact name: `<output name>-<runner label>`.
    pub fn artifact_name(&self) -> String {
        format!("{}-{}", self.script.output_name(), self.platform.runner_label())
    }
}

/// Cartesian product of the eligible scripts and the fixed platform set,
/// ordered by script change order then platform declaration order.
pub fn build_matrix(scripts: &[SourceScript]) -> Vec<BuildTask> {
    scripts
        .iter()
        .flat_map(|script| {
            Platform::ALL
                .iter()
                .map(|platform| BuildTask { script: script.clone(), platform: *platform })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn script(path: &str) -> SourceScript {
        SourceScript { path: path.to_string() }
    }

    #[test]
    fn empty_input_yields_empty_matrix() {
        assert!(build_matrix(&[]).is_empty());
    }

    #[test]
    fn five_tasks_per_script() {
        let scripts = vec![script("src/Fankai.py"), script("src/Fankai-Sync.py")];
        let matrix = build_matrix(&scripts);
        assert_eq!(matrix.len(), 10);
    }

    #[test]
    fn tasks_are_unique_per_script_platform_pair() {
        let scripts = vec![
            script("src/Fankai.py"),
            script("src/Fankai-Sync.py"),
            script("src/Fankai-Service.py"),
        ];
        let matrix = build_matrix(&scripts);
        let pairs: HashSet<_> = matrix
            .iter()
            .map(|task| (task.script.path.clone(), task.platform))
            .collect();
        assert_eq!(pairs.len(), matrix.len());
    }

    #[test]
    fn artifact_names_follow_runner_labels() {
        let matrix = build_matrix(&[script("src/Fankai-Service.py")]);
        let names: Vec<String> = matrix.iter().map(BuildTask::artifact_name).collect();
        assert!(names.contains(&"Fankai-Service-ubicloud".to_string()));
        assert!(names.contains(&"Fankai-Service-ubicloud-standard-2-arm".to_string()));
        assert!(names.contains(&"Fankai-Service-windows-latest".to_string()));
        assert!(names.contains(&"Fankai-Service-macos-13".to_string()));
        assert!(names.contains(&"Fankai-Service-macos-latest".to_string()));
    }
}
