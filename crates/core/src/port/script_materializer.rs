// Script Materializer Port
// Turns a command into a transient executable script the scheduler can run

use crate::domain::JobEnvironment;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Script materialization errors
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Invalid job name '{0}': not usable in a script file name")]
    InvalidJobName(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// A script written for exactly one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedScript {
    pub path: PathBuf,
}

/// Script Materializer trait
///
/// Implementations:
/// - FileScriptWriter: writes the rendered script to a directory (infra-system)
/// - mocks::MockScriptMaterializer: records calls, touches nothing
#[async_trait]
pub trait ScriptMaterializer: Send + Sync {
    /// Produce an executable script running `command` as job `job_name`
    async fn materialize(
        &self,
        command: &str,
        job_name: &str,
        env: &JobEnvironment,
    ) -> Result<MaterializedScript, ScriptError>;

    /// Remove a script once the submit call has returned
    async fn discard(&self, script: &MaterializedScript) -> Result<(), ScriptError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Calls {
        materialized: Vec<(String, String)>,
        discarded: Vec<PathBuf>,
    }

    /// Records materialize/discard calls; optionally fails either step
    #[derive(Clone, Default)]
    pub struct MockScriptMaterializer {
        calls: Arc<Mutex<Calls>>,
        fail_materialize: bool,
        fail_discard: bool,
    }

    impl MockScriptMaterializer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_materialize() -> Self {
            Self {
                fail_materialize: true,
                ..Self::default()
            }
        }

        pub fn failing_discard() -> Self {
            Self {
                fail_discard: true,
                ..Self::default()
            }
        }

        /// (command, job_name) pairs in call order
        pub fn materialized(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().materialized.clone()
        }

        pub fn discarded(&self) -> Vec<PathBuf> {
            self.calls.lock().unwrap().discarded.clone()
        }
    }

    #[async_trait]
    impl ScriptMaterializer for MockScriptMaterializer {
        async fn materialize(
            &self,
            command: &str,
            job_name: &str,
            _env: &JobEnvironment,
        ) -> Result<MaterializedScript, ScriptError> {
            if self.fail_materialize {
                return Err(ScriptError::Io("disk full".to_string()));
            }
            let mut calls = self.calls.lock().unwrap();
            calls
                .materialized
                .push((command.to_string(), job_name.to_string()));
            Ok(MaterializedScript {
                path: PathBuf::from(format!(
                    "./submit_{}_{}.sh",
                    job_name,
                    calls.materialized.len()
                )),
            })
        }

        async fn discard(&self, script: &MaterializedScript) -> Result<(), ScriptError> {
            self.calls
                .lock()
                .unwrap()
                .discarded
                .push(script.path.clone());
            if self.fail_discard {
                return Err(ScriptError::Io("permission denied".to_string()));
            }
            Ok(())
        }
    }
}
