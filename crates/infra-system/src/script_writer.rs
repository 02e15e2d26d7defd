// Job script files (written just before submission, removed right after)
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use qthrottle_core::domain::{JobEnvironment, JobScript};
use qthrottle_core::port::script_materializer::{
    MaterializedScript, ScriptError, ScriptMaterializer,
};
use qthrottle_core::port::IdProvider;

/// Writes rendered job scripts into a directory
pub struct FileScriptWriter {
    directory: PathBuf,
    id_provider: Arc<dyn IdProvider>,
}

impl FileScriptWriter {
    /// Create a writer
    ///
    /// # Arguments
    /// * `directory` - Where scripts are written; `~` is expanded
    /// * `id_provider` - Suffix source keeping file names unique across
    ///   controllers that share a job name
    pub fn new(directory: impl AsRef<str>, id_provider: Arc<dyn IdProvider>) -> Self {
        let directory = shellexpand::tilde(directory.as_ref()).into_owned().into();
        Self {
            directory,
            id_provider,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn script_path(&self, job_name: &str) -> Result<PathBuf, ScriptError> {
        if job_name.is_empty() || job_name.contains('/') || job_name.contains('\0') {
            return Err(ScriptError::InvalidJobName(job_name.to_string()));
        }
        let file_name = format!("submit_{}_{}.sh", job_name, self.id_provider.generate_id());
        Ok(self.directory.join(file_name))
    }
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await
}

#[cfg(not(unix))]
async fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[async_trait]
impl ScriptMaterializer for FileScriptWriter {
    async fn materialize(
        &self,
        command: &str,
        job_name: &str,
        env: &JobEnvironment,
    ) -> Result<MaterializedScript, ScriptError> {
        let path = self.script_path(job_name)?;
        let script = JobScript::render(command, env);

        tokio::fs::write(&path, script.as_str())
            .await
            .map_err(|e| ScriptError::Io(format!("{}: {}", path.display(), e)))?;
        make_executable(&path)
            .await
            .map_err(|e| ScriptError::Io(format!("{}: {}", path.display(), e)))?;

        debug!(path = %path.display(), job_name = %job_name, "Job script written");
        Ok(MaterializedScript { path })
    }

    async fn discard(&self, script: &MaterializedScript) -> Result<(), ScriptError> {
        tokio::fs::remove_file(&script.path)
            .await
            .map_err(|e| ScriptError::Io(format!("{}: {}", script.path.display(), e)))?;
        debug!(path = %script.path.display(), "Job script removed");
        Ok(())
    }
}
