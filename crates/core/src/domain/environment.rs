// Job environment captured from the caller and exported into job scripts

/// Variables a job script re-exports so the job sees the submitter's search
/// paths and conda environment.
///
/// Built from an explicit variable iterator; nothing here reads the process
/// environment on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobEnvironment {
    pub ld_library_path: Option<String>,
    pub path: Option<String>,
    pub python_path: Option<String>,
    pub conda_prefix: Option<String>,
}

impl JobEnvironment {
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut env = Self::default();
        for (key, value) in vars {
            let slot = match key.as_ref() {
                "LD_LIBRARY_PATH" => &mut env.ld_library_path,
                "PATH" => &mut env.path,
                "PYTHONPATH" => &mut env.python_path,
                "CONDA_PREFIX" => &mut env.conda_prefix,
                _ => continue,
            };
            *slot = Some(value.into());
        }
        env
    }

    /// Name of the runtime environment to activate (last component of the prefix)
    pub fn conda_environment_name(&self) -> Option<&str> {
        self.conda_prefix
            .as_deref()
            .map(|prefix| prefix.trim_end_matches('/'))
            .and_then(|prefix| prefix.rsplit('/').next())
            .filter(|name| !name.is_empty())
    }
}
