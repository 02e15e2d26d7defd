// Job script rendering (pure text, written to disk by infrastructure)

use super::environment::JobEnvironment;
use std::fmt::Write as _;

const SEPARATOR: &str = "echo -------------------------------------";

/// Wrapper script that runs one command under the scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobScript {
    contents: String,
}

impl JobScript {
    /// Render the wrapper for `command`.
    ///
    /// Layout: shebang, exported environment, optional runtime environment
    /// activation, a diagnostic preamble whose `$USER`/`$JOB_ID`/`$JOB_NAME`/
    /// `$HOSTNAME` are substituted by the scheduler at run time, a core dump
    /// limit, then the command verbatim.
    pub fn render(command: &str, env: &JobEnvironment) -> Self {
        let mut contents = String::from("#!/bin/bash\n\n");

        let exports = [
            ("LD_LIBRARY_PATH", &env.ld_library_path),
            ("PATH", &env.path),
            ("PYTHONPATH", &env.python_path),
        ];
        for (key, value) in exports {
            if let Some(value) = value {
                // writing into a String cannot fail
                let _ = writeln!(contents, "export {}={}", key, value);
            }
        }

        if let Some(name) = env.conda_environment_name() {
            let _ = writeln!(contents, "source activate {}", name);
        }

        contents.push_str(SEPARATOR);
        contents.push('\n');
        contents.push_str("echo \"USER    : $USER\"\n");
        contents.push_str("echo \"JOB_ID  : $JOB_ID\"\n");
        contents.push_str("echo \"JOB_NAME: $JOB_NAME\"\n");
        contents.push_str("echo \"HOSTNAME: $HOSTNAME\"\n");
        contents.push_str(SEPARATOR);
        contents.push('\n');
        contents.push_str("ulimit -c 1\n");

        contents.push_str(command);
        if !command.ends_with('\n') {
            contents.push('\n');
        }

        Self { contents }
    }

    pub fn as_str(&self) -> &str {
        &self.contents
    }

    pub fn into_string(self) -> String {
        self.contents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_env() -> JobEnvironment {
        JobEnvironment {
            ld_library_path: Some("/opt/lib".to_string()),
            path: Some("/usr/bin:/bin".to_string()),
            python_path: Some("/opt/py".to_string()),
            conda_prefix: Some("/opt/conda/envs/analysis".to_string()),
        }
    }

    #[test]
    fn test_render_full_environment() {
        let script = JobScript::render("python run.py --seed 3", &full_env());
        let text = script.as_str();

        assert!(text.starts_with("#!/bin/bash\n"));
        assert!(text.contains("export LD_LIBRARY_PATH=/opt/lib\n"));
        assert!(text.contains("export PATH=/usr/bin:/bin\n"));
        assert!(text.contains("export PYTHONPATH=/opt/py\n"));
        assert!(text.contains("source activate analysis\n"));
        assert!(text.contains("echo \"JOB_ID  : $JOB_ID\"\n"));
        assert!(text.contains("ulimit -c 1\n"));
        assert!(text.ends_with("python run.py --seed 3\n"));
    }

    #[test]
    fn test_render_skips_missing_variables() {
        let script = JobScript::render("true", &JobEnvironment::default());
        let text = script.as_str();

        assert!(!text.contains("export"));
        assert!(!text.contains("source activate"));
    }

    #[test]
    fn test_exports_come_before_preamble_and_command_is_last() {
        let text = JobScript::render("echo done", &full_env()).into_string();

        let export_at = text.find("export PATH").unwrap();
        let preamble_at = text.find("echo \"USER").unwrap();
        let ulimit_at = text.find("ulimit -c 1").unwrap();
        let command_at = text.find("echo done").unwrap();

        assert!(export_at < preamble_at);
        assert!(preamble_at < ulimit_at);
        assert!(ulimit_at < command_at);
    }

    #[test]
    fn test_multiline_command_kept_verbatim() {
        let command = "cd /data\n./process --all\n";
        let text = JobScript::render(command, &JobEnvironment::default()).into_string();
        assert!(text.ends_with(command));
    }
}
