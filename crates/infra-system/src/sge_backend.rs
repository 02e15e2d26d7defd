// SGE queue backend (qstat / qsub subprocesses)
// reason: tokio::process so polling never blocks the runtime
use async_trait::async_trait;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::{debug, info};

use qthrottle_core::domain::Principal;
use qthrottle_core::port::queue_backend::{
    QueryError, QueueBackend, SubmissionError, SubmitReceipt, SubmitRequest,
};

/// Executable names (or paths) of the scheduler tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SgeCommands {
    pub qstat: String,
    pub qsub: String,
}

impl Default for SgeCommands {
    fn default() -> Self {
        Self {
            qstat: "qstat".to_string(),
            qsub: "qsub".to_string(),
        }
    }
}

/// Sun Grid Engine backend
///
/// Children inherit the full environment: `qstat`/`qsub` need `SGE_ROOT`,
/// `SGE_CELL` and friends.
pub struct SgeBackend {
    commands: SgeCommands,
}

impl SgeBackend {
    /// Create a backend
    ///
    /// # Example
    /// ```ignore
    /// let backend = SgeBackend::new(SgeCommands::default());
    /// ```
    pub fn new(commands: SgeCommands) -> Self {
        Self { commands }
    }

    /// `qstat -u <principal> [-xml] [-q <queue>]`
    fn qstat_args(principal: &Principal, queue: Option<&str>, structured: bool) -> Vec<String> {
        let mut args = vec!["-u".to_string(), principal.as_str().to_string()];
        if structured {
            args.push("-xml".to_string());
        }
        if let Some(queue) = queue {
            args.push("-q".to_string());
            args.push(queue.to_string());
        }
        args
    }

    /// `qsub <extra options> [-q <queue>] -notify -N <name> <script>`
    fn qsub_args(request: &SubmitRequest) -> Vec<String> {
        let mut args: Vec<String> = request
            .extra_options
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if let Some(queue) = &request.queue {
            args.push("-q".to_string());
            args.push(queue.clone());
        }
        args.push("-notify".to_string());
        args.push("-N".to_string());
        args.push(request.job_name.clone());
        args.push(request.script_path.display().to_string());
        args
    }

    /// Spawn child process and wait for output
    async fn run(program: &str, args: &[String]) -> std::io::Result<Output> {
        debug!(program = %program, args = ?args, "Running scheduler command");
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
    }

    async fn query(&self, args: &[String]) -> Result<String, QueryError> {
        let output = Self::run(&self.commands.qstat, args)
            .await
            .map_err(|e| QueryError::SpawnFailed(format!("{}: {}", self.commands.qstat, e)))?;

        if !output.status.success() {
            return Err(QueryError::NonZeroExit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| QueryError::InvalidOutput(e.to_string()))
    }
}

/// Extract job names from `qstat -xml` output, one per `<JB_name>` element.
///
/// qstat prints each element on its own line, so a line scan is enough. An
/// empty queue still produces a `<job_info>` document.
pub fn parse_job_names(xml: &str) -> Result<Vec<String>, QueryError> {
    if !xml.trim().is_empty() && !xml.contains("<job_info") {
        return Err(QueryError::InvalidOutput(
            "structured listing has no <job_info> element".to_string(),
        ));
    }

    const OPEN: &str = "<JB_name>";
    const CLOSE: &str = "</JB_name>";

    let mut names = Vec::new();
    for line in xml.lines() {
        let Some(start) = line.find(OPEN) else {
            continue;
        };
        let rest = &line[start + OPEN.len()..];
        let end = rest.find(CLOSE).ok_or_else(|| {
            QueryError::InvalidOutput(format!("unterminated JB_name element: {}", line.trim()))
        })?;
        names.push(unescape_xml(&rest[..end]));
    }
    Ok(names)
}

/// Decode the five predefined entities and numeric character references
/// (`&#39;`, `&#x27;`). Anything unrecognised is kept as written.
fn unescape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];

        let decoded = candidate
            .find(';')
            .and_then(|semi| decode_entity(&candidate[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &candidate[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "amp" => Some('&'),
        _ => {
            let code = if let Some(hex) = name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}

#[async_trait]
impl QueueBackend for SgeBackend {
    async fn list_jobs(
        &self,
        principal: &Principal,
        queue: Option<&str>,
    ) -> Result<String, QueryError> {
        self.query(&Self::qstat_args(principal, queue, false)).await
    }

    async fn list_jobs_structured(
        &self,
        principal: &Principal,
        queue: Option<&str>,
    ) -> Result<Vec<String>, QueryError> {
        let xml = self.query(&Self::qstat_args(principal, queue, true)).await?;
        parse_job_names(&xml)
    }

    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitReceipt, SubmissionError> {
        let args = Self::qsub_args(request);
        let output = Self::run(&self.commands.qsub, &args)
            .await
            .map_err(|e| SubmissionError::SpawnFailed(format!("{}: {}", self.commands.qsub, e)))?;

        if !output.status.success() {
            return Err(SubmissionError::Rejected {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let message = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!(
            job_name = %request.job_name,
            script = %request.script_path.display(),
            acknowledgement = %message,
            "qsub accepted job"
        );
        Ok(SubmitReceipt { message })
    }
}
