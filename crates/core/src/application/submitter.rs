// Job Submitter - materialize, submit, discard (one attempt per command)

use crate::domain::{JobEnvironment, SubmissionConfig};
use crate::port::{
    QueueBackend, ScriptMaterializer, Sleeper, SubmissionError, SubmissionObserver,
    SubmitReceipt, SubmitRequest,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Hands single commands to the scheduler through a transient script
pub struct JobSubmitter {
    backend: Arc<dyn QueueBackend>,
    materializer: Arc<dyn ScriptMaterializer>,
    environment: JobEnvironment,
    settle: Option<(Arc<dyn Sleeper>, Duration)>,
}

impl JobSubmitter {
    /// # Arguments
    /// * `backend` - Scheduler the script is submitted to
    /// * `materializer` - Writes and removes the wrapper script
    /// * `environment` - Caller variables exported inside every script
    pub fn new(
        backend: Arc<dyn QueueBackend>,
        materializer: Arc<dyn ScriptMaterializer>,
        environment: JobEnvironment,
    ) -> Self {
        Self {
            backend,
            materializer,
            environment,
            settle: None,
        }
    }

    /// Pause for `delay` after every submit call, before the script is removed
    pub fn with_settle_delay(mut self, sleeper: Arc<dyn Sleeper>, delay: Duration) -> Self {
        self.settle = Some((sleeper, delay));
        self
    }

    /// Submit `command` as job `job_name`.
    ///
    /// The script is removed once the submit call returns (after the settle
    /// delay, if any), whether or not the scheduler accepted it. A failed removal is reported and logged but
    /// does not fail the submission.
    pub async fn submit(
        &self,
        command: &str,
        job_name: &str,
        config: &SubmissionConfig,
        observer: &dyn SubmissionObserver,
    ) -> Result<SubmitReceipt, SubmissionError> {
        let script = self
            .materializer
            .materialize(command, job_name, &self.environment)
            .await?;

        let request = SubmitRequest {
            script_path: script.path.clone(),
            job_name: job_name.to_string(),
            extra_options: config.extra_submit_options().to_string(),
            queue: config.queue_name().map(str::to_string),
        };

        let outcome = self.backend.submit(&request).await;

        if let Some((sleeper, delay)) = &self.settle {
            sleeper.sleep(*delay).await;
        }

        if let Err(e) = self.materializer.discard(&script).await {
            warn!(
                path = %script.path.display(),
                error = %e,
                "Failed to remove job script after submission"
            );
            observer.cleanup_failed(&script.path, &e.to_string());
        }

        let receipt = outcome?;
        info!(
            job_name = %job_name,
            acknowledgement = %receipt.message.trim(),
            "Job submitted"
        );
        Ok(receipt)
    }
}
