//! Admission Controller - throttled submission and batch drain
//!
//! A job is submitted only while the queue lists fewer outstanding jobs for
//! the principal than the configured ceiling; otherwise the controller waits
//! one poll interval and reads the queue again. There is no backoff and no
//! retry limit: admission blocks until room appears, a query fails, or the
//! optional shutdown token fires.
//!
//! The ceiling is advisory. Controllers sharing a principal do not
//! coordinate, so several of them racing near the threshold can briefly push
//! the queue past any one ceiling.

mod state;


pub use state::AdmissionState;

use crate::application::inspector::QueueInspector;
use crate::application::shutdown::ShutdownToken;
use crate::application::submitter::JobSubmitter;
use crate::domain::{Principal, SubmissionConfig};
use crate::error::{AppError, Result};
use crate::port::time_provider::SystemTimeProvider;
use crate::port::{NoopObserver, Sleeper, SubmissionObserver, TimeProvider};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Serialized, ceiling-bounded submitter for one principal
pub struct AdmissionController {
    config: SubmissionConfig,
    principal: Principal,
    inspector: QueueInspector,
    submitter: JobSubmitter,
    sleeper: Arc<dyn Sleeper>,
    observer: Arc<dyn SubmissionObserver>,
    time_provider: Arc<dyn TimeProvider>,
    shutdown: Option<ShutdownToken>,
    state: Mutex<AdmissionState>,
}

impl AdmissionController {
    /// Create a controller
    ///
    /// # Arguments
    /// * `config` - Ceiling, poll interval, queue and verbosity (fixed from here on)
    /// * `principal` - User whose queue entries are counted
    /// * `inspector` - Source of outstanding-job counts
    /// * `submitter` - Hands admitted commands to the scheduler
    /// * `sleeper` - Waits between polls
    pub fn new(
        config: SubmissionConfig,
        principal: Principal,
        inspector: QueueInspector,
        submitter: JobSubmitter,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        if config.max_outstanding_jobs() == 0 {
            warn!("Maximum outstanding jobs is 0: no job will ever be admitted");
        }

        Self {
            config,
            principal,
            inspector,
            submitter,
            sleeper,
            observer: Arc::new(NoopObserver),
            time_provider: Arc::new(SystemTimeProvider),
            shutdown: None,
            state: Mutex::new(AdmissionState::Idle),
        }
    }

    /// Report progress to `observer` (only when the config is verbose)
    pub fn with_observer(mut self, observer: Arc<dyn SubmissionObserver>) -> Self {
        self.inspector = self
            .inspector
            .with_observer(Arc::clone(&observer), self.config.verbose());
        self.observer = observer;
        self
    }

    /// Make the controller cancellable; once the token fires, the current
    /// wait ends and no further poll or submission is made. The call returns
    /// [`AppError::Cancelled`].
    pub fn with_shutdown(mut self, token: ShutdownToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    pub fn with_time_provider(mut self, time_provider: Arc<dyn TimeProvider>) -> Self {
        self.time_provider = time_provider;
        self
    }

    pub fn config(&self) -> &SubmissionConfig {
        &self.config
    }

    pub fn state(&self) -> AdmissionState {
        *self.lock_state()
    }

    /// Submit one command as soon as the queue has room.
    ///
    /// Returns once the job has been handed to the scheduler. With a ceiling
    /// of 0 this never returns unless a query fails or shutdown fires.
    pub async fn submit_one_when_ready(&self, command: &str, job_name: &str) -> Result<()> {
        self.reset();
        self.admit(command, job_name).await?;
        self.transition(AdmissionState::Done)
    }

    /// Submit `commands` in order under one shared `job_name`, then
    /// optionally block until no queue entry matches `job_name`.
    ///
    /// Submission is strictly sequential. The first failure stops the batch;
    /// commands after it are not submitted.
    pub async fn submit_batch<S: AsRef<str>>(
        &self,
        commands: &[S],
        job_name: &str,
        wait_for_completion: bool,
    ) -> Result<()> {
        self.reset();
        info!(
            job_name = %job_name,
            commands = commands.len(),
            wait_for_completion,
            "Submitting batch"
        );

        for command in commands {
            self.admit(command.as_ref(), job_name).await?;
        }

        if wait_for_completion {
            self.drain(job_name).await?;
        }
        self.transition(AdmissionState::Done)
    }

    /// Block until no queue entry matches `job_name`
    pub async fn wait_for_drain(&self, job_name: &str) -> Result<()> {
        self.reset();
        self.drain(job_name).await?;
        self.transition(AdmissionState::Done)
    }

    async fn admit(&self, command: &str, job_name: &str) -> Result<()> {
        let ceiling = self.config.max_outstanding_jobs();
        let started_at = self.time_provider.now_millis();
        let mut polls = 0usize;

        self.transition(AdmissionState::Polling)?;
        loop {
            self.ensure_running("waiting for admission")?;
            let outstanding = self.inspector.count_total(&self.principal).await?;
            polls += 1;

            if self.config.verbose() {
                self.observer.queue_load(outstanding, ceiling);
            }

            if outstanding < ceiling as usize {
                self.transition(AdmissionState::Submitting)?;
                let receipt = self
                    .submitter
                    .submit(command, job_name, &self.config, self.observer.as_ref())
                    .await?;

                if self.config.verbose() {
                    self.observer.submitted(job_name, &receipt.message);
                }
                info!(
                    job_name = %job_name,
                    polls,
                    waited_ms = self.time_provider.now_millis() - started_at,
                    "Job admitted"
                );
                return Ok(());
            }

            debug!(
                outstanding,
                ceiling,
                interval_secs = self.config.poll_interval().as_secs_f64(),
                "Queue at ceiling, waiting"
            );
            self.pause("waiting for admission").await?;
        }
    }

    async fn drain(&self, job_name: &str) -> Result<()> {
        self.transition(AdmissionState::Draining)?;
        loop {
            self.ensure_running("draining")?;
            let matching = self
                .inspector
                .count_by_name_fragment(&self.principal, job_name)
                .await?;

            if matching == 0 {
                info!(job_name = %job_name, "Batch drained from queue");
                return Ok(());
            }

            debug!(job_name = %job_name, matching, "Batch still in queue, waiting");
            self.pause("draining").await?;
        }
    }

    /// Checked before every poll: a fired token stops the batch even when
    /// the queue has room
    fn ensure_running(&self, activity: &str) -> Result<()> {
        match &self.shutdown {
            Some(token) if token.is_shutdown() => {
                info!(state = %self.state(), "Shutdown requested, stopping before next poll");
                Err(AppError::Cancelled(activity.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Wait one poll interval, cut short by shutdown
    async fn pause(&self, activity: &str) -> Result<()> {
        let interval = self.config.poll_interval();

        let Some(token) = &self.shutdown else {
            self.sleeper.sleep(interval).await;
            return Ok(());
        };

        let mut token = token.clone();
        if !token.is_shutdown() {
            tokio::select! {
                _ = self.sleeper.sleep(interval) => {}
                _ = token.wait() => {}
            }
        }

        if token.is_shutdown() {
            info!(state = %self.state(), "Shutdown requested, abandoning wait");
            return Err(AppError::Cancelled(activity.to_string()));
        }
        Ok(())
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, AdmissionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reset(&self) {
        *self.lock_state() = AdmissionState::Idle;
    }

    fn transition(&self, next: AdmissionState) -> Result<()> {
        let mut state = self.lock_state();
        let from = *state;
        state.transition_to(next)?;
        debug!(from = %from, to = %next, "Admission state changed");
        Ok(())
    }
}
