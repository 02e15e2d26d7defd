//! Console progress output (verbose mode)

use colored::Colorize;
use qthrottle_core::port::SubmissionObserver;
use std::path::Path;

fn queue_load_line(outstanding: usize, ceiling: u32) -> String {
    format!(
        "{} out of {} allowed jobs currently submitted",
        outstanding, ceiling
    )
}

fn submitted_line(job_name: &str, acknowledgement: &str) -> String {
    format!("Submitted job {} {}", job_name, acknowledgement.trim())
        .trim_end()
        .to_string()
}

fn drain_line(matching: usize, fragment: &str) -> String {
    format!("{} jobs containing {} in queue", matching, fragment)
}

/// Prints controller progress to stdout
pub struct ConsoleObserver;

impl SubmissionObserver for ConsoleObserver {
    fn queue_load(&self, outstanding: usize, ceiling: u32) {
        let line = queue_load_line(outstanding, ceiling);
        if outstanding >= ceiling as usize {
            println!("{}", line.yellow());
        } else {
            println!("{}", line);
        }
    }

    fn submitted(&self, job_name: &str, acknowledgement: &str) {
        println!("{}", submitted_line(job_name, acknowledgement).green());
    }

    fn drain_status(&self, matching: usize, fragment: &str) {
        println!("{}", drain_line(matching, fragment).cyan());
    }

    fn cleanup_failed(&self, path: &Path, reason: &str) {
        println!(
            "{} could not remove {}: {}",
            "!".yellow().bold(),
            path.display(),
            reason
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_load_line() {
        assert_eq!(
            queue_load_line(3, 100),
            "3 out of 100 allowed jobs currently submitted"
        );
    }

    #[test]
    fn test_submitted_line_carries_acknowledgement() {
        assert_eq!(
            submitted_line("nightly", "Your job 4211 (\"nightly\") has been submitted\n"),
            "Submitted job nightly Your job 4211 (\"nightly\") has been submitted"
        );
        assert_eq!(submitted_line("nightly", ""), "Submitted job nightly");
    }

    #[test]
    fn test_drain_line() {
        assert_eq!(drain_line(2, "sim"), "2 jobs containing sim in queue");
    }
}
