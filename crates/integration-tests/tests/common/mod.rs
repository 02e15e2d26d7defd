//! Fake `qstat`/`qsub` executables backed by files in a scratch directory.
//!
//! The queue is a text file with one job name per line. `qsub` appends the
//! submitted name, `qstat` prints the file either as a plain listing or as
//! `-xml`. Every call's arguments are appended to `<tool>_calls`.
#![allow(dead_code)]

use qthrottle_infra_system::SgeCommands;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

const FAKE_QSTAT: &str = r#"#!/bin/sh
STATE='@STATE@'
echo "$*" >> "$STATE/qstat_calls"
if [ -f "$STATE/qstat_fails" ]; then
    cat "$STATE/qstat_fails" >&2
    exit 2
fi
touch "$STATE/queue"
case " $* " in
    *" -xml "*)
        echo "<?xml version='1.0'?>"
        echo "<job_info>"
        echo "  <queue_info>"
        while IFS= read -r name; do
            echo "    <job_list state=\"running\">"
            echo "      <JB_name>$name</JB_name>"
            echo "    </job_list>"
        done < "$STATE/queue"
        echo "  </queue_info>"
        echo "</job_info>"
        ;;
    *)
        if [ -s "$STATE/queue" ]; then
            echo "job-ID  prior   name       user         state submit/start at     queue"
            echo "-----------------------------------------------------------------------------"
            while IFS= read -r name; do
                echo "  4211 0.55500 $name alice r 01/01/2024 10:00:00 test.q@node1"
            done < "$STATE/queue"
        fi
        ;;
esac
if [ -f "$STATE/finish_per_listing" ]; then
    sed '1d' "$STATE/queue" > "$STATE/queue.next"
    mv "$STATE/queue.next" "$STATE/queue"
fi
"#;

const FAKE_QSUB: &str = r#"#!/bin/sh
STATE='@STATE@'
echo "$*" >> "$STATE/qsub_calls"
if [ -f "$STATE/qsub_rejects" ]; then
    cat "$STATE/qsub_rejects" >&2
    exit 1
fi
name=""
script=""
while [ $# -gt 0 ]; do
    case "$1" in
        -N) shift; name="$1" ;;
        *) script="$1" ;;
    esac
    shift
done
cat "$script" >> "$STATE/submitted_scripts"
echo "$name" >> "$STATE/queue"
echo "Your job $(wc -l < "$STATE/qsub_calls" | tr -d ' ') (\"$name\") has been submitted"
"#;

static SERIAL: Mutex<()> = Mutex::new(());

/// Run one test at a time: executing a freshly written script while another
/// thread forks can fail with ETXTBSY.
pub fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct FakeSge {
    root: PathBuf,
}

impl FakeSge {
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("qthrottle-it-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(root.join("state")).unwrap();
        std::fs::create_dir_all(root.join("scripts")).unwrap();

        let fake = Self { root };
        fake.install("qstat", FAKE_QSTAT);
        fake.install("qsub", FAKE_QSUB);
        fake
    }

    fn install(&self, tool: &str, template: &str) {
        use std::os::unix::fs::PermissionsExt;

        let path = self.root.join(tool);
        let state = self.state_dir();
        std::fs::write(&path, template.replace("@STATE@", state.to_str().unwrap())).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn state_dir(&self) -> PathBuf {
        self.root.join("state")
    }

    fn read_lines(&self, file: &str) -> Vec<String> {
        std::fs::read_to_string(self.state_dir().join(file))
            .map(|text| text.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn commands(&self) -> SgeCommands {
        SgeCommands {
            qstat: self.root.join("qstat").display().to_string(),
            qsub: self.root.join("qsub").display().to_string(),
        }
    }

    pub fn script_dir(&self) -> PathBuf {
        self.root.join("scripts")
    }

    /// Jobs already in the queue before the test starts
    pub fn seed_queue(&self, names: &[&str]) {
        let mut text = names.join("\n");
        text.push('\n');
        std::fs::write(self.state_dir().join("queue"), text).unwrap();
    }

    /// The oldest job leaves the queue after every `qstat` call
    pub fn finish_one_job_per_listing(&self) {
        std::fs::write(self.state_dir().join("finish_per_listing"), "").unwrap();
    }

    pub fn fail_queries(&self, stderr: &str) {
        std::fs::write(self.state_dir().join("qstat_fails"), stderr).unwrap();
    }

    pub fn reject_submissions(&self, stderr: &str) {
        std::fs::write(self.state_dir().join("qsub_rejects"), stderr).unwrap();
    }

    pub fn queued(&self) -> Vec<String> {
        self.read_lines("queue")
    }

    pub fn qstat_calls(&self) -> Vec<String> {
        self.read_lines("qstat_calls")
    }

    pub fn qsub_calls(&self) -> Vec<String> {
        self.read_lines("qsub_calls")
    }

    /// Concatenated contents of every script qsub was given
    pub fn submitted_scripts(&self) -> String {
        std::fs::read_to_string(self.state_dir().join("submitted_scripts")).unwrap_or_default()
    }

    /// Script files still present in the script directory
    pub fn leftover_scripts(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.script_dir())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }
}

impl Drop for FakeSge {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}
