//! Demo command shell for `genpage` pages.
//!
//! Understands a handful of built-in commands. A command ending in `&` or
//! with a `>>` token runs as a simulated background job whose progress
//! advances each time its output is read.

use std::collections::HashMap;

use oledui_common::{CallbackError, Shell};

/// Progress added per output read.
const JOB_STEP: u32 = 25;

struct Job {
    cmd: String,
    progress: u32,
}

#[derive(Default)]
pub struct DemoShell {
    jobs: HashMap<String, Job>,
    next_job: u32,
}

impl DemoShell {
    pub fn new() -> Self { Self::default() }
}

impl Shell for DemoShell {
    fn exec(
        &mut self,
        cmd: &str,
    ) -> Result<String, CallbackError> {
        let mut words = cmd.split_whitespace();
        match words.next() {
            Some("echo") => Ok(words.collect::<Vec<_>>().join(" ")),
            Some("version") => Ok(format!("oledui {}", env!("CARGO_PKG_VERSION"))),
            Some("jobs") => Ok(format!("{} jobs", self.jobs.len())),
            Some("uptime") => Ok("up".to_string()),
            Some(other) => Err(CallbackError::new(&format!("unknown: {other}"))),
            None => Err(CallbackError::new("empty command")),
        }
    }

    fn spawn(
        &mut self,
        cmd: &str,
    ) -> Result<String, CallbackError> {
        let tag = format!("job{}", self.next_job);
        self.next_job += 1;
        self.jobs.insert(
            tag.clone(),
            Job {
                cmd: cmd.trim_end_matches('&').trim().to_string(),
                progress: 0,
            },
        );
        Ok(tag)
    }

    fn output(
        &mut self,
        tag: &str,
    ) -> Option<String> {
        let job = self.jobs.get_mut(tag)?;
        job.progress = (job.progress + JOB_STEP).min(100);
        Some(format!("{} {}%", job.cmd, job.progress))
    }

    fn is_busy(
        &mut self,
        tag: &str,
    ) -> bool {
        match self.jobs.get(tag) {
            Some(job) if job.progress >= 100 => {
                self.jobs.remove(tag);
                false
            }
            Some(_) => true,
            None => false,
        }
    }
}
