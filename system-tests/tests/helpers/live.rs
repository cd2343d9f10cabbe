// system-tests/tests/helpers/live.rs
// ============================================================================
// Module: Live Test Wrapper
// Description: Reporter and context setup shared by every live scenario.
// Purpose: Skip without a backend and always leave a summary and transcript.
// Dependencies: system-tests helpers
// ============================================================================

use std::error::Error;

use super::artifacts::SummaryStatus;
use super::artifacts::TestReporter;
use super::context::ApiContext;

const TRANSCRIPT_ARTIFACT: &str = "http_transcript.json";

/// One live scenario run with its reporter.
pub struct LiveTest {
    reporter: TestReporter,
    context: ApiContext,
}

impl LiveTest {
    /// Prepares a live run, or records a skip when no `API_URL` is configured.
    pub fn start(test_name: &str) -> Result<Option<Self>, Box<dyn Error>> {
        let mut reporter = TestReporter::new(test_name)?;
        let Some(context) = ApiContext::from_env()? else {
            reporter.artifacts().write_json(TRANSCRIPT_ARTIFACT, &Vec::<()>::new())?;
            reporter.finish(
                SummaryStatus::Skip,
                &["API_URL is not set in the shared store".to_string()],
            )?;
            return Ok(None);
        };
        Ok(Some(Self {
            reporter,
            context,
        }))
    }

    /// Returns the scenario context.
    pub fn context(&self) -> &ApiContext {
        &self.context
    }

    /// Writes the transcript and summary, then propagates the scenario result.
    pub fn finish(mut self, outcome: Result<(), String>) -> Result<(), Box<dyn Error>> {
        self.reporter
            .artifacts()
            .write_json(TRANSCRIPT_ARTIFACT, &self.context.transcript())?;
        match outcome {
            Ok(()) => {
                self.reporter.finish(SummaryStatus::Pass, &[])?;
                Ok(())
            }
            Err(message) => {
                self.reporter.finish(SummaryStatus::Fail, std::slice::from_ref(&message))?;
                Err(message.into())
            }
        }
    }
}
