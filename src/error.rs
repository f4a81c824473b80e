//! Error taxonomy for one processing invocation.
//!
//! Every variant is terminal: there is no retry loop inside the pipeline,
//! re-delivery of the trigger is the runtime's concern.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The trigger event did not identify an object-store location.
    #[error("invalid storage event: {0}")]
    InvalidEvent(String),

    /// Reading the source object from the store failed. No side effects.
    #[error("error reading source object: {0}")]
    Fetch(anyhow::Error),

    /// The tabular reader could not be set up over the reassembled text.
    #[error("CSV parse init error: {0}")]
    ParseInit(anyhow::Error),

    /// A record failed during iteration. The raw input has been preserved
    /// (best effort) under the error prefix for later inspection.
    #[error("error processing CSV rows: {0}")]
    RowProcessing(anyhow::Error),

    /// Writing the summary document back to the store failed.
    #[error("error saving processed object: {0}")]
    Write(anyhow::Error),
}

impl PipelineError {
    /// HTTP status the invocation surfaces with.
    pub fn status(&self) -> u16 {
        match self {
            PipelineError::InvalidEvent(_) => 400,
            _ => 500,
        }
    }

    /// Short fixed response body. Detail stays in the logs via `Display`.
    pub fn public_message(&self) -> &'static str {
        match self {
            PipelineError::InvalidEvent(_) => "Invalid storage event",
            PipelineError::Fetch(_) => "Error reading source object",
            PipelineError::ParseInit(_) => "CSV parse init error",
            PipelineError::RowProcessing(_) => "Error processing CSV rows",
            PipelineError::Write(_) => "Error saving processed object",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn invalid_event_maps_to_client_error() {
        let err = PipelineError::InvalidEvent("missing bucket".into());
        assert_eq!(err.status(), 400);
        assert_eq!(err.public_message(), "Invalid storage event");
    }

    #[test]
    fn processing_failures_map_to_server_error() {
        for err in [
            PipelineError::Fetch(anyhow!("boom")),
            PipelineError::ParseInit(anyhow!("boom")),
            PipelineError::RowProcessing(anyhow!("boom")),
            PipelineError::Write(anyhow!("boom")),
        ] {
            assert_eq!(err.status(), 500);
        }
    }

    #[test]
    fn public_message_hides_detail() {
        let err = PipelineError::RowProcessing(anyhow!("record 7: wrong field count"));
        assert_eq!(err.public_message(), "Error processing CSV rows");
        assert!(err.to_string().contains("record 7"));
    }
}
