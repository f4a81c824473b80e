//! Storage notification descriptor.
//!
//! The service is triggered by an object-finalize notification delivered as
//! JSON. Only the bucket and object name matter here; every other field of
//! the notification payload is ignored.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageEvent {
    pub bucket: Option<String>,
    pub name: Option<String>,
}

/// One fully-identified object-store location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

impl StorageEvent {
    /// Validate the descriptor. A missing or empty bucket/name rejects the
    /// whole event; no partial parsing is attempted.
    pub fn object_ref(&self) -> Result<ObjectRef, PipelineError> {
        match (self.bucket.as_deref(), self.name.as_deref()) {
            (Some(bucket), Some(key)) if !bucket.is_empty() && !key.is_empty() => Ok(ObjectRef {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            _ => Err(PipelineError::InvalidEvent(
                "event does not identify a bucket and object name".into(),
            )),
        }
    }
}

impl ObjectRef {
    /// Final path segment of the object key, used to derive output keys.
    pub fn basename(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_event_yields_object_ref() {
        let event: StorageEvent =
            serde_json::from_str(r#"{"bucket":"uploads","name":"in/statement.csv"}"#).unwrap();
        let object = event.object_ref().unwrap();
        assert_eq!(object.bucket, "uploads");
        assert_eq!(object.key, "in/statement.csv");
        assert_eq!(object.basename(), "statement.csv");
    }

    #[test]
    fn extra_notification_fields_are_ignored() {
        let event: StorageEvent = serde_json::from_str(
            r#"{"bucket":"uploads","name":"a.csv","contentType":"text/csv","size":"123"}"#,
        )
        .unwrap();
        assert!(event.object_ref().is_ok());
    }

    #[test]
    fn missing_bucket_is_rejected() {
        let event: StorageEvent = serde_json::from_str(r#"{"name":"a.csv"}"#).unwrap();
        let err = event.object_ref().unwrap_err();
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn empty_name_is_rejected() {
        let event = StorageEvent {
            bucket: Some("uploads".into()),
            name: Some(String::new()),
        };
        assert!(event.object_ref().is_err());
    }

    #[test]
    fn basename_of_unnested_key_is_the_key() {
        let object = ObjectRef {
            bucket: "b".into(),
            key: "plain.csv".into(),
        };
        assert_eq!(object.basename(), "plain.csv");
    }
}
