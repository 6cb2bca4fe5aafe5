//! Creation and modification provenance.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::table::{TableError, TableResult, error::InvalidAuditSnafu};

/// Creator recorded when a table is built without explicit audit
/// information.
pub const ANONYMOUS_CREATOR: &str = "anonymous";

/// Who created an entity and when, and who last changed it and when.
///
/// The creation fields are fixed when the record is made. Modification
/// fields only move forward: [`AuditInfo::modified`] never produces a
/// modification time earlier than the creation time or the previous
/// modification time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "AuditRecord")]
pub struct AuditInfo {
    creator: String,
    create_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_modifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_modified_time: Option<DateTime<Utc>>,
}

/// Serialized shape of an [`AuditInfo`]; checked before use.
#[derive(Deserialize)]
struct AuditRecord {
    creator: String,
    create_time: DateTime<Utc>,
    #[serde(default)]
    last_modifier: Option<String>,
    #[serde(default)]
    last_modified_time: Option<DateTime<Utc>>,
}

impl TryFrom<AuditRecord> for AuditInfo {
    type Error = TableError;

    fn try_from(record: AuditRecord) -> Result<Self, Self::Error> {
        let audit = AuditInfo {
            creator: record.creator,
            create_time: record.create_time,
            last_modifier: record.last_modifier,
            last_modified_time: record.last_modified_time,
        };
        audit.validate()?;
        Ok(audit)
    }
}

impl AuditInfo {
    /// Record created by `creator`, now.
    pub fn new(creator: impl Into<String>) -> Self {
        Self::created(creator, Utc::now())
    }

    /// Record created by `creator` at `create_time`.
    pub fn created(creator: impl Into<String>, create_time: DateTime<Utc>) -> Self {
        Self {
            creator: creator.into(),
            create_time,
            last_modifier: None,
            last_modified_time: None,
        }
    }

    /// Record for an entity created by [`ANONYMOUS_CREATOR`], now.
    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS_CREATOR)
    }

    /// A copy of this record marked as modified by `modifier` at `at`.
    ///
    /// If `at` is earlier than the creation time or the previous modification
    /// time, the later of those is recorded instead.
    pub fn modified(&self, modifier: impl Into<String>, at: DateTime<Utc>) -> Self {
        let floor = self.last_modified_time.unwrap_or(self.create_time);
        Self {
            creator: self.creator.clone(),
            create_time: self.create_time,
            last_modifier: Some(modifier.into()),
            last_modified_time: Some(at.max(floor)),
        }
    }

    /// Identity that created the entity.
    pub fn creator(&self) -> &str {
        &self.creator
    }

    /// When the entity was created.
    pub fn create_time(&self) -> DateTime<Utc> {
        self.create_time
    }

    /// Identity that last modified the entity, if it was ever modified.
    pub fn last_modifier(&self) -> Option<&str> {
        self.last_modifier.as_deref()
    }

    /// When the entity was last modified, if it was ever modified.
    pub fn last_modified_time(&self) -> Option<DateTime<Utc>> {
        self.last_modified_time
    }

    /// Modifier and modification time are set together, and the
    /// modification time is not earlier than the creation time.
    pub(crate) fn validate(&self) -> TableResult<()> {
        match (&self.last_modifier, self.last_modified_time) {
            (None, None) => Ok(()),
            (Some(_), Some(at)) => {
                ensure!(
                    at >= self.create_time,
                    InvalidAuditSnafu {
                        reason: format!(
                            "last modified at {at} is before creation at {}",
                            self.create_time
                        ),
                    }
                );
                Ok(())
            }
            (Some(modifier), None) => InvalidAuditSnafu {
                reason: format!("modifier '{modifier}' recorded without a modification time"),
            }
            .fail(),
            (None, Some(at)) => InvalidAuditSnafu {
                reason: format!("modification time {at} recorded without a modifier"),
            }
            .fail(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn utc_datetime(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, hour, 0, 0)
            .single()
            .expect("valid UTC timestamp")
    }

    #[test]
    fn created_has_no_modification() {
        let audit = AuditInfo::created("alice", utc_datetime(0));
        assert_eq!(audit.creator(), "alice");
        assert_eq!(audit.create_time(), utc_datetime(0));
        assert_eq!(audit.last_modifier(), None);
        assert_eq!(audit.last_modified_time(), None);
    }

    #[test]
    fn modified_keeps_creation_fields() {
        let audit = AuditInfo::created("alice", utc_datetime(0));
        let next = audit.modified("bob", utc_datetime(2));

        assert_eq!(next.creator(), "alice");
        assert_eq!(next.create_time(), utc_datetime(0));
        assert_eq!(next.last_modifier(), Some("bob"));
        assert_eq!(next.last_modified_time(), Some(utc_datetime(2)));
        // The original is untouched.
        assert_eq!(audit.last_modifier(), None);
    }

    #[test]
    fn modification_time_never_goes_backwards() {
        let audit = AuditInfo::created("alice", utc_datetime(5));

        let early = audit.modified("bob", utc_datetime(1));
        assert_eq!(early.last_modified_time(), Some(utc_datetime(5)));

        let later = early.modified("carol", utc_datetime(8));
        let stale = later.modified("dave", utc_datetime(8) - Duration::minutes(30));
        assert_eq!(stale.last_modified_time(), Some(utc_datetime(8)));
        assert_eq!(stale.last_modifier(), Some("dave"));
    }

    #[test]
    fn json_omits_missing_modification() {
        let audit = AuditInfo::created("alice", utc_datetime(0));
        let json = serde_json::to_string(&audit).unwrap();
        assert!(!json.contains("last_modifier"));
        let back: AuditInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, audit);
    }

    #[test]
    fn stored_modification_before_creation_is_rejected() {
        let json = r#"{
            "creator": "etl",
            "create_time": "2025-01-01T00:00:00Z",
            "last_modifier": "ops",
            "last_modified_time": "1999-01-01T00:00:00Z"
        }"#;
        let err = serde_json::from_str::<AuditInfo>(json).unwrap_err();
        assert!(err.to_string().contains("before creation"), "{err}");
    }

    #[test]
    fn stored_half_modification_is_rejected() {
        let time_only = r#"{
            "creator": "etl",
            "create_time": "2025-01-01T00:00:00Z",
            "last_modified_time": "2025-02-01T00:00:00Z"
        }"#;
        let err = serde_json::from_str::<AuditInfo>(time_only).unwrap_err();
        assert!(err.to_string().contains("without a modifier"), "{err}");

        let modifier_only = r#"{
            "creator": "etl",
            "create_time": "2025-01-01T00:00:00Z",
            "last_modifier": "ops"
        }"#;
        let err = serde_json::from_str::<AuditInfo>(modifier_only).unwrap_err();
        assert!(err.to_string().contains("without a modification time"), "{err}");
    }

    #[test]
    fn modified_records_always_validate() {
        let audit = AuditInfo::created("alice", utc_datetime(5));
        assert_eq!(audit.validate(), Ok(()));
        assert_eq!(audit.modified("bob", utc_datetime(1)).validate(), Ok(()));
        assert!(matches!(
            AuditInfo {
                last_modified_time: Some(utc_datetime(1)),
                last_modifier: Some("bob".to_string()),
                ..audit
            }
            .validate(),
            Err(TableError::InvalidAudit { .. })
        ));
    }
}
