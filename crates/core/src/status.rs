//! Document review status and hand-off transfer status.
//!
//! `DocumentStatus` is the outcome of the last stage's review;
//! `TransferStatus` is the delivery state of the current hand-off. The two
//! are independent: a document can be `rejected` while its hand-off back to
//! the previous stage is merely `sent`.

use crate::error::CoreError;

/// Review outcome of a document at its current position in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    Pending,
    Verified,
    Rejected,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Verified => "verified",
            DocumentStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "pending" => Ok(DocumentStatus::Pending),
            "verified" => Ok(DocumentStatus::Verified),
            "rejected" => Ok(DocumentStatus::Rejected),
            other => Err(CoreError::DataIntegrity(format!(
                "unknown document status '{other}'"
            ))),
        }
    }
}

/// Delivery state of the current hand-off.
///
/// Advances strictly `pending -> sent -> received -> viewed` within one
/// hand-off and resets to `sent` whenever a transition creates a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TransferStatus {
    Pending,
    Sent,
    Received,
    Viewed,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::Sent => "sent",
            TransferStatus::Received => "received",
            TransferStatus::Viewed => "viewed",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "pending" => Ok(TransferStatus::Pending),
            "sent" => Ok(TransferStatus::Sent),
            "received" => Ok(TransferStatus::Received),
            "viewed" => Ok(TransferStatus::Viewed),
            other => Err(CoreError::DataIntegrity(format!(
                "unknown transfer status '{other}'"
            ))),
        }
    }

    /// Whether `next` is a legal advance from `self` within one hand-off.
    pub fn can_advance_to(&self, next: TransferStatus) -> bool {
        matches!(
            (self, next),
            (TransferStatus::Pending, TransferStatus::Sent)
                | (TransferStatus::Sent, TransferStatus::Received)
                | (TransferStatus::Received, TransferStatus::Viewed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            DocumentStatus::Pending,
            DocumentStatus::Verified,
            DocumentStatus::Rejected,
        ] {
            assert_eq!(DocumentStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_is_integrity_error() {
        assert!(matches!(
            DocumentStatus::parse("archived"),
            Err(CoreError::DataIntegrity(_))
        ));
        assert!(matches!(
            TransferStatus::parse(""),
            Err(CoreError::DataIntegrity(_))
        ));
    }

    #[test]
    fn test_transfer_advances_in_order() {
        assert!(TransferStatus::Pending.can_advance_to(TransferStatus::Sent));
        assert!(TransferStatus::Sent.can_advance_to(TransferStatus::Received));
        assert!(TransferStatus::Received.can_advance_to(TransferStatus::Viewed));
    }

    #[test]
    fn test_transfer_never_skips_or_reverses() {
        assert!(!TransferStatus::Pending.can_advance_to(TransferStatus::Received));
        assert!(!TransferStatus::Sent.can_advance_to(TransferStatus::Viewed));
        assert!(!TransferStatus::Viewed.can_advance_to(TransferStatus::Sent));
        assert!(!TransferStatus::Received.can_advance_to(TransferStatus::Received));
    }
}
