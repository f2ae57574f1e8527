use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{error, trim_opt, Normalize};
use crate::constants::DocumentStatus;

/// Admin decision on an uploaded vendor document
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_rejection_reason"))]
pub struct VendorDocumentVerificationRequest {
    #[validate(custom(function = "validate_decision"))]
    pub status: DocumentStatus,

    #[validate(length(min = 10, max = 500, message = "Rejection reason must be 10-500 characters"))]
    pub rejection_reason: Option<String>,

    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,

    #[validate(custom(function = "validate_expiry"))]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Normalize for VendorDocumentVerificationRequest {
    fn normalize(self) -> Self {
        Self {
            rejection_reason: trim_opt(self.rejection_reason),
            notes: trim_opt(self.notes),
            ..self
        }
    }
}

fn validate_decision(status: &DocumentStatus) -> Result<(), ValidationError> {
    if *status == DocumentStatus::Pending {
        return Err(error("status", "Status must be approved or rejected"));
    }
    Ok(())
}

fn validate_expiry(expires_at: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *expires_at <= Utc::now() {
        return Err(error("expires_at", "Expiry date must be in the future"));
    }
    Ok(())
}

fn validate_rejection_reason(
    req: &VendorDocumentVerificationRequest,
) -> Result<(), ValidationError> {
    if req.status == DocumentStatus::Rejected && req.rejection_reason.is_none() {
        return Err(error(
            "rejection_reason",
            "A rejection reason is required when rejecting a document",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::prepare;
    use chrono::Duration;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<VendorDocumentVerificationRequest, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn accepts_approval_with_future_expiry() {
        let expires = (Utc::now() + Duration::days(365)).to_rfc3339();
        let req = parse(json!({"status": "approved", "expires_at": expires})).unwrap();
        let req = prepare(req).unwrap();
        assert_eq!(req.status, DocumentStatus::Approved);
        assert!(req.expires_at.is_some());
    }

    #[test]
    fn pending_is_not_a_decision() {
        let req = parse(json!({"status": "pending"})).unwrap();
        let errors = prepare(req).unwrap_err();
        assert_eq!(errors, vec!["Status must be approved or rejected".to_string()]);
    }

    #[test]
    fn unknown_status_fails_to_parse() {
        assert!(parse(json!({"status": "maybe"})).is_err());
    }

    #[test]
    fn rejection_requires_reason() {
        let req = parse(json!({"status": "rejected", "rejection_reason": "   "})).unwrap();
        let errors = prepare(req).unwrap_err();
        assert_eq!(
            errors,
            vec!["A rejection reason is required when rejecting a document".to_string()]
        );
    }

    #[test]
    fn short_rejection_reason_is_rejected() {
        let req = parse(json!({"status": "rejected", "rejection_reason": "blurry"})).unwrap();
        let errors = prepare(req).unwrap_err();
        assert_eq!(errors, vec!["Rejection reason must be 10-500 characters".to_string()]);
    }

    #[test]
    fn rejection_with_reason_is_accepted() {
        let req = parse(json!({
            "status": "rejected",
            "rejection_reason": "Licence photo is unreadable"
        }))
        .unwrap();
        assert!(prepare(req).is_ok());
    }

    #[test]
    fn past_expiry_is_rejected() {
        let req = parse(json!({
            "status": "approved",
            "expires_at": "2001-01-01T00:00:00Z"
        }))
        .unwrap();
        let errors = prepare(req).unwrap_err();
        assert_eq!(errors, vec!["Expiry date must be in the future".to_string()]);
    }
}
