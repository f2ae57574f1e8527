use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{error, trim, Normalize};

pub const MAX_ATTACHMENTS: usize = 5;

/// Reply posted on a support ticket
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SupportReplyRequest {
    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub message: String,

    #[validate(custom(function = "validate_attachments"))]
    pub attachments: Option<Vec<String>>,

    pub is_internal: Option<bool>,

    pub close_ticket: Option<bool>,
}

impl Normalize for SupportReplyRequest {
    fn normalize(self) -> Self {
        let attachments = self.attachments.map(|list| {
            list.into_iter()
                .map(trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        });
        Self {
            message: trim(self.message),
            attachments: attachments.filter(|list| !list.is_empty()),
            ..self
        }
    }
}

fn validate_attachments(attachments: &Vec<String>) -> Result<(), ValidationError> {
    if attachments.len() > MAX_ATTACHMENTS {
        return Err(error("attachments", "At most 5 attachments are allowed"));
    }
    let all_urls = attachments.iter().all(|a| {
        (a.starts_with("https://") || a.starts_with("http://"))
            && a.len() <= 2048
            && !a.chars().any(char::is_whitespace)
    });
    if !all_urls {
        return Err(error("attachments", "Attachments must be http(s) URLs"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::prepare;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<SupportReplyRequest, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn accepts_reply_with_attachments() {
        let req = parse(json!({
            "message": "We have refunded your order.",
            "attachments": ["https://cdn.example.com/receipt.pdf", "  "],
            "close_ticket": true
        }))
        .unwrap();
        let req = prepare(req).unwrap();
        assert_eq!(req.attachments.as_ref().map(Vec::len), Some(1));
        assert_eq!(req.close_ticket, Some(true));
    }

    #[test]
    fn blank_message_is_rejected() {
        let req = parse(json!({"message": "   "})).unwrap();
        let errors = prepare(req).unwrap_err();
        assert_eq!(errors, vec!["Message must be 1-2000 characters".to_string()]);
    }

    #[test]
    fn non_string_message_fails_to_parse() {
        assert!(parse(json!({"message": 42})).is_err());
    }

    #[test]
    fn too_many_attachments_are_rejected() {
        let urls: Vec<String> = (0..6).map(|i| format!("https://cdn.example.com/{}.png", i)).collect();
        let req = parse(json!({"message": "see attached", "attachments": urls})).unwrap();
        let errors = prepare(req).unwrap_err();
        assert_eq!(errors, vec!["At most 5 attachments are allowed".to_string()]);
    }

    #[test]
    fn non_url_attachment_is_rejected() {
        let req = parse(json!({"message": "see attached", "attachments": ["file:///etc/passwd"]})).unwrap();
        let errors = prepare(req).unwrap_err();
        assert_eq!(errors, vec!["Attachments must be http(s) URLs".to_string()]);
    }
}
