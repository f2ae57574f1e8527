//! Request payload contracts.
//!
//! Every DTO goes through the same pipeline before it reaches a service:
//! serde rejects missing required fields, wrong types and unknown enum tags,
//! [`Normalize`] trims strings and drops blank optionals, and
//! [`validator::Validate`] enforces lengths, numeric bounds and cross-field
//! rules. [`prepare`] runs the last two steps.

pub mod address;
pub mod payment;
pub mod product;
pub mod query;
pub mod support;
pub mod vendor;

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

pub use address::AddressRequest;
pub use payment::PaymentRequest;
pub use product::{ProductFilterQuery, ProductSortField};
pub use query::{PaginationQuery, SortOrder, UserListQuery};
pub use support::SupportReplyRequest;
pub use vendor::VendorDocumentVerificationRequest;

/// Input cleanup applied before validation
pub trait Normalize {
    fn normalize(self) -> Self;
}

/// Normalize then validate, returning flattened messages on failure
pub fn prepare<T: Normalize + Validate>(dto: T) -> Result<T, Vec<String>> {
    let dto = dto.normalize();
    match dto.validate() {
        Ok(()) => Ok(dto),
        Err(e) => Err(flatten_validation_errors(&e)),
    }
}

/// Collect field and schema errors into a stable, sorted list of messages
pub fn flatten_validation_errors(err: &ValidationErrors) -> Vec<String> {
    let mut msgs = Vec::new();
    for (field, errors) in err.field_errors().iter() {
        for e in errors.iter() {
            let message = if let Some(m) = &e.message {
                m.to_string()
            } else {
                format!("{} {}", field, e.code)
            };
            msgs.push(message);
        }
    }
    msgs.sort();
    msgs
}

pub(crate) fn trim(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

/// Blank optional strings are treated as absent
pub(crate) fn trim_opt(value: Option<String>) -> Option<String> {
    value.map(trim).filter(|s| !s.is_empty())
}

pub(crate) fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}
