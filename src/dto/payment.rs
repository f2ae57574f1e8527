use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{error, trim_opt, Normalize};
use crate::constants::{PaymentGateway, PaymentMethod};

/// Payment request against an order or the customer's wallet
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_method_gateway"))]
pub struct PaymentRequest {
    #[validate(range(min = 0.01, max = 100000.0, message = "Amount must be between 0.01 and 100000"))]
    pub amount: f64,

    pub method: PaymentMethod,

    pub gateway: PaymentGateway,

    pub order_id: Option<Uuid>,

    #[validate(custom(function = "validate_currency_code"))]
    pub currency: Option<String>,

    #[validate(length(max = 255, message = "Gateway reference must be at most 255 characters"))]
    pub gateway_reference: Option<String>,
}

impl Normalize for PaymentRequest {
    fn normalize(self) -> Self {
        Self {
            currency: trim_opt(self.currency).map(|c| c.to_uppercase()),
            gateway_reference: trim_opt(self.gateway_reference),
            ..self
        }
    }
}

impl PaymentRequest {
    pub fn currency_or_default(&self) -> &str {
        self.currency
            .as_deref()
            .unwrap_or(crate::constants::vendor_defaults::CURRENCY)
    }
}

fn validate_currency_code(currency: &str) -> Result<(), ValidationError> {
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(error("currency", "Currency must be a 3-letter ISO code"));
    }
    Ok(())
}

fn validate_method_gateway(req: &PaymentRequest) -> Result<(), ValidationError> {
    let internal_gateway = req.gateway == PaymentGateway::Internal;
    if req.method.is_internal() && !internal_gateway {
        return Err(error(
            "gateway_mismatch",
            "Cash and wallet payments must use the internal gateway",
        ));
    }
    if !req.method.is_internal() && internal_gateway {
        return Err(error(
            "gateway_mismatch",
            "Card and UPI payments require an external gateway",
        ));
    }
    if req.method == PaymentMethod::Wallet && req.order_id.is_none() {
        return Err(error("order_required", "Wallet payments must reference an order"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::prepare;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<PaymentRequest, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn accepts_card_payment_through_stripe() {
        let req = parse(json!({
            "amount": 24.5,
            "method": "card",
            "gateway": "stripe",
            "currency": " eur "
        }))
        .unwrap();
        let req = prepare(req).unwrap();
        assert_eq!(req.currency.as_deref(), Some("EUR"));
        assert!(req.order_id.is_none());
    }

    #[test]
    fn currency_defaults_when_absent() {
        let req = parse(json!({"amount": 10, "method": "upi", "gateway": "razorpay"})).unwrap();
        assert_eq!(req.currency_or_default(), "USD");
    }

    #[test]
    fn unknown_method_fails_to_parse() {
        let res = parse(json!({"amount": 10, "method": "bitcoin", "gateway": "stripe"}));
        assert!(res.is_err());
    }

    #[test]
    fn missing_gateway_fails_to_parse() {
        let res = parse(json!({"amount": 10, "method": "card"}));
        assert!(res.is_err());
    }

    #[test]
    fn zero_amount_is_rejected() {
        let req = parse(json!({"amount": 0, "method": "card", "gateway": "paypal"})).unwrap();
        let errors = prepare(req).unwrap_err();
        assert_eq!(errors, vec!["Amount must be between 0.01 and 100000".to_string()]);
    }

    #[test]
    fn cash_through_external_gateway_is_rejected() {
        let req = parse(json!({"amount": 5, "method": "cash", "gateway": "stripe"})).unwrap();
        let errors = prepare(req).unwrap_err();
        assert_eq!(
            errors,
            vec!["Cash and wallet payments must use the internal gateway".to_string()]
        );
    }

    #[test]
    fn card_through_internal_gateway_is_rejected() {
        let req = parse(json!({"amount": 5, "method": "card", "gateway": "internal"})).unwrap();
        assert!(prepare(req).is_err());
    }

    #[test]
    fn wallet_payment_requires_order() {
        let req = parse(json!({"amount": 5, "method": "wallet", "gateway": "internal"})).unwrap();
        let errors = prepare(req).unwrap_err();
        assert_eq!(errors, vec!["Wallet payments must reference an order".to_string()]);

        let req = parse(json!({
            "amount": 5,
            "method": "wallet",
            "gateway": "internal",
            "order_id": "6f1c2d1e-8a9b-4c3d-9e8f-0a1b2c3d4e5f"
        }))
        .unwrap();
        assert!(prepare(req).is_ok());
    }

    #[test]
    fn malformed_currency_is_rejected() {
        let req = parse(json!({
            "amount": 5, "method": "card", "gateway": "stripe", "currency": "EURO"
        }))
        .unwrap();
        let errors = prepare(req).unwrap_err();
        assert_eq!(errors, vec!["Currency must be a 3-letter ISO code".to_string()]);
    }
}
