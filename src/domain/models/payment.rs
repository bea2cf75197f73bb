use serde::{Deserialize, Serialize};

pub const SIGNED_FIELD_NAMES: &str = "total_amount,transaction_uuid,product_code";

/// The string the gateway signs: `total_amount=..,transaction_uuid=..,product_code=..`.
pub fn signature_payload(total_amount: &str, transaction_uuid: &str, product_code: &str) -> String {
    [
        format!("total_amount={}", total_amount),
        format!("transaction_uuid={}", transaction_uuid),
        format!("product_code={}", product_code),
    ]
    .join(",")
}

/// Form fields posted to the gateway checkout page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayFormParams {
    pub amount: String,
    pub tax_amount: String,
    pub total_amount: String,
    pub product_service_charge: String,
    pub product_delivery_charge: String,
    pub transaction_uuid: String,
    pub product_code: String,
    pub signature: String,
    pub success_url: String,
    pub failure_url: String,
    pub signed_field_names: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInitiation {
    pub booking_id: i64,
    pub payment_url: String,
    pub params: GatewayFormParams,
}

/// Payment confirmation as delivered by the gateway callback.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentNotification {
    pub transaction_uuid: String,
    pub total_amount: String,
    /// Must match the configured merchant when present.
    pub product_code: Option<String>,
    pub signature: String,
}
