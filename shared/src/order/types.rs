//! Wire records of the remote order service

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ============================================================================
// Order Status
// ============================================================================

/// 订单状态 (远程服务的枚举，线上以数字编码传输)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum OrderStatus {
    /// 已创建，等待支付
    #[default]
    Pending = 0,
    /// 已支付
    Paid = 1,
    /// 已批准
    Approved = 2,
    /// 取消中 (saga 补偿进行中)
    Cancelling = 3,
    /// 已取消
    Cancelled = 4,
}

impl OrderStatus {
    /// 规范名称
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Approved => "APPROVED",
            Self::Cancelling => "CANCELLING",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn from_str_name(name: &str) -> Option<Self> {
        match name {
            "PENDING" => Some(Self::Pending),
            "PAID" => Some(Self::Paid),
            "APPROVED" => Some(Self::Approved),
            "CANCELLING" => Some(Self::Cancelling),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Canonical name for a raw wire code; unknown codes render as the number.
    pub fn name_of(code: i32) -> String {
        match Self::try_from(code) {
            Ok(status) => status.as_str_name().to_string(),
            Err(unknown) => unknown.to_string(),
        }
    }
}

impl TryFrom<i32> for OrderStatus {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Paid),
            2 => Ok(Self::Approved),
            3 => Ok(Self::Cancelling),
            4 => Ok(Self::Cancelled),
            other => Err(other),
        }
    }
}

impl From<OrderStatus> for i32 {
    fn from(status: OrderStatus) -> Self {
        status as i32
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str_name())
    }
}

// ============================================================================
// Records
// ============================================================================

/// Order record as exchanged with the order service
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderDto {
    pub id: String,
    pub user_id: String,
    pub price: i32,
    /// Raw `OrderStatus` code
    pub order_status: i32,
    pub payment_id: String,
    pub failure_messages: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<OrderPlanDto>,
}

impl OrderDto {
    /// 状态的规范名称
    pub fn order_status_name(&self) -> String {
        OrderStatus::name_of(self.order_status)
    }

    /// Plan id of the nested plan record, 0 when the record is absent
    pub fn plan_id(&self) -> i32 {
        self.plan.as_ref().map(|p| p.plan_id).unwrap_or_default()
    }
}

/// Plan sub-record embedded in an order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderPlanDto {
    pub id: String,
    pub plan_id: i32,
    pub price: i32,
    pub sub_total: i32,
}

/// Subscription plan as published by the catalogue
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanDto {
    pub plan_id: i32,
    pub name: String,
    pub description: String,
    pub price: i32,
}

/// Opaque typed blob (`google.protobuf.Any` shape)
///
/// `value` travels base64-encoded inside JSON payloads.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnyBlob {
    pub type_url: String,
    #[serde(with = "base64_bytes")]
    pub value: Vec<u8>,
}

impl AnyBlob {
    pub fn new(value: Vec<u8>) -> Self {
        Self {
            type_url: String::new(),
            value,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

mod base64_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_names() {
        assert_eq!(OrderStatus::name_of(0), "PENDING");
        assert_eq!(OrderStatus::name_of(4), "CANCELLED");
        // 未知编码按数字输出
        assert_eq!(OrderStatus::name_of(42), "42");
        assert_eq!(OrderStatus::from_str_name("PAID"), Some(OrderStatus::Paid));
        assert_eq!(i32::from(OrderStatus::Approved), 2);
    }

    #[test]
    fn test_order_dto_defaults_missing_fields() {
        let dto: OrderDto = serde_json::from_str(r#"{ "id": "o-1", "price": 15 }"#).unwrap();
        assert_eq!(dto.id, "o-1");
        assert_eq!(dto.order_status_name(), "PENDING");
        assert!(dto.plan.is_none());
        assert_eq!(dto.plan_id(), 0);
    }

    #[test]
    fn test_any_blob_value_is_base64() {
        let blob = AnyBlob::new(b"\"x\"".to_vec());
        let json = serde_json::to_value(&blob).unwrap();
        assert_eq!(json["value"], "Ing=");

        let back: AnyBlob = serde_json::from_value(json).unwrap();
        assert_eq!(back, blob);
    }
}
