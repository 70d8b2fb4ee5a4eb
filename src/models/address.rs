use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Address {
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub phone: String,
    pub province: String,
    pub district: String,
    pub ward: String,
    pub address_detail: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Address {
    pub fn full_address(&self) -> String {
        format!(
            "{}, {}, {}, {}",
            self.address_detail, self.ward, self.district, self.province
        )
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateAddressRequest {
    #[schema(example = "Nguyen Van A")]
    pub full_name: String,
    #[schema(example = "0901234567")]
    pub phone: String,
    #[schema(example = "TP. Ho Chi Minh")]
    pub province: String,
    #[schema(example = "Quan 1")]
    pub district: String,
    #[schema(example = "Phuong Ben Nghe")]
    pub ward: String,
    #[schema(example = "12 Le Loi")]
    pub address_detail: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddressResponse {
    pub id: i64,
    pub full_name: String,
    pub phone: String,
    pub province: String,
    pub district: String,
    pub ward: String,
    pub address_detail: String,
    pub full_address: String,
    pub is_default: bool,
}

impl From<Address> for AddressResponse {
    fn from(a: Address) -> Self {
        let full_address = a.full_address();
        Self {
            id: a.id,
            full_name: a.full_name,
            phone: a.phone,
            province: a.province,
            district: a.district,
            ward: a.ward,
            address_detail: a.address_detail,
            full_address,
            is_default: a.is_default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_full_address_ordering() {
        let a = Address {
            id: 1,
            user_id: 1,
            full_name: "Nguyen Van A".to_string(),
            phone: "0901234567".to_string(),
            province: "TP. Ho Chi Minh".to_string(),
            district: "Quan 1".to_string(),
            ward: "Phuong Ben Nghe".to_string(),
            address_detail: "12 Le Loi".to_string(),
            is_default: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(
            a.full_address(),
            "12 Le Loi, Phuong Ben Nghe, Quan 1, TP. Ho Chi Minh"
        );
    }
}
