//! Customer addresses and the location hierarchy used to build them.

use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use fruity_core::AddressId;

use super::conversions::extract_list;
use super::{Address, AddressInput, ApiClient, ApiError, Location};

#[derive(Serialize)]
struct DefaultBody {
    is_default: bool,
}

impl ApiClient {
    // =========================================================================
    // Addresses
    // =========================================================================

    /// Addresses saved by the current customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_addresses(&self) -> Result<Vec<Address>, ApiError> {
        let url = self.endpoint("customers/addresses")?;
        let body: serde_json::Value = self
            .send_json(
                self.request(Method::GET, url),
                "Không thể tải danh sách địa chỉ",
            )
            .await?;
        Ok(extract_list(body, &["data", "addresses"])?)
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input))]
    pub async fn add_address(&self, input: &AddressInput) -> Result<(), ApiError> {
        let url = self.endpoint("customers/addresses")?;
        self.send_unit(self.request(Method::POST, url).json(input), "Lỗi khi thêm địa chỉ")
            .await
    }

    /// Replace the fields of an existing address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(address_id = %id))]
    pub async fn update_address(&self, id: AddressId, input: &AddressInput) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("customers/addresses/{id}"))?;
        self.send_unit(
            self.request(Method::PATCH, url).json(input),
            "Lỗi khi cập nhật địa chỉ",
        )
        .await
    }

    /// Mark an address as the default; the backend unsets the previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(address_id = %id))]
    pub async fn set_default_address(&self, id: AddressId) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("customers/addresses/{id}"))?;
        self.send_unit(
            self.request(Method::PATCH, url)
                .json(&DefaultBody { is_default: true }),
            "Không thể đặt địa chỉ mặc định",
        )
        .await
    }

    /// Delete an address. A `204` answer is success.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(address_id = %id))]
    pub async fn delete_address(&self, id: AddressId) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("customers/addresses/{id}"))?;
        self.send_unit(self.request(Method::DELETE, url), "Lỗi khi xóa địa chỉ")
            .await
    }

    // =========================================================================
    // Locations
    // =========================================================================

    /// All provinces.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn provinces(&self) -> Result<Vec<Location>, ApiError> {
        self.locations("locations/provinces", "Không tìm thấy API provinces")
            .await
    }

    /// Districts of a province.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn districts(&self, province_code: &str) -> Result<Vec<Location>, ApiError> {
        self.locations(
            &format!("locations/districts/{}", province_code.trim()),
            "Không tìm thấy API districts",
        )
        .await
    }

    /// Wards of a district.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn wards(&self, district_code: &str) -> Result<Vec<Location>, ApiError> {
        self.locations(
            &format!("locations/wards/{}", district_code.trim()),
            "Không tìm thấy API wards",
        )
        .await
    }

    #[instrument(skip(self, fallback))]
    async fn locations(&self, path: &str, fallback: &str) -> Result<Vec<Location>, ApiError> {
        let url = self.endpoint(path)?;
        let body: serde_json::Value = self.send_json(self.request(Method::GET, url), fallback).await?;
        Ok(extract_list(body, &["data"])?)
    }
}
