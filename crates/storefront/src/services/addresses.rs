//! Address book and location lookups.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::instrument;

use fruity_core::AddressId;

use crate::api::{Address, AddressInput, ApiClient, Location};
use crate::error::{AppError, Result};

/// Address book store. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct AddressBook {
    api: ApiClient,
    addresses: Arc<RwLock<Vec<Address>>>,
}

impl AddressBook {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            addresses: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn addresses(&self) -> Vec<Address> {
        self.addresses.read().await.clone()
    }

    /// The default address, or the first one when none is flagged.
    pub async fn default_or_first(&self) -> Option<Address> {
        default_or_first(&self.addresses.read().await).cloned()
    }

    pub async fn get(&self, id: AddressId) -> Option<Address> {
        self.addresses.read().await.iter().find(|a| a.id == id).cloned()
    }

    /// Replace local state with the server list.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotAuthenticated` without a token, or an API error.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Vec<Address>> {
        self.require_token()?;
        let list = self.api.list_addresses().await?;
        self.addresses.write().await.clone_from(&list);
        Ok(list)
    }

    /// Save a new address, then refetch.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` naming blank fields, or an API error.
    #[instrument(skip(self, input))]
    pub async fn add(&self, input: &AddressInput) -> Result<Vec<Address>> {
        self.require_token()?;
        validate(input)?;
        self.api.add_address(input).await?;
        self.load().await
    }

    /// Replace an address, then refetch.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` naming blank fields, or an API error.
    #[instrument(skip(self, input), fields(address_id = %id))]
    pub async fn update(&self, id: AddressId, input: &AddressInput) -> Result<Vec<Address>> {
        self.require_token()?;
        validate(input)?;
        self.api.update_address(id, input).await?;
        self.load().await
    }

    /// Delete an address, then refetch.
    ///
    /// # Errors
    ///
    /// Returns an API error if the delete or the refetch fails.
    #[instrument(skip(self), fields(address_id = %id))]
    pub async fn delete(&self, id: AddressId) -> Result<Vec<Address>> {
        self.require_token()?;
        self.api.delete_address(id).await?;
        self.load().await
    }

    /// Make `id` the default address.
    ///
    /// The change is reflected locally without a refetch: exactly that
    /// address is flagged default afterwards.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown id, or an API error.
    #[instrument(skip(self), fields(address_id = %id))]
    pub async fn set_default(&self, id: AddressId) -> Result<Vec<Address>> {
        self.require_token()?;
        if self.get(id).await.is_none() {
            return Err(AppError::NotFound(format!("Không tìm thấy địa chỉ #{id}")));
        }

        self.api.set_default_address(id).await?;

        let mut addresses = self.addresses.write().await;
        mark_default(&mut addresses, id);
        Ok(addresses.clone())
    }

    // =========================================================================
    // Locations
    // =========================================================================

    /// # Errors
    ///
    /// Returns an API error if the lookup fails.
    pub async fn provinces(&self) -> Result<Vec<Location>> {
        Ok(self.api.provinces().await?)
    }

    /// # Errors
    ///
    /// Returns an API error if the lookup fails.
    pub async fn districts(&self, province_code: &str) -> Result<Vec<Location>> {
        Ok(self.api.districts(province_code).await?)
    }

    /// # Errors
    ///
    /// Returns an API error if the lookup fails.
    pub async fn wards(&self, district_code: &str) -> Result<Vec<Location>> {
        Ok(self.api.wards(district_code).await?)
    }

    fn require_token(&self) -> Result<()> {
        if self.api.has_token() {
            Ok(())
        } else {
            Err(AppError::NotAuthenticated)
        }
    }
}

/// The flagged default, else the first address.
#[must_use]
pub fn default_or_first(addresses: &[Address]) -> Option<&Address> {
    addresses
        .iter()
        .find(|a| a.is_default)
        .or_else(|| addresses.first())
}

fn mark_default(addresses: &mut [Address], id: AddressId) {
    for address in addresses {
        address.is_default = address.id == id;
    }
}

fn validate(input: &AddressInput) -> Result<()> {
    let missing = input.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Vui lòng nhập đầy đủ thông tin: {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn addresses() -> Vec<Address> {
        serde_json::from_value(serde_json::json!([
            { "id": 1, "name": "Lan", "phone": "0901", "address": "1 Lê Lợi", "is_default": false },
            { "id": 2, "name": "Lan", "phone": "0901", "address": "2 Hai Bà Trưng", "is_default": true },
            { "id": 3, "name": "Minh", "phone": "0902", "address": "3 Nguyễn Huệ" }
        ]))
        .unwrap()
    }

    #[test]
    fn test_default_or_first() {
        let list = addresses();
        assert_eq!(default_or_first(&list).unwrap().id, AddressId::new(2));

        let mut list = addresses();
        list[1].is_default = false;
        assert_eq!(default_or_first(&list).unwrap().id, AddressId::new(1));

        assert!(default_or_first(&[]).is_none());
    }

    #[test]
    fn test_mark_default_leaves_exactly_one() {
        let mut list = addresses();
        mark_default(&mut list, AddressId::new(3));
        let defaults: Vec<_> = list.iter().filter(|a| a.is_default).map(|a| a.id).collect();
        assert_eq!(defaults, vec![AddressId::new(3)]);
    }

    #[test]
    fn test_validate_lists_missing_fields() {
        let err = validate(&AddressInput::default()).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("ward_code")));
    }
}
