//! Shipping fee quotes.

use reqwest::Method;
use tracing::instrument;

use super::conversions::extract_list;
use super::{ApiClient, ApiError, ShippingOption, ShippingQuoteRequest};

impl ApiClient {
    /// Ask the carrier for the services available to a destination.
    ///
    /// The backend answers with a list of options, a `{ data: [...] }`
    /// wrapper, or a single option object; all three come back as a list.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(
        skip(self, request),
        fields(
            carrier = %request.carrier_code,
            district = request.to_district_id,
            items = request.items.len()
        )
    )]
    pub async fn shipping_options(
        &self,
        request: &ShippingQuoteRequest,
    ) -> Result<Vec<ShippingOption>, ApiError> {
        let url = self.endpoint("shipping/options")?;
        let body: serde_json::Value = self
            .send_json(
                self.request(Method::POST, url).json(request),
                "Không thể tính phí vận chuyển",
            )
            .await?;

        if body.get("fee").is_some() {
            return Ok(vec![serde_json::from_value(body)?]);
        }
        Ok(extract_list(body, &["data", "options"])?)
    }
}
