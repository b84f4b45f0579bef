use crate::client::AvitoClient;
use crate::error::AvitoError;
use crate::types::{Account, Balance, RatingInfo};

impl AvitoClient {
    /// Returns the account the session belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`AvitoError`] on transport failure or a failed response.
    pub async fn get_account_self(&self) -> Result<Account, AvitoError> {
        self.get_json("core/v1/accounts/self", &[], "account").await
    }

    /// # Errors
    ///
    /// Returns [`AvitoError`] on transport failure or a failed response.
    pub async fn get_balance(&self, user_id: u64) -> Result<Balance, AvitoError> {
        self.get_json(
            &format!("core/v1/accounts/{user_id}/balance/"),
            &[],
            "balance",
        )
        .await
    }

    /// # Errors
    ///
    /// Returns [`AvitoError`] on transport failure or a failed response.
    pub async fn get_rating_info(&self) -> Result<RatingInfo, AvitoError> {
        self.get_json("ratings/v1/info", &[], "rating info").await
    }
}
