use super::FeeClaimApi;
use crate::errors::ServiceError;
use async_trait::async_trait;
use reqwest::Client;
use solana_sdk::pubkey::Pubkey;
use std::time::Duration;

const COLLECT_CREATOR_FEE: &str = "collectCreatorFee";

/// Client for the PumpPortal local-transaction endpoint. Returns the raw
/// unsigned transaction bytes for the caller to sign.
#[derive(Clone)]
pub struct PumpPortalClient {
    client: Client,
    url: String,
    priority_fee_sol: f64,
}

impl PumpPortalClient {
    pub fn new(url: String, priority_fee_sol: f64, timeout_secs: u64) -> eyre::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url,
            priority_fee_sol,
        })
    }
}

#[async_trait]
impl FeeClaimApi for PumpPortalClient {
    async fn request_claim_transaction(&self, public_key: &Pubkey) -> Result<Vec<u8>, ServiceError> {
        tracing::debug!(url = %self.url, priority_fee = self.priority_fee_sol, "Requesting claim transaction");

        let form = [
            ("publicKey", public_key.to_string()),
            ("action", COLLECT_CREATOR_FEE.to_string()),
            ("priorityFee", self.priority_fee_sol.to_string()),
        ];

        let response = self.client.post(&self.url).form(&form).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(ServiceError::malformed("empty claim transaction body"));
        }

        Ok(bytes.to_vec())
    }
}
