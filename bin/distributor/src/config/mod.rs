use crate::lamports::sol_to_lamports;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_FEE_CLAIM_URL: &str = "https://pumpportal.fun/api/trade-local";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributorConfig {
    #[serde(default)]
    pub wallet: WalletConfig,
    pub rpc: RpcConfig,
    pub fee_claim: FeeClaimConfig,
    pub distribution: DistributionConfig,
}

/// Public half of the wallet. The private key is only read from the
/// `PRIVATE_KEY` environment variable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletConfig {
    pub public_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeClaimConfig {
    pub url: String,
    pub priority_fee_sol: f64,
    pub timeout_secs: u64,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionConfig {
    pub token_mint: String,
    pub interval_secs: u64,
    pub settle_delay_secs: u64,
    pub error_backoff_secs: u64,
    /// SOL kept in the wallet for fees
    pub reserve_sol: f64,
    pub min_transfer_lamports: u64,
    pub progress_every: usize,
    pub blockhash_max_age_secs: u64,
    #[serde(default)]
    pub resolve_owners: bool,
    #[serde(default)]
    pub dry_run: bool,
}

fn default_true() -> bool {
    true
}

impl DistributorConfig {
    pub async fn load_from_file(path: &Path) -> eyre::Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Apply environment variable overrides on top of file values
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("RPC_URL") {
            self.rpc.url = v;
        }
        if let Ok(v) = std::env::var("TOKEN_MINT") {
            self.distribution.token_mint = v;
        }
        if let Ok(v) = std::env::var("WALLET_PUBLIC_KEY") {
            self.wallet.public_key = Some(v);
        }
        if let Ok(v) = std::env::var("FEE_CLAIM_URL") {
            self.fee_claim.url = v;
        }
        if let Some(v) = env_parse("DISTRIBUTION_INTERVAL_SECS") {
            self.distribution.interval_secs = v;
        }
        if let Some(v) = env_parse("PRIORITY_FEE_SOL") {
            self.fee_claim.priority_fee_sol = v;
        }
        if let Some(v) = env_parse("RESERVE_SOL") {
            self.distribution.reserve_sol = v;
        }
        if let Some(v) = env_parse("MIN_TRANSFER_LAMPORTS") {
            self.distribution.min_transfer_lamports = v;
        }
        if let Some(v) = env_parse("DRY_RUN") {
            self.distribution.dry_run = v;
        }
        self
    }

    pub fn validate(&self) -> eyre::Result<()> {
        self.token_mint()?;
        self.expected_public_key()?;

        for (name, url) in [("rpc.url", &self.rpc.url), ("fee_claim.url", &self.fee_claim.url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                eyre::bail!("{} must be an http(s) URL, got {:?}", name, url);
            }
        }

        if self.distribution.interval_secs == 0 {
            eyre::bail!("distribution.interval_secs must be greater than zero");
        }
        if !self.distribution.reserve_sol.is_finite() || self.distribution.reserve_sol < 0.0 {
            eyre::bail!("distribution.reserve_sol must be a non-negative number");
        }
        if !self.fee_claim.priority_fee_sol.is_finite() || self.fee_claim.priority_fee_sol < 0.0 {
            eyre::bail!("fee_claim.priority_fee_sol must be a non-negative number");
        }
        if self.distribution.progress_every == 0 {
            eyre::bail!("distribution.progress_every must be greater than zero");
        }

        Ok(())
    }

    pub fn token_mint(&self) -> eyre::Result<Pubkey> {
        Pubkey::from_str(&self.distribution.token_mint).map_err(|e| {
            eyre::eyre!("Invalid token mint {:?}: {}", self.distribution.token_mint, e)
        })
    }

    pub fn expected_public_key(&self) -> eyre::Result<Option<Pubkey>> {
        self.wallet
            .public_key
            .as_deref()
            .map(|key| {
                Pubkey::from_str(key)
                    .map_err(|e| eyre::eyre!("Invalid wallet public key {:?}: {}", key, e))
            })
            .transpose()
    }

    pub fn reserve_lamports(&self) -> u64 {
        sol_to_lamports(self.distribution.reserve_sol)
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "Ignoring unparsable environment override");
            None
        }
    }
}

impl Default for DistributorConfig {
    fn default() -> Self {
        Self {
            wallet: WalletConfig::default(),
            rpc: RpcConfig {
                url: "https://api.mainnet-beta.solana.com".to_string(),
                timeout_secs: 30,
            },
            fee_claim: FeeClaimConfig {
                url: DEFAULT_FEE_CLAIM_URL.to_string(),
                priority_fee_sol: 0.000001,
                timeout_secs: 30,
                enabled: true,
            },
            distribution: DistributionConfig {
                token_mint: String::new(),
                interval_secs: 15 * 60,
                settle_delay_secs: 5,
                error_backoff_secs: 60,
                reserve_sol: 0.01,
                min_transfer_lamports: 5_000,
                progress_every: 10,
                blockhash_max_age_secs: 30,
                resolve_owners: false,
                dry_run: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> DistributorConfig {
        let mut config = DistributorConfig::default();
        config.distribution.token_mint = Pubkey::new_unique().to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = DistributorConfig::default();
        assert_eq!(config.distribution.interval_secs, 900);
        assert_eq!(config.distribution.min_transfer_lamports, 5_000);
        assert_eq!(config.reserve_lamports(), 10_000_000);
        assert_eq!(config.fee_claim.url, DEFAULT_FEE_CLAIM_URL);
    }

    #[test]
    fn test_default_requires_mint() {
        assert!(DistributorConfig::default().validate().is_err());
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_interval() {
        let mut config = valid_config();
        config.distribution.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_reserve() {
        let mut config = valid_config();
        config.distribution.reserve_sol = -0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_public_key() {
        let mut config = valid_config();
        config.wallet.public_key = Some("not-a-key".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_http_rpc() {
        let mut config = valid_config();
        config.rpc.url = "wss://api.mainnet-beta.solana.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_json_with_optional_sections() {
        let mint = Pubkey::new_unique();
        let json = format!(
            r#"{{
                "rpc": {{ "url": "http://localhost:8899", "timeout_secs": 10 }},
                "fee_claim": {{
                    "url": "http://localhost:9000/api/trade-local",
                    "priority_fee_sol": 0.00001,
                    "timeout_secs": 10
                }},
                "distribution": {{
                    "token_mint": "{}",
                    "interval_secs": 60,
                    "settle_delay_secs": 1,
                    "error_backoff_secs": 5,
                    "reserve_sol": 0.02,
                    "min_transfer_lamports": 5000,
                    "progress_every": 10,
                    "blockhash_max_age_secs": 30
                }}
            }}"#,
            mint
        );

        let config: DistributorConfig = serde_json::from_str(&json).unwrap();
        assert!(config.wallet.public_key.is_none());
        assert!(config.fee_claim.enabled);
        assert!(!config.distribution.dry_run);
        assert!(!config.distribution.resolve_owners);
        assert_eq!(config.token_mint().unwrap(), mint);
        assert_eq!(config.reserve_lamports(), 20_000_000);
        assert!(config.validate().is_ok());
    }
}
