use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use std::fmt;

/// Process-wide signing credential. Loaded once at startup, never mutated.
pub struct Wallet {
    keypair: Keypair,
}

impl Wallet {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Load from a base58-encoded 64-byte secret key, the format browser
    /// wallets export
    pub fn from_base58(secret: &str) -> eyre::Result<Self> {
        let bytes = bs58::decode(secret.trim())
            .into_vec()
            .map_err(|e| eyre::eyre!("Private key is not valid base58: {}", e))?;

        if bytes.len() != 64 {
            eyre::bail!("Private key must be 64 bytes, got {}", bytes.len());
        }

        #[allow(deprecated)]
        let keypair = Keypair::from_bytes(&bytes)
            .map_err(|e| eyre::eyre!("Invalid private key: {}", e))?;

        Ok(Self { keypair })
    }

    /// Fail if a configured public key does not belong to this keypair
    pub fn ensure_matches(&self, expected: &Pubkey) -> eyre::Result<()> {
        if self.pubkey() != *expected {
            eyre::bail!(
                "Configured public key {} does not match private key ({})",
                expected,
                self.pubkey()
            );
        }
        Ok(())
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("pubkey", &self.pubkey())
            .finish_non_exhaustive()
    }
}
