use crate::domain::token::TokenKind;
use crate::error::Result;
use ethers_core::types::{Address, H160, H256};
use hex_literal::hex;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Deployed contract addresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractAddresses {
    pub user_registry: Address,
    /// Shared smart-wallet contract; user wallets are separate instances.
    pub smart_wallet: Address,
    pub wallet_factory: Address,
    pub smart_wallet_implementation: Address,
    pub payment_processor: Address,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAddresses {
    pub usdc: Address,
    pub usdt: Address,
    /// Not deployed on every network.
    #[serde(default)]
    pub weth: Option<Address>,
}

/// Network, contract and price feed settings.
///
/// Defaults target the Mantle Sepolia testnet deployment. Any field can be
/// overridden from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chain_id: u64,
    pub network: String,
    pub rpc_url: String,
    pub explorer_url: String,
    pub contracts: ContractAddresses,
    pub tokens: TokenAddresses,
    pub price_api_url: String,
    pub price_cache_ttl_secs: u64,
}

const USER_REGISTRY: Address = H160(hex!("F02DDa491A91C3De2686C33f5e04bcE906981cdF"));
const SMART_WALLET: Address = H160(hex!("18ab621F671e5c4943365A5eF5B5f1bDE24F9CBf"));
const WALLET_FACTORY: Address = H160(hex!("b3c60d75d0528D223E32772035Bf9cB1ac48A263"));
const SMART_WALLET_IMPLEMENTATION: Address =
    H160(hex!("72F8d4d7Dd9A4274a8b7Bf436C20b66D3a104b37"));
const PAYMENT_PROCESSOR: Address = H160(hex!("0B82c9b2c8E9F513E18B4F12318d6FA3a3ee7864"));
const USDC: Address = H160(hex!("Acab8129E2cE587fD203FD770ec9ECAFA2C88080"));
const USDT: Address = H160(hex!("201EBa5CC46D216Ce6DC03F6a759e8E766e956aE"));

impl Default for Config {
    fn default() -> Self {
        Self {
            chain_id: 5003,
            network: "Mantle Sepolia Testnet".to_string(),
            rpc_url: "https://rpc.sepolia.mantle.xyz".to_string(),
            explorer_url: "https://explorer.sepolia.mantle.xyz".to_string(),
            contracts: ContractAddresses {
                user_registry: USER_REGISTRY,
                smart_wallet: SMART_WALLET,
                wallet_factory: WALLET_FACTORY,
                smart_wallet_implementation: SMART_WALLET_IMPLEMENTATION,
                payment_processor: PAYMENT_PROCESSOR,
            },
            tokens: TokenAddresses {
                usdc: USDC,
                usdt: USDT,
                weth: None,
            },
            price_api_url: "https://coins.llama.fi".to_string(),
            price_cache_ttl_secs: 60,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// On-chain address of a token; the zero address for the native currency.
    ///
    /// `None` when the token is not deployed on the configured network.
    pub fn token_address(&self, token: TokenKind) -> Option<Address> {
        match token {
            TokenKind::Mnt => Some(Address::zero()),
            TokenKind::Usdc => Some(self.tokens.usdc),
            TokenKind::Usdt => Some(self.tokens.usdt),
            TokenKind::Weth => self.tokens.weth,
        }
    }

    /// Tokens deployed on the configured network, native first.
    pub fn supported_tokens(&self) -> Vec<TokenKind> {
        TokenKind::ALL
            .into_iter()
            .filter(|kind| self.token_address(*kind).is_some())
            .collect()
    }

    pub fn token_by_address(&self, address: Address) -> Option<TokenKind> {
        TokenKind::ALL
            .into_iter()
            .find(|kind| self.token_address(*kind) == Some(address))
    }

    pub fn explorer_tx_url(&self, tx: &H256) -> String {
        format!("{}/tx/{tx:#x}", self.explorer_url.trim_end_matches('/'))
    }

    pub fn explorer_address_url(&self, address: &Address) -> String {
        format!("{}/address/{address:#x}", self.explorer_url.trim_end_matches('/'))
    }
}
