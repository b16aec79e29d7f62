//! EIP-712 domain separators for Orderly Network.
//!
//! Every signable Orderly operation is scoped by the same
//! `{name: "Orderly", version: "1", chainId, verifyingContract}` domain.
//! Only the verifying contract varies, and how it is chosen depends on the
//! operation: registration and key management sign against a fixed ledger
//! address, withdrawals against the settlement contract of the active
//! network.

use alloy_primitives::{address, Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Domain name shared by all Orderly typed messages.
pub const DOMAIN_NAME: &str = "Orderly";

/// Domain version shared by all Orderly typed messages.
pub const DOMAIN_VERSION: &str = "1";

/// Ledger verifying contract used for registration and Orderly key messages.
pub const LEDGER_VERIFYING_CONTRACT: Address = address!("CcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC");

/// Settlement verifying contract for withdrawals on mainnet.
pub const MAINNET_WITHDRAW_VERIFYING_CONTRACT: Address =
    address!("6F7a338F2aA472838dEFD3283eB360d4Dff5D203");

/// Settlement verifying contract for withdrawals on testnet.
pub const TESTNET_WITHDRAW_VERIFYING_CONTRACT: Address =
    address!("1826B75e2ef249173FC735149AE4B8e9ea10abff");

/// Network the client operates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    Mainnet,
    #[default]
    Testnet,
}

impl NetworkMode {
    /// Default REST endpoint for this network.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            NetworkMode::Mainnet => "https://api-evm.orderly.org",
            NetworkMode::Testnet => "https://testnet-api-evm.orderly.org",
        }
    }
}

impl std::fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkMode::Mainnet => write!(f, "mainnet"),
            NetworkMode::Testnet => write!(f, "testnet"),
        }
    }
}

impl std::str::FromStr for NetworkMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(NetworkMode::Mainnet),
            "testnet" => Ok(NetworkMode::Testnet),
            other => Err(Error::Config {
                message: format!("Unknown network '{}', expected mainnet or testnet", other),
            }),
        }
    }
}

/// Signable operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Registration,
    AddOrderlyKey,
    Withdraw,
}

impl OperationKind {
    /// EIP-712 primary type name.
    pub fn primary_type(&self) -> &'static str {
        match self {
            OperationKind::Registration => "Registration",
            OperationKind::AddOrderlyKey => "AddOrderlyKey",
            OperationKind::Withdraw => "Withdraw",
        }
    }

    /// How this operation's verifying contract is chosen.
    pub fn contract_resolution(&self) -> ContractResolution {
        match self {
            OperationKind::Registration | OperationKind::AddOrderlyKey => {
                ContractResolution::Fixed(LEDGER_VERIFYING_CONTRACT)
            }
            OperationKind::Withdraw => ContractResolution::ByNetwork {
                mainnet: MAINNET_WITHDRAW_VERIFYING_CONTRACT,
                testnet: TESTNET_WITHDRAW_VERIFYING_CONTRACT,
            },
        }
    }
}

/// Strategy for choosing a verifying contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractResolution {
    /// The same contract regardless of network.
    Fixed(Address),
    /// One contract per network.
    ByNetwork { mainnet: Address, testnet: Address },
}

impl ContractResolution {
    pub fn resolve(&self, network: NetworkMode) -> Address {
        match (self, network) {
            (ContractResolution::Fixed(address), _) => *address,
            (ContractResolution::ByNetwork { mainnet, .. }, NetworkMode::Mainnet) => *mainnet,
            (ContractResolution::ByNetwork { testnet, .. }, NetworkMode::Testnet) => *testnet,
        }
    }
}

/// Resolve the verifying contract for `kind` under `network`.
///
/// Called on every message build; the result is never cached.
pub fn resolve_verifying_contract(kind: OperationKind, network: NetworkMode) -> Address {
    kind.contract_resolution().resolve(network)
}

/// EIP-712 domain separator for Orderly typed messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainSeparator {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl DomainSeparator {
    /// Orderly domain for `chain_id` and `verifying_contract`.
    pub fn orderly(chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            name: DOMAIN_NAME.to_string(),
            version: DOMAIN_VERSION.to_string(),
            chain_id,
            verifying_contract,
        }
    }

    /// Domain for `kind`, resolving its verifying contract under `network`.
    pub fn for_operation(kind: OperationKind, chain_id: u64, network: NetworkMode) -> Self {
        Self::orderly(chain_id, resolve_verifying_contract(kind, network))
    }

    /// Compute the EIP-712 domain separator hash.
    pub fn separator(&self) -> B256 {
        alloy_sol_types::Eip712Domain::new(
            Some(self.name.clone().into()),
            Some(self.version.clone().into()),
            Some(U256::from(self.chain_id)),
            Some(self.verifying_contract),
            None,
        )
        .separator()
    }
}
