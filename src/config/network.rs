//! Named networks the relay can target.
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum NetworkName {
    GensynTestnet,
    Sepolia,
    BaseSepolia,
}

impl NetworkName {
    pub fn chain_id(&self) -> u64 {
        match self {
            NetworkName::GensynTestnet => 685_685,
            NetworkName::Sepolia => 11_155_111,
            NetworkName::BaseSepolia => 84_532,
        }
    }

    /// Host serving both node and bundler JSON-RPC for this network.
    pub fn alchemy_host(&self) -> &'static str {
        match self {
            NetworkName::GensynTestnet => "gensyn-testnet.g.alchemy.com",
            NetworkName::Sepolia => "eth-sepolia.g.alchemy.com",
            NetworkName::BaseSepolia => "base-sepolia.g.alchemy.com",
        }
    }

    pub fn rpc_url(&self, api_key: &str) -> String {
        format!("https://{}/v2/{}", self.alchemy_host(), api_key)
    }
}
