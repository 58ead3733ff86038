//! Call encoding for the coordinator contract.
//!
//! Only the functions the relayer invokes are declared. Encoding goes through
//! `sol!` generated call types so selectors, padding and dynamic offsets follow
//! the Solidity ABI exactly.
use alloy::{
    primitives::{Address, Bytes, U256},
    sol,
    sol_types::{self, SolCall},
};

sol! {
    interface ICoordinator {
        function registerPeer(string peerId) external;
        function submitWinners(uint256 roundNumber, string[] winners) external;
        function getPeerId(address eoa) external view returns (string);
    }
}

pub fn encode_register_peer(peer_id: &str) -> Bytes {
    ICoordinator::registerPeerCall {
        peerId: peer_id.to_string(),
    }
    .abi_encode()
    .into()
}

pub fn encode_submit_winners(round_number: U256, winners: &[String]) -> Bytes {
    ICoordinator::submitWinnersCall {
        roundNumber: round_number,
        winners: winners.to_vec(),
    }
    .abi_encode()
    .into()
}

pub fn encode_get_peer_id(account: Address) -> Bytes {
    ICoordinator::getPeerIdCall { eoa: account }
        .abi_encode()
        .into()
}

pub fn decode_get_peer_id(data: &[u8]) -> Result<String, sol_types::Error> {
    ICoordinator::getPeerIdCall::abi_decode_returns(data, true).map(|r| r._0)
}
