//! ERC-4337 and Modular Account v2 constants.

use alloy::primitives::{address, Address};

/// EntryPoint v0.7, deployed at the same address on every supported chain.
pub const ENTRY_POINT_V07_ADDRESS: Address = address!("0000000071727De22E5E9d8BAf0edAc6f37da032");

/// Modular Account v2 factory.
pub const MODULAR_ACCOUNT_V2_FACTORY_ADDRESS: Address =
    address!("00000000000017c61b5bEe81050EC8eFc9c6fecd");

/// Salt used for the counterfactual account address of an owner.
pub const DEFAULT_ACCOUNT_SALT: u64 = 0;

/// Nonce key selecting the fallback (owner) validation with global validation enabled.
pub const FALLBACK_VALIDATION_NONCE_KEY: u64 = 1;

/// Prefix for user operation signatures validated by the account's fallback signer:
/// reserved validation byte followed by the EOA signature type.
pub const FALLBACK_SIGNATURE_PREFIX: [u8; 2] = [0xff, 0x00];

/// Dummy signature passed to gas estimation. Same length as a real signature.
pub const DUMMY_USER_OPERATION_SIGNATURE: &str = "0xff00fffffffffffffffffffffffffffffff0000000000000000000000000000000007aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1c";

/// SECP256K1 signature length: 32 bytes (r) + 32 bytes (s) + 1 byte (v)
pub const SECP256K1_SIGNATURE_LENGTH: usize = 65;
