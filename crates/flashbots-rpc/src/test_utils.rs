use alloy_primitives::{hex, keccak256, Address, Signature};

/// First anvil dev account.
pub const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

pub fn init_logs() {
    let _ = env_logger::try_init_from_env(env_logger::Env::default().default_filter_or("debug"));
}

/// Recovers the address that produced an `X-Flashbots-Signature` value for `body`.
pub fn recover_header_signer(body: &[u8], header: &str) -> Address {
    let (_, sig) = header.split_once(':').unwrap();
    let sig = Signature::try_from(hex::decode(sig).unwrap().as_slice()).unwrap();
    let body_hash = hex::encode_prefixed(keccak256(body));
    sig.recover_address_from_msg(body_hash.as_bytes()).unwrap()
}
