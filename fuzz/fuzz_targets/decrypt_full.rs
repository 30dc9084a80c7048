#![no_main]

use libfuzzer_sys::fuzz_target;
use once_cell::sync::Lazy;
use wallet_ecies::{EciesEngine, KeyExchange, KeyPair, SoftwareEngine};

static KEYPAIR: Lazy<KeyPair> = Lazy::new(|| {
    SoftwareEngine::new()
        .generate_keypair()
        .expect("keygen")
});

fuzz_target!(|data: &[u8]| {
    let kx = KeyExchange::new();
    let kp = &*KEYPAIR;

    // Binary path: parse + ECDH + MAC + CBC.
    let _ = kx.decrypt_binary(data, kp.secret());

    // Hex path, including the UTF-8 check.
    if let Ok(text) = core::str::from_utf8(data) {
        let _ = kx.decrypt_with_private_key(text, kp.secret());
    }
});
