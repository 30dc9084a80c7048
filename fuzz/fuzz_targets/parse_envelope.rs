#![no_main]

use libfuzzer_sys::fuzz_target;
use wallet_ecies::wire;

fuzz_target!(|data: &[u8]| {
    if let Ok(env) = wire::parse(data) {
        assert_eq!(wire::serialize(&env), data);
        assert!(wire::inspect(data).is_ok());
    }
    let _ = wire::from_hex(&String::from_utf8_lossy(data));
});
