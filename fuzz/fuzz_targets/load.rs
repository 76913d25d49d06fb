#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(item) = cbor_tree::load(data) {
        _ = cbor_tree::encode::emit(&item);
    }
});
