#![no_main]

use bytes::BytesMut;
use cursusdb_wire::protocol::decode_line;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut buf = BytesMut::from(data);

    // Several lines may arrive in a single TCP segment
    loop {
        match decode_line(&mut buf, 4096) {
            Ok(Some(line)) => {
                assert!(!line.contains('\n'));
            }
            Ok(None) | Err(_) => break,
        }
    }
});
