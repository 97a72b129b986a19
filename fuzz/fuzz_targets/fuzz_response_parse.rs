#![no_main]

use cursusdb_wire::Response;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|line: &str| {
    let response = Response::parse(line);
    assert_eq!(response.as_str(), line);
    assert!(line.ends_with(response.payload()));
    if response.is_success() {
        assert!(line.starts_with("0 "));
    }
});
