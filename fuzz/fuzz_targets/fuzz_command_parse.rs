//! Fuzz target: `Command::parse`
//!
//! Arbitrary request text must either be rejected with a typed error or
//! decode to a command whose encoding parses back to itself.
//!
//! cargo fuzz run fuzz_command_parse

#![no_main]

use layoutctl::rpc::command::Command;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let request = String::from_utf8_lossy(data);
    if let Ok(cmd) = Command::parse(&request) {
        let encoded = cmd.to_string();
        assert_eq!(Command::parse(&encoded), Ok(cmd), "re-encoding changed '{request}'");
    }
});
