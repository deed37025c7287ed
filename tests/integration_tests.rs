use std::sync::Mutex;

/// Serializes tests that read or write `LSHDUPE_*` environment variables.
pub static ENV_MUTEX: Mutex<()> = Mutex::new(());

mod integration {
    mod cli_tests;
    mod config_tests;
    mod delete_tests;
    mod fixtures;
    mod report_tests;
    mod scan_tests;
}
