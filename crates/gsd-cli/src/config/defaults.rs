use std::path::PathBuf;

/// File name looked up in the working directory when --config is absent.
pub const CONFIG_FILE: &str = "gsd.json";

pub fn default_path() -> PathBuf {
    PathBuf::from("./")
}

pub fn default_out_dir() -> PathBuf {
    PathBuf::from("_book")
}

pub fn default_addr() -> String {
    "localhost:3000".to_string()
}

pub fn default_open() -> bool {
    true
}

pub fn default_debounce_ms() -> u64 {
    100
}
