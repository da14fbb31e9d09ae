use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Rxtract";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is not set
pub fn default_log_filter() -> String {
    format!("{}=info", env!("CARGO_PKG_NAME"))
}

/// Get the application data directory
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Rxtract")
}

/// Get the default database path
pub fn database_path() -> PathBuf {
    app_data_dir().join("rxtract.db")
}
