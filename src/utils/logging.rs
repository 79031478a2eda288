//! Conditional logging macros gated on a module-level `ENABLE_LOGS` flag.
//!
//! Each module that uses these defines its own flag, so noisy paths (the
//! ingestion hot loop, window counting) can be silenced without touching
//! the global filter:
//! ```rust
//! const ENABLE_LOGS: bool = true;
//!
//! use pacewatch::{log_info, log_warn};
//!
//! log_info!("logged only when ENABLE_LOGS is true");
//! ```

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
