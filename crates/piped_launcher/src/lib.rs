//! # piped_launcher
//!
//! Supervision of auxiliary binaries started by piped.
//!
//! A started binary can be queried for its run state and stopped gracefully:
//! it is first asked to terminate and is force-killed only if it is still
//! running once the timeout has passed.
//!
//! # Example
//!
//! ```rust,no_run
//! use piped_launcher::run_binary;
//! use std::time::Duration;
//!
//! let helper = run_binary("kubectl", &["proxy", "--port=8001"]).unwrap();
//! assert!(helper.is_running());
//!
//! helper.graceful_stop(Duration::from_secs(5)).unwrap();
//! assert!(!helper.is_running());
//! ```

pub mod binary;
pub mod error;

pub use binary::{run_binary, RunningBinary};
pub use error::{LauncherError, LauncherResult};
