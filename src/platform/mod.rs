//! Platform-specific helpers.
//! Hides Unix/Windows differences for the two files this tool writes besides
//! renamed copies: the log file and the config template.

mod temp;
#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

#[cfg(unix)]
pub use unix::{open_log_file_secure_append, write_config_secure_new_0600};

#[cfg(not(unix))]
pub use windows::{open_log_file_secure_append, write_config_secure_new_0600};
