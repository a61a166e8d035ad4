//! Command implementations.
//!
//! Results go to stdout; progress and failures go through `tracing`.

pub mod admin;
pub mod assistant;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod session;

use nongsan_client::notify::Toast;
use nongsan_client::weather::WeatherError;
use nongsan_client::{ApiError, ClientError, ConfigError};
use nongsan_core::validation::ValidationError;
use thiserror::Error;
use tokio::sync::broadcast;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Client(#[from] ClientError),

    /// Shown with the Vietnamese message for the backend's code.
    #[error("{}", .0.localized())]
    Api(#[from] ApiError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Weather(#[from] WeatherError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not logged in. Run `nongsan login` first.")]
    NotLoggedIn,

    /// Some pending orders were not placed.
    #[error("{0} order(s) could not be placed; run `nongsan checkout` again to retry")]
    Incomplete(usize),
}

/// Write one line of command output.
#[allow(clippy::print_stdout)]
pub fn out(line: impl std::fmt::Display) {
    println!("{line}");
}

/// Print the toasts raised since `rx` subscribed.
pub fn drain_toasts(rx: &mut broadcast::Receiver<Toast>) {
    while let Ok(toast) = rx.try_recv() {
        out(format!("{}: {}", toast.title, toast.description));
    }
}
