#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

//! # ZenMat 🧘
//!
//! Application core for the ZenMat smart yoga mat companion app.
//!
//! The crate owns the one piece of shared mutable state in the app, the mat's
//! connection status, and exposes every screen as a pure view model over that
//! state and a static product and sound catalog.
//!
//! ## Connectivity
//!
//! No real Bluetooth stack is involved. A [`SimulatedProvider`] stands in for the
//! mat: connecting takes about two seconds and succeeds roughly nine times in ten,
//! disconnecting takes about one second and always succeeds. The provider sits
//! behind the [`ConnectivityProvider`] trait so a transport-backed implementation
//! can replace it without touching the screens.
//!
//! [`Connectivity`] tracks the status and lets the most recently issued request
//! decide the outcome. Earlier requests that resolve later are discarded as
//! [`ZenMatError::Superseded`], and the status never stays stuck at
//! [`ConnectionStatus::Connecting`].
//!
//! ## Screens
//!
//! | Tab     | Screen                        |
//! |---------|-------------------------------|
//! | Home    | [`screens::HomeScreen`]       |
//! | Control | [`screens::ControlScreen`]    |
//! | Sounds  | [`screens::SoundsScreen`]     |
//! | Shop    | [`screens::ProductsScreen`]   |
//! | Stats   | [`screens::PlaceholderScreen`] |
//! | Updates | [`screens::PlaceholderScreen`] |
//!
//! ## Quick Start
//!
//! ```no_run
//! use zenmat::{Connectivity, SimulationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mat = Connectivity::simulated(SimulationConfig::default())?;
//!
//!     match mat.connect().await {
//!         Ok(()) => println!("connected, battery {}%", mat.telemetry().await?.battery_percent),
//!         Err(e) => println!("{}", e.user_message()),
//!     }
//!
//!     mat.disconnect().await?;
//!     Ok(())
//! }
//! ```

/// Application root and tab navigation
pub mod app;
/// Static product, sound and feature catalog
pub mod catalog;
/// Connection state container
pub mod connectivity;
/// Error types and handling
pub mod error;
/// Mat connectivity providers
pub mod provider;
/// Screen view models
pub mod screens;
/// Type definitions and data structures
pub mod types;

// Re-export the main types for convenient usage
pub use app::{Screen, ScreenView, Tab, ZenMatApp};
pub use connectivity::{Connectivity, OperationKind, PendingOperation, StatusSubscription};
pub use error::{Result, ZenMatError};
pub use provider::{ConnectivityProvider, SimulatedProvider};
pub use types::{
    ConnectionState, ConnectionStatus, MatTelemetry, ProviderKind, SignalStrength,
    SimulationConfig,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Message recorded when a connection attempt fails
pub const CONNECTION_FAILED_MESSAGE: &str = "Connection failed. Please try again.";
