//! Fleet startup.
//!
//! Peers are started page by page: every slot of a page is launched
//! concurrently, the page is awaited as a whole, and only then does the next
//! page start. This keeps at most one page of dials and handshakes in flight.

mod error;
mod launcher;
mod orchestrator;
mod pages;
mod ports;

pub use error::OrchestratorError;
pub use launcher::{NetworkLauncher, PeerLauncher};
pub use orchestrator::{
    ConnectReport, DEFAULT_PAGE_SIZE, DEFAULT_SETTLE, Orchestrator, OrchestratorConfig,
};
pub use pages::plan_pages;
pub use ports::{DEFAULT_BASE_PORT, DEFAULT_MAX_PORT, PortAllocator};
