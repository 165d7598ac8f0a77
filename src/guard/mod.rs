//! The two session checkpoints: [`edge`] runs per request before page
//! handlers, [`layout`] gates rendering of the authenticated shell.

pub mod edge;
pub mod layout;

pub use edge::{evaluate, DenyReason, GuardDecision, SessionLookup};
pub use layout::{LayoutGuard, Navigator, RedirectSlot, Rendering, SessionQuery, SessionState};
