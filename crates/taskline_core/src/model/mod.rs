//! Planner domain model.
//!
//! # Responsibility
//! - Define the Event -> Task -> Todo hierarchy, the Sign resource and
//!   user accounts.
//! - Provide shared value types (`TimeSpan`, `Status`) used across services.
//!
//! # Invariants
//! - Every record is identified by a stable v4 UUID.
//! - Instants are Unix epoch milliseconds.
//! - Time-range containment is enforced by services, not by these types.

pub mod event;
pub mod sign;
pub mod span;
pub mod status;
pub mod task;
pub mod todo;
pub mod user;
