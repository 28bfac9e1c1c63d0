//! `stockcast-core`: shared building blocks.
//!
//! Strongly-typed identifiers and the domain error model. No IO lives here.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::{Entity, position_of};
pub use error::{DomainError, DomainResult};
pub use id::{InflowId, OutflowId, ProductId};
