//! Normalization boundary: raw backend records in, typed entities out.
//!
//! Views never read raw records directly. Every schema variant the
//! backend has shipped is listed here, in one place, newest first.

mod approval;
mod collection;
mod error;
mod merge;
mod prediction;
pub mod resolver;
mod transfer;

pub use approval::*;
pub use collection::*;
pub use error::Rejection;
pub use merge::*;
pub use prediction::*;
pub use resolver::{resolve, resolve_id, resolve_opt, resolve_str, Resolvable};
pub use transfer::*;
