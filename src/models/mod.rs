//! Domain entities produced by the normalizers.
//!
//! Everything here is fully populated: a value of one of these types is
//! either completely normalized or was never built.

pub mod approval;
pub mod enums;
pub mod filters;
pub mod prediction;
pub mod raw;
pub mod report;
pub mod transfer;

pub use approval::*;
pub use enums::*;
pub use filters::*;
pub use prediction::*;
pub use raw::RawRecord;
pub use report::*;
pub use transfer::*;
