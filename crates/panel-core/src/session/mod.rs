//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: the immutable `Session` value and its transitions
//!
//! # Usage
//!
//! ```ignore
//! use panel_core::session::{Session, SessionStatus};
//! ```

mod model;

pub use model::{Session, SessionStatus};
