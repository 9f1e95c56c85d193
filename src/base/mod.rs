//! Base types and error handling.
//!
//! Provides foundational types shared by the request layer:
//! - [`NetError`]: the crate-wide error taxonomy
//! - [`LoadState`]: observable request loading states

pub mod loadstate;
pub mod neterror;

pub use loadstate::LoadState;
pub use neterror::NetError;
