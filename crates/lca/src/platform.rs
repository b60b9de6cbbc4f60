//! Host adapters for the collaborator traits.

#[cfg(feature = "browser")]
pub mod browser;

#[cfg(feature = "cli")]
pub mod cli;
