//! Trestle Core Types and Definitions
//!
//! This crate provides the foundational types for the Trestle railroad
//! diagram engine. It includes:
//!
//! - **Components**: The rendering-independent diagram model ([`component`] module)
//! - **Options**: Session options mutated by notation pragmas ([`options`] module)
//! - **Host**: Collaborator traits for reference resolution and link
//!   classification ([`host`] module)

pub mod component;
pub mod host;
pub mod options;

pub use component::{Component, LinkTarget};
pub use host::{Host, MapHost, NullHost};
pub use options::{MultipleChoiceMode, SessionOptions, TerminusStyle};
