//! Shared model of Java types and the read-only type-description interface.
//!
//! # Key Traits
//!
//! - [`TypeProvider`] - Resolves ids and names to declarations
//! - [`InheritanceProvider`] - Direct supertype edges with generic arguments
//! - [`MemberProvider`] - Declared methods and constructors
//! - [`TypeSystem`] - Combines all three

pub mod error;
pub mod models;
pub mod type_system;

pub use error::{ApiError, ApiResult};
pub use models::*;
pub use type_system::{InheritanceProvider, MemberProvider, TypeProvider, TypeSystem};
