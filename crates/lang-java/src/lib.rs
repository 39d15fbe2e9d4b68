//! Java type universes for the implementation engine.
//!
//! - [`TypeStore`] - immutable in-memory universe implementing
//!   [`implscope_api::TypeSystem`]
//! - [`description`] - serde description format with a fluent builder
//! - [`syntax`] - parser for Java type syntax used inside descriptions
//! - [`jdk`] - JDK and `javac` discovery

pub mod description;
pub mod error;
pub mod jdk;
mod loader;
pub mod store;
pub mod syntax;

pub use description::{
    ClassDescription, ConstructorDescription, MethodDescription, TypeUniverseDescription,
};
pub use error::{DescriptionError, Result};
pub use loader::PRIMITIVES;
pub use store::{TypeStore, TypeStoreBuilder};
