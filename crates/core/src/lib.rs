//! Computes the method stubs a concrete Java subtype must declare.
//!
//! [`Implementor::analyze`] runs the whole pipeline against any
//! [`implscope_api::TypeSystem`]; the [`engine`] module exposes each stage.

pub mod config;
pub mod engine;
pub mod error;
pub mod implementor;
pub mod logging;

pub use config::SynthesisConfig;
pub use engine::{ReturnDefault, SynthesizedMethod};
pub use error::{ImplError, ImplErrorKind, Result};
pub use implementor::{ClassHeader, ConstructorDescriptor, Implementation, Implementor};
