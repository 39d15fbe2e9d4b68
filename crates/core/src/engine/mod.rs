//! Type-resolution and override-equivalence engine.
//!
//! Stages, leaves first:
//!
//! - [`context`] - generic substitution context of every ancestor
//! - [`comparator`] - erasure, subsignature and override-equivalence
//! - [`members`] - member methods of every type in the lattice
//! - [`partition`] - override-equivalence classes of the root's members
//! - [`synthesis`] - one overriding signature per class
//! - [`feasibility`] - conflicts that rule out any concrete subtype

pub mod comparator;
pub mod context;
pub mod feasibility;
pub mod members;
pub mod partition;
pub mod synthesis;

pub use comparator::{
    SignatureComparator, erase, has_raw_parameter_type, is_raw_type, names_of, render,
    render_type_param, render_type_params,
};
pub use context::{ContextStore, GenericContext, substitute};
pub use feasibility::FeasibilityChecker;
pub use members::MemberResolver;
pub use partition::{EquivalenceClass, partition};
pub use synthesis::{ReturnDefault, SignatureSynthesizer, SynthesizedMethod};
