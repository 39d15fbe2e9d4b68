pub mod declarations;
pub mod types;

pub use declarations::*;
pub use types::*;
