//! Safe SQL builder: identifiers from code only, values as parameters.

mod builder;
pub mod filter;
pub mod params;
pub use builder::*;
pub use filter::{Column, Filter};
pub use params::*;
