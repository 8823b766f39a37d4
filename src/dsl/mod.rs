pub mod binding;
pub mod enumerate;
pub mod filter;
pub mod transform;

pub use binding::Binding;
pub use filter::{Filter, FilterChain};
pub use transform::{ColorParam, DirectionParam, Transform};
