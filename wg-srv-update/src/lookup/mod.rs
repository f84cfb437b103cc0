pub mod fallback;
pub mod srv;

pub use fallback::Fallback;
pub use srv::{resolve, HickorySrvSource, SrvSource};
