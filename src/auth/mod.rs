// Authentication and authorization: session resolution and the role gate
pub mod capabilities;
pub mod gate;
pub mod session_resolver;

pub use capabilities::Operation;
pub use gate::{Denied, require, require_operation};
pub use session_resolver::SessionResolver;
