pub mod origin;

pub use origin::{enforce_origin, OriginPolicy};
