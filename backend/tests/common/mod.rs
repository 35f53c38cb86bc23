// Not every helper is used in every test binary
#![allow(dead_code)]

mod fake_store;
pub use fake_store::*;
mod fake_upstream;
pub use fake_upstream::*;
mod test_setup;
pub use test_setup::*;
