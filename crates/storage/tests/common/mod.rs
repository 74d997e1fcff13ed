pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::{Backends, seeded_bytes};
