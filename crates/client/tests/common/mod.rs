pub mod fixtures;
pub mod mocks;

#[allow(unused_imports)]
pub use fixtures::{Harness, PNG, wait_for_view};
#[allow(unused_imports)]
pub use mocks::{FlakyBlobStore, FlakyDocStore, ScriptedMic};
