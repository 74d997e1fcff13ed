pub mod fixtures;
pub mod mocks;

#[allow(unused_imports)]
pub use fixtures::{ORIGIN, asset, config, navigate, url};
#[allow(unused_imports)]
pub use mocks::{FailingPutStore, MockFetcher};
