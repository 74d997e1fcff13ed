pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::{image_write, owner, store, text_write};
