//! Repository traits for document operations.

pub mod notes;

pub use notes::NoteRepo;
