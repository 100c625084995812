pub mod merge;
pub mod writer;

pub use merge::merge;
pub use writer::{read, write, MANIFEST_HEADER};
