pub mod rules;
pub mod sample;
pub mod scanner;
pub mod validate;

pub use rules::{ExtractError, ExtractionRule, FilenameRule, SampleMeta, SidecarRule};
pub use sample::{Corpus, Sample};
pub use scanner::{scan, Scanned};
pub use validate::{validate, ValidationError, Violation};
