pub mod consistency;
pub mod document;

pub use consistency::{check_consistency, ConsistencyFinding};
pub use document::{section_requirements, strict_mode_check, validate};
