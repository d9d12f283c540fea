pub mod assignment;
pub mod business;
pub mod common;
pub mod justification;
pub mod oversight_action;
pub mod qualifier;
pub mod transaction;

pub use assignment::AssignmentRepository;
pub use business::BusinessRepository;
pub use common::*;
pub use qualifier::QualifierRepository;
pub use transaction::*;
