pub mod assignments;
pub mod businesses;
pub mod common;
pub mod overrides;
pub mod oversight_actions;
pub mod qualifiers;
