pub mod business_id;
pub mod capacity;
pub mod cutoff;
pub mod overlap;
pub mod override_ledger;
pub mod oversight;
pub mod registry;
pub mod relationship;
