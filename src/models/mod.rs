// Core data models for dealflow
// These structs represent the domain entities

pub mod task;
pub mod stage;
pub mod deal;
pub mod assignment;
pub mod deal_type;

pub use task::*;
pub use stage::*;
pub use deal::*;
pub use assignment::*;
pub use deal_type::*;
