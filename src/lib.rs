//! recharge-ring: simulate mobile-data usage against a recharge plan.

pub mod notify;
pub mod plan;
pub mod report;
pub mod tui;
pub mod usage;
