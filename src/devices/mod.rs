// MIT License - Copyright (c) 2026 Peter Wright
// SCSGate switch platform

pub mod scenario;
pub mod switch;

pub use scenario::ScenarioSwitch;
pub use switch::Switch;
