pub mod calc;
pub mod classboard;
pub mod controller;
pub mod core;
pub mod queue;
pub mod stats;
