pub mod autoplay;
pub mod reports;
pub mod scenarios;
pub mod seeds;
pub mod tester;

pub use scenarios::{Scenario, run_script};
pub use seeds::resolve_seed_inputs;
pub use tester::*;
