#[cfg(test)]
pub mod negotiation_flow_tests;
#[cfg(test)]
pub mod utils;
#[cfg(test)]
pub mod wizard_flow_tests;
