pub mod approval;
pub mod contract;
pub mod simulator;
