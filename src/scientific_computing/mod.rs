pub mod link_budget;
pub mod statistics;
