pub mod guards;
pub mod metrics;

#[cfg(test)]
mod tests;

pub use guards::observed_cast_vote;
pub use metrics::GovernanceMetrics;
