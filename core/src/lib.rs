pub mod digest;
pub mod error;
pub mod reconcile;
pub mod report;

#[cfg(test)]
mod tests;
