pub mod assessment;
pub mod health;
pub mod predict;

// Tests module
#[cfg(test)]
mod tests;

// Re-export handlers for easier imports
pub use assessment::create_assessment;
pub use health::health_check;
pub use predict::{index, predict};
