// CardioRisk Domain
// This crate contains the business logic for cardiovascular risk screening

// Services that implement business logic
pub mod services;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Re-export the model module from cardio_risk_data for convenience
pub use cardio_risk_data::model;

// Testing utilities - only available with mock feature
#[cfg(any(test, feature = "mock"))]
pub mod testing;
