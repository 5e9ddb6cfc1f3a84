// Public entities for the CardioRisk API
// This module contains data structures that are shared across the application boundary

// Screening requests and responses
pub mod assessment;

// Common entities for error handling
pub mod common;
