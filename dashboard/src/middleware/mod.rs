// ==============================================================================
// middleware/mod.rs - Dashboard Request Extractors
// ==============================================================================
// Description: Session identification for dashboard event handlers
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

pub mod session;

pub use session::{DashboardSession, SESSION_HEADER};
