// ==============================================================================
// lib.rs - Proteomics Processor Library
// ==============================================================================
// Description: Library interface for the volcano dashboard's data pipeline
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

pub mod models;
pub mod dataset;
pub mod validator;
pub mod classifier;
pub mod extractor;
pub mod literature;
pub mod presenter;
pub mod figures;
