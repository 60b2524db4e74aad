//! Transport adapters. HTTP framing belongs to an external layer; the CSV
//! interfaces here serve the development harness and reporting.

pub mod csv;
