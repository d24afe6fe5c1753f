//! Operator-facing adapters: recorded session scripts in, host deliveries out.

pub mod csv;
