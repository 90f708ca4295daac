//! Benchmark utilities for teleport.
//!
//! - **Microbenchmarks**: single broker operations (emit, receive, replay, join)
//! - **Scenario benchmarks**: many channels and joins fed in a shuffled order
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p teleport_bench
//!
//! # Run specific benchmark group
//! cargo bench -p teleport_bench -- emit
//! ```
//!
//! Results are written to `target/criterion/` with HTML reports for visualization.

pub mod fixtures;
pub mod scenarios;
