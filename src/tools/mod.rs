//! The tools module provides the helpers around the codec.
//!
//! The tools are:
//! - cli: Command line interface for huffpack.
//! - freq_count: Byte frequency count of the input.
//! - options: Run time options set by the command line.
//! - report: Byte counts of a finished compress or decompress.
//!
pub mod cli;
pub mod freq_count;
pub mod options;
pub mod report;
