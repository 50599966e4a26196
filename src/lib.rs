//! Static Huffman compressor.
//!
//! Version 0.1.0
//!
//! Compresses a byte stream with a Huffman code built from that stream's own byte frequencies.
//! The compressed artifact is self-describing: its header carries the code tree and the number
//! of symbols encoded, so it can be decompressed with no other information.
//!
//! Basic usage to compress a file is as follows:
//!
//! `$> huffpack -z test.txt`
//!
//! This will compress the file and create the file test.txt.huf.
//! The original file will be deleted unless -k is given.
//!
//! From code, `compress_bytes` and `decompress_bytes` work on memory buffers, and
//! `compress`/`decompress` on any `Read`/`Write` pair.
//!
pub mod bitstream;
pub mod compression;
pub mod error;
pub mod huffman_coding;
pub mod tools;

pub use compression::{compress, compress_bytes, decompress, decompress_bytes};
pub use error::{HuffError, Result};
