//! The compression module ties the codec together.
//!
//! Compression happens in the following steps:
//! - Frequency count: how often each byte value occurs in the input.
//! - Tree build: greedy merge of the two lightest nodes until one root remains.
//! - Code table: walk the tree, 0 for left and 1 for right, to get every symbol's code.
//! - Packing: write the header (magic, version, symbol count, tree), then every symbol's code.
//!
//! Decompression reads the header, rebuilds the tree, and walks it one bit at a time until the
//! declared number of symbols has been emitted. The padding in the final byte is never decoded.
//!
//! Both directions are single threaded and hold no shared state.
//!

pub mod artifact;
pub mod compress;
pub mod decompress;

pub use artifact::{CompressedArtifact, Header};
pub use compress::{compress, compress_bytes, compress_file, Encoder};
pub use decompress::{decompress, decompress_bytes, decompress_file, test_file, Decoder};
