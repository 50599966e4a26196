//! The huffman module turns symbol frequencies into a prefix code, and gives the decoder the
//! tree it walks to turn bits back into symbols.
//!
//! Two pieces:
//! - tree: the arena-backed Huffman tree, the greedy builder, and the tree header format.
//! - code_table: symbol to code lookup derived from a tree.
//!
//! The tree is static for one input. It is built once per compress call (or read once per
//! decompress call) and never changed afterwards, so nothing here needs to be shared between
//! threads. Every call gets its own tree.
//!

pub mod code_table;
pub mod tree;

pub use code_table::{Code, CodeTable};
pub use tree::{HuffmanTree, Node};
