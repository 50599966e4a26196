//! The bitstream module forms the I/O subsystem of the codec.
//!
//! Huffman codes are not byte aligned, so everything the compressor writes goes through a
//! BitPacker, and everything the decompressor reads comes back out of a BitUnpacker. Both
//! work most significant bit first: the first bit written is bit 7 of the first byte.
//!
//! The packer zero-pads the final byte. Padding is not self-describing, which is why the
//! artifact header records how many symbols were encoded.
//!
pub mod bitpacker;
pub mod bitunpacker;

pub use bitpacker::BitPacker;
pub use bitunpacker::BitUnpacker;
