//! The compressed artifact: a header that is enough to rebuild the tree, followed by the packed
//! Huffman bits.
//!
//! Layout (all multi-byte integers big-endian):
//! - 3 bytes  magic "HUF"
//! - 1 byte   format version '1'
//! - 8 bytes  number of symbols encoded
//! - tree     pre-order tree shape (see HuffmanTree::write_header), zero-padded to a byte
//! - payload  Huffman codes, most significant bit first, zero-padded final byte
//!
//! The symbol count is what tells the decoder where to stop. The payload's final byte may hold
//! padding bits that happen to spell out a valid code; they must never be decoded.

use std::io::{Read, Write};

use log::trace;

use super::decompress::Decoder;
use crate::bitstream::{BitPacker, BitUnpacker};
use crate::error::{HuffError, Result};
use crate::huffman_coding::HuffmanTree;

pub const MAGIC: [u8; 3] = *b"HUF";
pub const VERSION: u8 = b'1';

/// Everything the decoder needs before it can read the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Number of symbols in the original input. Never 0.
    pub symbol_count: u64,
    pub tree: HuffmanTree,
}

impl Header {
    /// Push the header onto the stream. Leaves the packer byte aligned.
    pub fn write<W: Write>(&self, bp: &mut BitPacker<W>) -> Result<()> {
        for byte in MAGIC {
            bp.out8(byte)?;
        }
        bp.out8(VERSION)?;
        bp.out64(self.symbol_count)?;
        self.tree.write_header(bp)?;
        bp.align()?;
        trace!("Header written, payload starts at {}", bp.loc());
        Ok(())
    }

    /// Read and validate a header. Leaves the unpacker at the first payload byte.
    pub fn read<R: Read>(br: &mut BitUnpacker<R>) -> Result<Self> {
        let magic = br
            .bytes(MAGIC.len())?
            .ok_or_else(|| HuffError::malformed("missing header"))?;
        if magic != MAGIC {
            return Err(HuffError::malformed("not a huffpack artifact (bad magic)"));
        }

        let version = br
            .byte()?
            .ok_or_else(|| HuffError::malformed("missing format version"))?;
        if version != VERSION {
            return Err(HuffError::malformed(format!(
                "unsupported format version {:#04x}",
                version
            )));
        }

        let symbol_count = br
            .bint(64)?
            .ok_or_else(|| HuffError::malformed("missing symbol count"))?;
        if symbol_count == 0 {
            return Err(HuffError::malformed("symbol count is zero"));
        }

        let tree = HuffmanTree::read_header(br)?;
        if br.align()? != 0 {
            return Err(HuffError::malformed("non-zero padding after the tree"));
        }
        trace!(
            "Header read: {} symbols, {} leaves, payload starts at {}",
            symbol_count,
            tree.leaf_count(),
            br.loc()
        );
        Ok(Self { symbol_count, tree })
    }
}

/// A whole artifact held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedArtifact {
    pub header: Header,
    /// Packed code bits, final byte zero-padded.
    pub payload: Vec<u8>,
}

impl CompressedArtifact {
    /// Parse an artifact from a byte source. The payload is everything after the header.
    pub fn read_from<R: Read>(source: R) -> Result<Self> {
        let mut br = BitUnpacker::new(source);
        let header = Header::read(&mut br)?;
        let mut payload = Vec::new();
        while let Some(byte) = br.byte()? {
            payload.push(byte);
        }
        Ok(Self { header, payload })
    }

    /// Write the artifact to `sink`, returning it when done.
    pub fn write_to<W: Write>(&self, sink: W) -> Result<W> {
        let mut bp = BitPacker::new(sink);
        self.header.write(&mut bp)?;
        for &byte in &self.payload {
            bp.out8(byte)?;
        }
        let (sink, _) = bp.finish()?;
        Ok(sink)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.write_to(Vec::new())
    }

    /// Decode the payload with the header's tree.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let decoder = Decoder::new(self.header.tree.clone());
        // Every symbol costs at least one bit, so a bogus count can not blow up the allocation
        let capacity = self.header.symbol_count.min(self.payload.len() as u64 * 8) as usize;
        decoder.decode_payload(
            self.payload.as_slice(),
            self.header.symbol_count,
            Vec::with_capacity(capacity),
        )
    }
}
