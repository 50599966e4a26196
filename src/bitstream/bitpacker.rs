use std::io::Write;

use log::{error, trace};

use crate::error::{HuffError, Result};
use crate::huffman_coding::code_table::Code;

/// Bytes held back before they are handed to the writer.
const FLUSH_SIZE: usize = 64 * 1024;

/// Packs single bits into bytes, most significant bit first, and sends them to a writer.
/// Call finish() when done, or the last partial byte (and anything still buffered) is lost.
pub struct BitPacker<W: Write> {
    /// Packed bytes waiting to be written out.
    output: Vec<u8>,
    /// Private queue to hold bits that are waiting to be put as bytes into the output buffer.
    queue: u64,
    /// Count of valid bits in the queue.
    q_bits: u8,
    /// Every bit accepted so far, padding excluded.
    bits_written: u64,
    /// Whole bytes packed so far, padding included.
    bytes_out: u64,
    /// Handle to the output stream
    writer: W,
}

impl<W: Write> BitPacker<W> {
    /// Create a new BitPacker that writes into `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            output: Vec::with_capacity(FLUSH_SIZE),
            queue: 0,
            q_bits: 0,
            bits_written: 0,
            bytes_out: 0,
            writer,
        }
    }

    /// Move all full bytes from the queue to the output buffer, handing the buffer to the
    /// writer once it grows past FLUSH_SIZE.
    fn write_stream(&mut self) -> Result<()> {
        while self.q_bits > 7 {
            let byte = (self.queue >> (self.q_bits - 8)) as u8;
            self.output.push(byte); //push the packed byte out
            self.q_bits -= 8; //adjust the count of bits left in the queue
            self.bytes_out += 1;
        }
        if self.output.len() >= FLUSH_SIZE {
            self.writer.write_all(&self.output)?;
            self.output.clear();
        }
        Ok(())
    }

    /// Append one bit. Anything other than 0 or 1 is rejected with InvalidBit.
    pub fn write_bit(&mut self, bit: u8) -> Result<()> {
        if bit > 1 {
            return Err(HuffError::InvalidBit(bit));
        }
        self.queue = (self.queue << 1) | bit as u64;
        self.q_bits += 1;
        self.bits_written += 1;
        self.write_stream()
    }

    /// Append every bit of a Huffman code, first bit first.
    pub fn write_code(&mut self, code: &Code) -> Result<()> {
        for &bit in code.bits() {
            self.write_bit(bit)?;
        }
        Ok(())
    }

    /// Puts an 8 bit word on the stream. It does not need to be byte aligned.
    pub fn out8(&mut self, data: u8) -> Result<()> {
        self.queue <<= 8; //shift queue by one byte
        self.queue |= data as u64; //add the byte to queue
        self.q_bits += 8; //update depth of queue bits
        self.bits_written += 8;
        self.write_stream()
    }

    /// Puts a 64 bit word on the stream, big-endian.
    pub fn out64(&mut self, data: u64) -> Result<()> {
        for byte in data.to_be_bytes() {
            self.out8(byte)?;
        }
        Ok(())
    }

    /// Zero-pad the current byte so the next bit starts a new one. Returns the number of
    /// padding bits added (0-7).
    pub fn align(&mut self) -> Result<u8> {
        let padding = (8 - self.q_bits % 8) % 8;
        if padding > 0 {
            self.queue <<= padding; //pad the queue with zeros
            self.q_bits += padding;
            self.write_stream()?;
        }
        Ok(padding)
    }

    /// Number of bits written so far, not counting padding.
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Number of whole bytes produced so far. After finish() this is the size of the output.
    pub fn bytes_out(&self) -> u64 {
        self.bytes_out
    }

    /// Flushes the remaining bits (1-7), padding with 0s in the least significant bits, then
    /// hands everything to the writer and flushes it. Returns the writer and the number of
    /// padding bits in the final byte.
    pub fn finish(mut self) -> Result<(W, u8)> {
        let padding = self.align()?;
        if self.q_bits > 0 {
            error!("Stuff left in the BitPacker queue.");
        }
        self.writer.write_all(&self.output)?;
        self.output.clear();
        self.writer.flush()?;
        trace!(
            "BitPacker finished after {} bits with {} bits of padding",
            self.bits_written,
            padding
        );
        Ok((self.writer, padding))
    }

    /// Debugging function to return the number of bytes.bits accepted so far
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.bits_written / 8, self.bits_written % 8)
    }
}

#[cfg(test)]
mod test {
    use super::BitPacker;
    use crate::error::HuffError;

    fn pack(bits: &[u8]) -> (Vec<u8>, u8) {
        let mut bp = BitPacker::new(Vec::new());
        for &bit in bits {
            bp.write_bit(bit).unwrap();
        }
        bp.finish().unwrap()
    }

    #[test]
    fn full_byte_test() {
        let (out, padding) = pack(&[0, 0, 1, 0, 0, 0, 0, 1]);
        assert_eq!(out, "!".as_bytes());
        assert_eq!(padding, 0);
    }

    #[test]
    fn partial_byte_padding_test() {
        // 0 0 0 1 0 1 0 1 1 -> 0001_0101 1000_0000
        let (out, padding) = pack(&[0, 0, 0, 1, 0, 1, 0, 1, 1]);
        assert_eq!(out, vec![0b0001_0101, 0b1000_0000]);
        assert_eq!(padding, 7);
    }

    #[test]
    fn empty_finish_test() {
        let (out, padding) = pack(&[]);
        assert!(out.is_empty());
        assert_eq!(padding, 0);
    }

    #[test]
    fn invalid_bit_test() {
        let mut bp = BitPacker::new(Vec::new());
        bp.write_bit(1).unwrap();
        assert!(matches!(bp.write_bit(2), Err(HuffError::InvalidBit(2))));
        // The rejected bit leaves the stream untouched
        assert_eq!(bp.bits_written(), 1);
        let (out, _) = bp.finish().unwrap();
        assert_eq!(out, vec![0b1000_0000]);
    }

    #[test]
    fn unaligned_out8_and_loc_test() {
        let mut bp = BitPacker::new(Vec::new());
        bp.write_bit(1).unwrap();
        bp.out8(0xff).unwrap();
        assert_eq!("[1.1]", &bp.loc());
        assert_eq!(bp.bytes_out(), 1);
        let (out, padding) = bp.finish().unwrap();
        assert_eq!(out, vec![0xff, 0b1000_0000]);
        assert_eq!(padding, 7);
    }

    #[test]
    fn out64_test() {
        let mut bp = BitPacker::new(Vec::new());
        bp.out64(0x0102_0304_0506_0708).unwrap();
        let (out, _) = bp.finish().unwrap();
        assert_eq!(out, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn align_mid_stream_test() {
        let mut bp = BitPacker::new(Vec::new());
        bp.write_bit(1).unwrap();
        bp.write_bit(1).unwrap();
        assert_eq!(bp.align().unwrap(), 6);
        assert_eq!(bp.align().unwrap(), 0);
        bp.write_bit(1).unwrap();
        let (out, _) = bp.finish().unwrap();
        assert_eq!(out, vec![0b1100_0000, 0b1000_0000]);
    }

    #[test]
    fn large_stream_flushes_test() {
        let mut bp = BitPacker::new(Vec::new());
        for i in 0..(super::FLUSH_SIZE * 8 * 2 + 3) {
            bp.write_bit((i % 2) as u8).unwrap();
        }
        let (out, padding) = bp.finish().unwrap();
        assert_eq!(out.len(), super::FLUSH_SIZE * 2 + 1);
        assert!(out[..out.len() - 1].iter().all(|&b| b == 0b0101_0101));
        assert_eq!(out[out.len() - 1], 0b0100_0000);
        assert_eq!(padding, 5);
    }
}
