//! BitUnpacker: reads a packed bitstream back out, most significant bit first.
//!
//! NOTE: This module can read from any I/O source that supports the read() call. Read errors
//! are handed back to the caller; running out of data is not an error here, it is reported
//! as None and the caller decides what that means.
//!

use std::io::{self, ErrorKind, Read};

const BUFFER_SIZE: usize = 64 * 1024;
const BIT_MASK: u8 = 0xff;

/// Reads bits from a byte source.
#[derive(Debug)]
pub struct BitUnpacker<R> {
    buffer: Vec<u8>,
    /// Number of valid bytes in the buffer.
    filled: usize,
    cursor: usize,
    bit_index: usize,
    /// Bytes fully consumed before the current buffer.
    consumed: u64,
    source: R,
}

impl<R: Read> BitUnpacker<R> {
    /// Creates a new BitUnpacker (with a 64k buffer).
    pub fn new(source: R) -> Self {
        Self {
            buffer: vec![0; BUFFER_SIZE],
            filled: 0,
            cursor: 0,
            bit_index: 0,
            consumed: 0,
            source,
        }
    }

    /// Check (and refill) buffer. Returns true if we have data, false if there is no more
    fn have_data(&mut self) -> io::Result<bool> {
        // Only try to read more data when the cursor has reached the end of what we hold
        if self.cursor == self.filled {
            let size = loop {
                match self.source.read(&mut self.buffer) {
                    Ok(size) => break size,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                }
            };
            // If nothing came back from our read attempt, then we have no more data.
            if size == 0 {
                return Ok(false);
            }
            self.consumed += self.filled as u64;
            self.filled = size;
            // Reset the cursor and bit index
            self.cursor = 0;
            self.bit_index = 0;
        }
        Ok(true)
    }

    /// Return the next bit (1 or 0), or None if there is no more data to read
    pub fn bit(&mut self) -> io::Result<Option<u8>> {
        // If bit_index is == 0, check if we have a byte to read. Return None if we have no data
        if self.bit_index == 0 && !self.have_data()? {
            return Ok(None);
        }
        let bit =
            (self.buffer[self.cursor] & BIT_MASK >> self.bit_index) >> (7 - self.bit_index);
        self.bit_index += 1;
        self.bit_index %= 8;
        if self.bit_index == 0 {
            self.cursor += 1;
        }
        Ok(Some(bit))
    }

    /// Return the next n bits (n <= 64) as an unsigned integer, first bit most significant,
    /// or None if the data runs out first.
    pub fn bint(&mut self, n: usize) -> io::Result<Option<u64>> {
        debug_assert!(n <= 64);
        let mut result = 0_u64;
        for _ in 0..n {
            match self.bit()? {
                Some(bit) => result = (result << 1) | bit as u64,
                None => return Ok(None),
            }
        }
        Ok(Some(result))
    }

    /// Returns the next 8 bits as a byte, or None if there is no more data to read.
    pub fn byte(&mut self) -> io::Result<Option<u8>> {
        // Fast path when we are byte aligned
        if self.bit_index == 0 {
            if !self.have_data()? {
                return Ok(None);
            }
            let byte = self.buffer[self.cursor];
            self.cursor += 1;
            return Ok(Some(byte));
        }
        Ok(self.bint(8)?.map(|byte| byte as u8))
    }

    /// Returns n bytes, or None if there is no more data to read.
    pub fn bytes(&mut self, n: usize) -> io::Result<Option<Vec<u8>>> {
        let mut result: Vec<u8> = Vec::with_capacity(n);
        for _ in 0..n {
            match self.byte()? {
                Some(byte) => result.push(byte),
                None => return Ok(None),
            }
        }
        Ok(Some(result))
    }

    /// Skip the rest of the current byte. Returns the skipped bits, right aligned (0 if we were
    /// already byte aligned).
    pub fn align(&mut self) -> io::Result<u8> {
        let mut skipped = 0_u8;
        while self.bit_index != 0 {
            match self.bit()? {
                Some(bit) => skipped = (skipped << 1) | bit,
                None => break,
            }
        }
        Ok(skipped)
    }

    /// Skip to the next byte boundary and count the whole bytes left in the source.
    pub fn drain_remaining(&mut self) -> io::Result<u64> {
        self.align()?;
        let mut left = 0_u64;
        while self.have_data()? {
            left += (self.filled - self.cursor) as u64;
            self.cursor = self.filled;
        }
        Ok(left)
    }

    /// Number of whole bytes taken from the source so far (a partly read byte counts).
    pub fn bytes_read(&self) -> u64 {
        let partial = if self.bit_index > 0 { 1 } else { 0 };
        self.consumed + self.cursor as u64 + partial
    }

    /// Debugging function. Report current position in the stream as [bytes.bits].
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.consumed + self.cursor as u64, self.bit_index)
    }
}
