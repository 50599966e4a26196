use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use log::{debug, error, info};

use super::artifact::{CompressedArtifact, Header};
use crate::bitstream::BitPacker;
use crate::error::{HuffError, Result};
use crate::huffman_coding::{CodeTable, HuffmanTree};
use crate::tools::freq_count::FrequencyTable;
use crate::tools::options::{HufOpts, Output};
use crate::tools::report::Report;

/// Suffix added to compressed files.
pub const SUFFIX: &str = ".huf";

/*
    The Encoder holds everything built for one input: the frequency count, the tree and the
    code table. Nothing is global, so two encoders never see each other's state.

    Encoding is two passes over the input: one to count, one to emit codes. That is why the
    whole input has to be in memory.
*/

/// Encoding context for one input.
#[derive(Debug)]
pub struct Encoder<'a> {
    data: &'a [u8],
    freqs: FrequencyTable,
    tree: HuffmanTree,
    table: CodeTable,
}

impl<'a> Encoder<'a> {
    /// Count, build the tree and derive the codes. Empty input is EmptyInput.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(HuffError::EmptyInput);
        }
        let freqs = FrequencyTable::from_bytes(data);
        let tree = HuffmanTree::from_frequencies(&freqs)?;
        let table = CodeTable::from_tree(&tree);
        debug!(
            "{} distinct symbols, longest code {} bits, payload {} bits",
            table.len(),
            table.max_len(),
            table.encoded_bits(&freqs)
        );
        Ok(Self {
            data,
            freqs,
            tree,
            table,
        })
    }

    pub fn frequencies(&self) -> &FrequencyTable {
        &self.freqs
    }

    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    pub fn table(&self) -> &CodeTable {
        &self.table
    }

    fn header(&self) -> Header {
        Header {
            symbol_count: self.data.len() as u64,
            tree: self.tree.clone(),
        }
    }

    /// Feed every input symbol's code to the packer.
    fn pack_symbols<W: Write>(&self, bp: &mut BitPacker<W>) -> Result<()> {
        for &symbol in self.data {
            let code = self.table.get(symbol).ok_or_else(|| {
                HuffError::malformed(format!("symbol {} has no code", symbol))
            })?;
            bp.write_code(code)?;
        }
        Ok(())
    }

    /// Write the complete artifact (header, then payload) to `sink`.
    pub fn encode_to<W: Write>(&self, sink: W) -> Result<Report> {
        let mut bp = BitPacker::new(sink);
        self.header().write(&mut bp)?;
        let payload_start = bp.bits_written();
        self.pack_symbols(&mut bp)?;
        let payload_bits = bp.bits_written() - payload_start;
        let padding = bp.align()?;
        debug!("Payload is {} bits plus {} bits of padding", payload_bits, padding);
        let bytes_out = bp.bytes_out();
        bp.finish()?;
        Ok(Report::new(self.data.len() as u64, bytes_out))
    }

    /// Build the artifact in memory instead of streaming it out.
    pub fn artifact(&self) -> Result<CompressedArtifact> {
        let mut bp = BitPacker::new(Vec::new());
        self.pack_symbols(&mut bp)?;
        let (payload, _) = bp.finish()?;
        Ok(CompressedArtifact {
            header: self.header(),
            payload,
        })
    }
}

/// Compress everything `source` yields into `sink`.
pub fn compress<R: Read, W: Write>(mut source: R, sink: W) -> Result<Report> {
    let mut data = Vec::new();
    source.read_to_end(&mut data)?;
    let report = Encoder::new(&data)?.encode_to(sink)?;
    info!("Compressed: {}", report);
    Ok(report)
}

/// Compress a byte slice into a new artifact buffer.
pub fn compress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    Encoder::new(data)?.encode_to(&mut out)?;
    Ok(out)
}

/// Compress the file at `path` as directed by `opts`. Writes `path` + ".huf", or stdout.
pub fn compress_file(opts: &HufOpts, path: &str) -> Result<Report> {
    let fin = File::open(path)?;

    let report = match opts.output {
        Output::Stdout => compress(fin, io::stdout().lock())?,
        Output::File => {
            let fname = format!("{}{}", path, SUFFIX);
            if Path::new(&fname).exists() && !opts.force_overwrite {
                error!("Output file {} already exists.", fname);
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} already exists", fname),
                )
                .into());
            }
            // The output file is closed at the end of this block, whatever happens
            let result = {
                let f_out = File::create(&fname)?;
                compress(fin, BufWriter::new(f_out))
            };
            match result {
                Ok(report) => report,
                Err(e) => {
                    error!("Compressing {} failed: {}", path, e);
                    // Don't leave half an artifact behind
                    let _ = fs::remove_file(&fname);
                    return Err(e);
                }
            }
        }
    };

    if !opts.keep_input_files && matches!(opts.output, Output::File) {
        fs::remove_file(path)?;
    }
    Ok(report)
}
