use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::{error, info, warn};

use super::artifact::Header;
use super::compress::SUFFIX;
use crate::bitstream::BitUnpacker;
use crate::error::{HuffError, Result};
use crate::huffman_coding::{HuffmanTree, Node};
use crate::tools::options::{HufOpts, Output};
use crate::tools::report::Report;

/// Decoded bytes held back before they are handed to the writer.
const OUT_CHUNK: usize = 64 * 1024;

/// Suffix used for decompressed output when the input name does not end in SUFFIX.
const FALLBACK_SUFFIX: &str = ".out";

/// Turns code bits back into symbols by walking a tree.
#[derive(Debug, Clone)]
pub struct Decoder {
    tree: HuffmanTree,
}

impl Decoder {
    /// Decoder for a tree obtained out-of-band, or read from a header.
    pub fn new(tree: HuffmanTree) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    /// Decode exactly `count` symbols from a payload-only byte source into `sink`.
    pub fn decode_payload<R: Read, W: Write>(&self, source: R, count: u64, mut sink: W) -> Result<W> {
        let mut br = BitUnpacker::new(source);
        self.decode_bits(&mut br, count, &mut sink)?;
        Ok(sink)
    }

    /// Walk the tree from the root, 0 left and 1 right, emitting a symbol at every leaf.
    /// Stops after `count` symbols, so padding in the last byte is never decoded.
    pub(crate) fn decode_bits<R: Read, W: Write>(
        &self,
        br: &mut BitUnpacker<R>,
        count: u64,
        sink: &mut W,
    ) -> Result<()> {
        let root = self.tree.root();
        let truncated = |decoded| HuffError::TruncatedArtifact {
            expected: count,
            decoded,
        };
        let mut out = Vec::with_capacity(OUT_CHUNK.min(count as usize));
        let mut decoded = 0_u64;

        while decoded < count {
            let symbol = match *self.tree.node(root) {
                // A lone leaf has the one bit code 0
                Node::Leaf { symbol, .. } => match br.bit()? {
                    Some(0) => symbol,
                    Some(_) => {
                        return Err(HuffError::malformed(format!(
                            "1 bit in a single symbol payload at {}",
                            br.loc()
                        )))
                    }
                    None => return Err(truncated(decoded)),
                },
                Node::Internal { .. } => {
                    let mut idx = root;
                    loop {
                        match *self.tree.node(idx) {
                            Node::Leaf { symbol, .. } => break symbol,
                            Node::Internal { left, right, .. } => {
                                let bit = br.bit()?.ok_or_else(|| truncated(decoded))?;
                                idx = if bit == 0 { left } else { right };
                            }
                        }
                    }
                }
            };
            out.push(symbol);
            decoded += 1;
            if out.len() >= OUT_CHUNK {
                sink.write_all(&out)?;
                out.clear();
            }
        }
        sink.write_all(&out)?;
        sink.flush()?;
        Ok(())
    }
}

/// Decompress an artifact from `source` into `sink`.
pub fn decompress<R: Read, W: Write>(source: R, mut sink: W) -> Result<Report> {
    let mut br = BitUnpacker::new(source);
    let header = Header::read(&mut br)?;
    let count = header.symbol_count;
    Decoder::new(header.tree).decode_bits(&mut br, count, &mut sink)?;

    // One partial byte of padding is expected, anything past it is not ours
    let extra = br.drain_remaining()?;
    if extra > 0 {
        warn!("Ignored {} bytes after the end of the payload.", extra);
    }
    let report = Report::new(br.bytes_read(), count);
    info!("Decompressed: {}", report);
    Ok(report)
}

/// Decompress an artifact held in memory.
pub fn decompress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decompress(data, &mut out)?;
    Ok(out)
}

/// Name of the file to decompress `path` into.
fn output_name(path: &str) -> String {
    match path.strip_suffix(SUFFIX) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => format!("{}{}", path, FALLBACK_SUFFIX),
    }
}

/// Decompress the file at `path` as directed by `opts`.
pub fn decompress_file(opts: &HufOpts, path: &str) -> Result<Report> {
    let fin = BufReader::new(File::open(path)?);

    let report = match opts.output {
        Output::Stdout => decompress(fin, io::stdout().lock())?,
        Output::File => {
            let fname = output_name(path);
            if Path::new(&fname).exists() && !opts.force_overwrite {
                error!("Output file {} already exists.", fname);
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} already exists", fname),
                )
                .into());
            }
            let result = {
                let f_out = File::create(&fname)?;
                decompress(fin, BufWriter::new(f_out))
            };
            match result {
                Ok(report) => report,
                Err(e) => {
                    error!("Fatal error: {} could not be decompressed: {}", path, e);
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

/// Check that the file at `path` decodes cleanly, discarding the output.
pub fn test_file(path: &str) -> Result<Report> {
    let fin = BufReader::new(File::open(path)?);
    match decompress(fin, io::sink()) {
        Ok(report) => {
            info!("{}: ok", path);
            Ok(report)
        }
        Err(e) => {
            error!("{}: {}", path, e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod test {
    use super::{decompress, decompress_bytes, decompress_file, output_name, test_file, Decoder};
    use crate::compression::artifact::CompressedArtifact;
    use crate::compression::compress::{compress_bytes, Encoder};
    use crate::error::HuffError;
    use crate::tools::options::HufOpts;

    #[test]
    fn aaabbc_round_trip_test() {
        let packed = compress_bytes(b"aaabbc").unwrap();
        assert_eq!(decompress_bytes(&packed).unwrap(), b"aaabbc");
    }

    #[test]
    fn single_symbol_round_trip_test() {
        for len in [1, 7, 8, 9, 100] {
            let data = vec![b'q'; len];
            let packed = compress_bytes(&data).unwrap();
            assert_eq!(decompress_bytes(&packed).unwrap(), data);
        }
    }

    #[test]
    fn padding_is_not_decoded_test() {
        // b=0 a=1: the 2 padding bits after "aaaaab" would decode as two more b's
        let data = b"aaaaab";
        let packed = compress_bytes(data).unwrap();
        let artifact = CompressedArtifact::read_from(packed.as_slice()).unwrap();
        assert_eq!(artifact.payload.len(), 1);
        assert_eq!(decompress_bytes(&packed).unwrap(), data);
    }

    #[test]
    fn truncated_payload_test() {
        let data = "truncate me please, truncate me".as_bytes();
        let mut packed = compress_bytes(data).unwrap();
        packed.pop();
        match decompress_bytes(&packed) {
            Err(HuffError::TruncatedArtifact { expected, decoded }) => {
                assert_eq!(expected, data.len() as u64);
                assert!(decoded < expected);
            }
            other => panic!("expected a truncation error, got {:?}", other),
        }
    }

    #[test]
    fn truncated_single_symbol_test() {
        let data = vec![b'z'; 16];
        let mut packed = compress_bytes(&data).unwrap();
        packed.pop();
        assert!(matches!(
            decompress_bytes(&packed),
            Err(HuffError::TruncatedArtifact { expected: 16, decoded: 8 })
        ));
    }

    #[test]
    fn one_bit_in_single_symbol_payload_test() {
        let mut packed = compress_bytes(b"zzz").unwrap();
        let last = packed.len() - 1;
        packed[last] = 0b0100_0000;
        assert!(matches!(
            decompress_bytes(&packed),
            Err(HuffError::MalformedArtifact(_))
        ));
    }

    #[test]
    fn header_only_test() {
        let packed = compress_bytes(b"abc").unwrap();
        let artifact = CompressedArtifact::read_from(packed.as_slice()).unwrap();
        let header_len = packed.len() - artifact.payload.len();
        assert!(matches!(
            decompress_bytes(&packed[..header_len]),
            Err(HuffError::TruncatedArtifact { decoded: 0, .. })
        ));
        assert!(matches!(
            decompress_bytes(&[]),
            Err(HuffError::MalformedArtifact(_))
        ));
    }

    #[test]
    fn trailing_garbage_ignored_test() {
        let mut packed = compress_bytes(b"garbage after the end").unwrap();
        packed.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        let mut out = Vec::new();
        let report = decompress(packed.as_slice(), &mut out).unwrap();
        assert_eq!(out, b"garbage after the end");
        assert_eq!(report.bytes_in, packed.len() as u64);
        assert_eq!(report.bytes_out, out.len() as u64);
    }

    #[test]
    fn out_of_band_tree_test() {
        let data = b"the decoder gets its tree some other way";
        let encoder = Encoder::new(data).unwrap();
        let artifact = encoder.artifact().unwrap();
        let decoder = Decoder::new(encoder.tree().clone());
        assert_eq!(decoder.tree(), encoder.tree());
        let out = decoder
            .decode_payload(artifact.payload.as_slice(), data.len() as u64, Vec::new())
            .unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn large_input_test() {
        let data: Vec<u8> = (0..200_000_u32).map(|i| ((i * 7) % 251) as u8).collect();
        let packed = compress_bytes(&data).unwrap();
        assert_eq!(decompress_bytes(&packed).unwrap(), data);
    }

    #[test]
    fn output_name_test() {
        assert_eq!(output_name("notes.txt.huf"), "notes.txt");
        assert_eq!(output_name("notes.txt"), "notes.txt.out");
        assert_eq!(output_name(".huf"), ".huf.out");
    }

    #[test]
    fn decompress_file_test() {
        let dir = std::env::temp_dir();
        let stem = dir.join(format!("huffpack_decompress_{}.txt", std::process::id()));
        let stem = stem.to_str().unwrap().to_string();
        let path = format!("{}.huf", stem);
        std::fs::write(&path, compress_bytes(b"round trip through files").unwrap()).unwrap();

        let mut opts = HufOpts::new();
        opts.keep_input_files = true;
        test_file(&path).unwrap();
        decompress_file(&opts, &path).unwrap();
        assert_eq!(std::fs::read(&stem).unwrap(), b"round trip through files");

        std::fs::remove_file(&stem).unwrap();
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn corrupt_file_leaves_no_output_test() {
        let dir = std::env::temp_dir();
        let stem = dir.join(format!("huffpack_corrupt_{}.txt", std::process::id()));
        let stem = stem.to_str().unwrap().to_string();
        let path = format!("{}.huf", stem);
        std::fs::write(&path, b"HUF1 this is not a real artifact").unwrap();

        let opts = HufOpts::new();
        assert!(test_file(&path).is_err());
        assert!(decompress_file(&opts, &path).is_err());
        assert!(!std::path::Path::new(&stem).exists());
        // The input is only removed after a successful decompress
        assert!(std::path::Path::new(&path).exists());
        std::fs::remove_file(&path).unwrap();
    }
}
