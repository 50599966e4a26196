use std::fmt::{Display, Formatter};

use log::trace;
use rustc_hash::FxHashMap;

use super::tree::{HuffmanTree, Node};
use crate::tools::freq_count::FrequencyTable;

/// The bits of one Huffman code, first bit first. Each entry is 0 or 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Code {
    bits: Vec<u8>,
}

impl Code {
    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Never true for a code taken from a CodeTable.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// True if `self` is a prefix of `other` (or equal to it).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.bits.starts_with(&self.bits)
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for bit in &self.bits {
            write!(f, "{}", bit)?;
        }
        Ok(())
    }
}

/// Symbol to code lookup, derived from a tree. Rebuilt from the tree, never edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: FxHashMap<u8, Code>,
}

impl CodeTable {
    /// Walk the tree, adding 0 for every left turn and 1 for every right turn. A tree that is
    /// a single leaf gets the one bit code "0", since an empty code can not be seen in a
    /// bitstream.
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut codes = FxHashMap::default();
        if let Node::Leaf { symbol, .. } = *tree.node(tree.root()) {
            codes.insert(symbol, Code { bits: vec![0] });
        } else {
            let mut path = Vec::with_capacity(tree.depth());
            return_leaves(tree, tree.root(), &mut path, &mut codes);
        }
        let table = Self { codes };
        for (symbol, code) in table.iter() {
            trace!("{:>3}: {}", symbol, code);
        }
        table
    }

    pub fn get(&self, symbol: u8) -> Option<&Code> {
        self.codes.get(&symbol)
    }

    /// Number of symbols with a code.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Length in bits of the longest code.
    pub fn max_len(&self) -> usize {
        self.codes.values().map(Code::len).max().unwrap_or(0)
    }

    /// Total payload size in bits for data with these frequencies: the sum of count times
    /// code length. Symbols without a code are not counted.
    pub fn encoded_bits(&self, freqs: &FrequencyTable) -> u64 {
        freqs
            .iter()
            .filter_map(|(sym, count)| self.get(sym).map(|code| count * code.len() as u64))
            .sum()
    }

    /// (symbol, code) pairs in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        let mut pairs: Vec<(u8, &Code)> = self.codes.iter().map(|(&s, c)| (s, c)).collect();
        pairs.sort_unstable_by_key(|&(s, _)| s);
        pairs.into_iter()
    }
}

/// Recursively walk the tree and record in `codes` the path taken to each leaf.
fn return_leaves(
    tree: &HuffmanTree,
    idx: usize,
    path: &mut Vec<u8>,
    codes: &mut FxHashMap<u8, Code>,
) {
    match *tree.node(idx) {
        Node::Internal { left, right, .. } => {
            path.push(0);
            return_leaves(tree, left, path, codes);
            path.pop();
            path.push(1);
            return_leaves(tree, right, path, codes);
            path.pop();
        }
        Node::Leaf { symbol, .. } => {
            codes.insert(symbol, Code { bits: path.clone() });
        }
    }
}
