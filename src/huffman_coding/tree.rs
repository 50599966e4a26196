//! The Huffman tree, stored as an arena of nodes with index links.
//!
//! Building is the classic greedy merge: every present symbol starts as a leaf in a min-queue
//! keyed by weight, and the two lightest nodes are repeatedly merged under a new internal
//! node until one node (the root) is left. Ties are broken by arena index, which is the order
//! nodes were created in. Leaves are created in ascending symbol order, so the same
//! frequencies always give the same tree and the same codes.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::io::{Read, Write};

use log::{debug, trace};

use crate::bitstream::{BitPacker, BitUnpacker};
use crate::error::{HuffError, Result};
use crate::tools::freq_count::FrequencyTable;

/// Deepest leaf a tree over at most 256 symbols can have.
pub const MAX_DEPTH: usize = 255;

/// Tree header marker bits.
const INTERNAL_MARK: u8 = 0;
const LEAF_MARK: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Leaf { symbol: u8, weight: u64 },
    Internal { weight: u64, left: usize, right: usize },
}

impl Node {
    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }
}

/// Binary prefix tree. Every internal node has exactly two children, and no node has more
/// than one parent. Trees read back from a header carry no weights (all zero).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: usize,
}

impl HuffmanTree {
    /// Build the optimal tree for a non-empty frequency table. The first node taken off the
    /// queue becomes the left child.
    pub fn from_frequencies(freqs: &FrequencyTable) -> Result<Self> {
        if freqs.is_empty() {
            return Err(HuffError::EmptyInput);
        }
        let mut nodes: Vec<Node> = Vec::with_capacity(freqs.len() * 2 - 1);
        let mut queue = BinaryHeap::with_capacity(freqs.len());

        for (symbol, weight) in freqs.iter() {
            queue.push(Reverse((weight, nodes.len())));
            nodes.push(Node::Leaf { symbol, weight });
        }

        // Pull off the two lightest nodes and hang them under a new one until only the root is left
        let root = loop {
            let Some(Reverse((left_weight, left))) = queue.pop() else {
                return Err(HuffError::EmptyInput);
            };
            let Some(Reverse((right_weight, right))) = queue.pop() else {
                break left;
            };
            let weight = left_weight + right_weight;
            queue.push(Reverse((weight, nodes.len())));
            nodes.push(Node::Internal {
                weight,
                left,
                right,
            });
        };

        let tree = Self { nodes, root };
        debug!(
            "Built tree with {} leaves, depth {}",
            tree.leaf_count(),
            tree.depth()
        );
        Ok(tree)
    }

    /// Index of the root node.
    pub fn root(&self) -> usize {
        self.root
    }

    /// Node at `idx`. Indices come from root() or from the children of another node.
    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    /// Weight of the whole tree, which is the number of symbols it was built from.
    pub fn weight(&self) -> u64 {
        self.nodes[self.root].weight()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// True for the degenerate tree of a single symbol.
    pub fn is_single_leaf(&self) -> bool {
        matches!(self.nodes[self.root], Node::Leaf { .. })
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 0_usize)];
        while let Some((idx, depth)) = stack.pop() {
            match self.nodes[idx] {
                Node::Leaf { .. } => deepest = deepest.max(depth),
                Node::Internal { left, right, .. } => {
                    stack.push((left, depth + 1));
                    stack.push((right, depth + 1));
                }
            }
        }
        deepest
    }

    /// Write the tree shape in pre-order: 0 for an internal node followed by its left and
    /// right subtrees, 1 for a leaf followed by its 8 bit symbol.
    pub fn write_header<W: Write>(&self, bp: &mut BitPacker<W>) -> Result<()> {
        let start = bp.bits_written();
        self.write_node(bp, self.root)?;
        trace!("Tree header is {} bits", bp.bits_written() - start);
        Ok(())
    }

    fn write_node<W: Write>(&self, bp: &mut BitPacker<W>, idx: usize) -> Result<()> {
        match self.nodes[idx] {
            Node::Leaf { symbol, .. } => {
                bp.write_bit(LEAF_MARK)?;
                bp.out8(symbol)
            }
            Node::Internal { left, right, .. } => {
                bp.write_bit(INTERNAL_MARK)?;
                self.write_node(bp, left)?;
                self.write_node(bp, right)
            }
        }
    }

    /// Rebuild a tree written by write_header. Running out of data, a repeated symbol or a
    /// tree deeper than 256 symbols allow are all malformed headers.
    pub fn read_header<R: Read>(br: &mut BitUnpacker<R>) -> Result<Self> {
        let mut nodes = Vec::new();
        let mut seen = [false; 256];
        let root = Self::read_node(br, &mut nodes, &mut seen, 0)?;
        Ok(Self { nodes, root })
    }

    fn read_node<R: Read>(
        br: &mut BitUnpacker<R>,
        nodes: &mut Vec<Node>,
        seen: &mut [bool; 256],
        depth: usize,
    ) -> Result<usize> {
        if depth > MAX_DEPTH {
            return Err(HuffError::malformed(format!(
                "tree deeper than {} levels at {}",
                MAX_DEPTH,
                br.loc()
            )));
        }
        let mark = br
            .bit()?
            .ok_or_else(|| HuffError::malformed("stream ends inside the tree header"))?;
        if mark == LEAF_MARK {
            let symbol = br
                .byte()?
                .ok_or_else(|| HuffError::malformed("stream ends inside a tree leaf"))?;
            if seen[symbol as usize] {
                return Err(HuffError::malformed(format!(
                    "symbol {} appears twice in the tree",
                    symbol
                )));
            }
            seen[symbol as usize] = true;
            nodes.push(Node::Leaf { symbol, weight: 0 });
        } else {
            let left = Self::read_node(br, nodes, seen, depth + 1)?;
            let right = Self::read_node(br, nodes, seen, depth + 1)?;
            nodes.push(Node::Internal {
                weight: 0,
                left,
                right,
            });
        }
        Ok(nodes.len() - 1)
    }
}
