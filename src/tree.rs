use {
    crate::{
        bits::{BitSink, BitSource},
        error::{Error, Result},
        frequency::ByteFrequency,
    },
    bitvec::prelude::*,
    std::{ascii, cmp::Reverse, collections::BinaryHeap, fmt, io},
};

/// Index of a node in its tree's arena.
pub type NodeId = usize;

/// The deepest a leaf can sit in a tree over 256 symbols.
const MAX_DEPTH: usize = u8::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuffmanNode {
    Leaf {
        byte: u8,
        frequency: usize,
    },
    Node {
        left: NodeId,
        right: NodeId,
        frequency: usize,
    },
}

impl HuffmanNode {
    pub fn frequency(&self) -> usize {
        match *self {
            HuffmanNode::Leaf { frequency, .. } | HuffmanNode::Node { frequency, .. } => frequency,
        }
    }

    pub fn is_leaf(&self) -> bool {
        match self {
            HuffmanNode::Leaf { .. } => true,
            HuffmanNode::Node { .. } => false,
        }
    }
}

/// A binary code tree. Leaves are bytes; the path from the root to a leaf,
/// 0 for left and 1 for right, is that byte's code.
///
/// The root is always an internal node, so every code is at least one bit.
/// When only one byte occurs, the root's two children are the same leaf.
#[derive(Debug, Clone)]
pub struct HuffmanCodingTree {
    nodes: Vec<HuffmanNode>,
    root: NodeId,
}

impl HuffmanCodingTree {
    /// Build the optimal code tree for `frequency`.
    ///
    /// Nodes are merged lowest weight first. Equal weights merge in the order
    /// the nodes entered the work set: leaves by ascending byte value, then
    /// merged nodes in the order they were created. The first node taken
    /// becomes the left child.
    pub fn of(frequency: &ByteFrequency) -> Result<Self> {
        let mut nodes: Vec<HuffmanNode> = frequency
            .iter()
            .map(|(byte, frequency)| HuffmanNode::Leaf { byte, frequency })
            .collect();

        if let [HuffmanNode::Leaf { frequency, .. }] = nodes[..] {
            nodes.push(HuffmanNode::Node {
                left: 0,
                right: 0,
                frequency,
            });
            return Ok(HuffmanCodingTree { nodes, root: 1 });
        }

        // Arena indices double as insertion sequence numbers for tie-breaking.
        let mut queue: BinaryHeap<Reverse<(usize, NodeId)>> = nodes
            .iter()
            .enumerate()
            .map(|(id, node)| Reverse((node.frequency(), id)))
            .collect();

        while let Some(Reverse((left_frequency, left))) = queue.pop() {
            let Reverse((right_frequency, right)) = match queue.pop() {
                Some(entry) => entry,
                None => {
                    debug_assert_eq!(nodes[left].frequency(), frequency.total());
                    return Ok(HuffmanCodingTree { nodes, root: left });
                }
            };
            let id = nodes.len();
            let weight = left_frequency + right_frequency;
            nodes.push(HuffmanNode::Node {
                left,
                right,
                frequency: weight,
            });
            queue.push(Reverse((weight, id)));
        }

        Err(Error::Unconverged {
            remaining: queue.len(),
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &HuffmanNode {
        &self.nodes[id]
    }

    /// Weight of the whole tree, i.e. the number of bytes it was built from.
    pub fn frequency(&self) -> usize {
        self.nodes[self.root].frequency()
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Follow one edge down from the internal node `id`.
    pub(crate) fn step(&self, id: NodeId, bit: bool) -> NodeId {
        match self.nodes[id] {
            HuffmanNode::Node { right, .. } if bit => right,
            HuffmanNode::Node { left, .. } => left,
            HuffmanNode::Leaf { .. } => unreachable!("decode cursor rests on a leaf"),
        }
    }

    /// Write the tree depth-first, pre-order: `1` and the eight bits of the
    /// byte for a leaf, `0` followed by both subtrees for a node.
    pub fn write_tree<S: BitSink>(&self, bits: &mut S) -> io::Result<()> {
        self.write_node(self.root, bits)
    }

    fn write_node<S: BitSink>(&self, id: NodeId, bits: &mut S) -> io::Result<()> {
        match self.nodes[id] {
            HuffmanNode::Leaf { byte, .. } => {
                bits.write_bit(true)?;
                for &bit in byte.bits::<Msb0>().iter() {
                    bits.write_bit(bit)?;
                }
                Ok(())
            }
            HuffmanNode::Node { left, right, .. } => {
                bits.write_bit(false)?;
                self.write_node(left, bits)?;
                self.write_node(right, bits)
            }
        }
    }

    /// Read back a tree written by [`write_tree`](Self::write_tree).
    ///
    /// The result has the same shape and therefore the same codes, but every
    /// frequency is zero.
    pub fn read_tree<S: BitSource>(bits: &mut S) -> Result<Self> {
        let mut tree = HuffmanCodingTree {
            nodes: Vec::new(),
            root: 0,
        };
        let start = bits.position();
        let root = tree.read_node(bits, &mut [None; 256], 0, None)?;
        if tree.nodes[root].is_leaf() {
            return Err(Error::Corrupt {
                position: start,
                reason: "code tree root is a leaf",
            });
        }
        tree.root = root;
        Ok(tree)
    }

    fn read_node<S: BitSource>(
        &mut self,
        bits: &mut S,
        leaves: &mut [Option<NodeId>; 256],
        depth: usize,
        twin: Option<NodeId>,
    ) -> Result<NodeId> {
        let position = bits.position();
        match bits.read_bit()? {
            Some(true) => {
                let mut leaf: BitVec<Msb0, u8> = BitVec::new();
                for _ in 0..8 {
                    match bits.read_bit()? {
                        Some(bit) => leaf.push(bit),
                        None => return Err(Error::Truncated { position }),
                    }
                }
                let byte = leaf.into_vec()[0];
                match leaves[byte as usize] {
                    Some(id) if twin == Some(id) => Ok(id),
                    Some(_) => Err(Error::Corrupt {
                        position,
                        reason: "byte appears in more than one leaf",
                    }),
                    None => {
                        let id = self.nodes.len();
                        self.nodes.push(HuffmanNode::Leaf { byte, frequency: 0 });
                        leaves[byte as usize] = Some(id);
                        Ok(id)
                    }
                }
            }
            Some(false) => {
                if depth >= MAX_DEPTH {
                    return Err(Error::Corrupt {
                        position,
                        reason: "code tree is deeper than any tree over 256 bytes",
                    });
                }
                let left = self.read_node(bits, leaves, depth + 1, None)?;
                // Only the single-byte root may reach one leaf from both sides.
                let twin = if depth == 0 && self.nodes[left].is_leaf() {
                    Some(left)
                } else {
                    None
                };
                let right = self.read_node(bits, leaves, depth + 1, twin)?;
                let id = self.nodes.len();
                self.nodes.push(HuffmanNode::Node {
                    left,
                    right,
                    frequency: 0,
                });
                Ok(id)
            }
            None => Err(Error::Truncated { position }),
        }
    }

    fn fmt_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        id: NodeId,
        depth: usize,
        edge: &str,
    ) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self.nodes[id] {
            HuffmanNode::Leaf { byte, frequency } => writeln!(
                f,
                "{}{} {:#04x} '{}' ({})",
                indent,
                edge,
                byte,
                ascii::escape_default(byte),
                frequency
            ),
            HuffmanNode::Node {
                left,
                right,
                frequency,
            } => {
                writeln!(f, "{}{} * ({})", indent, edge, frequency)?;
                self.fmt_node(f, left, depth + 1, "0")?;
                self.fmt_node(f, right, depth + 1, "1")
            }
        }
    }
}

impl fmt::Display for HuffmanCodingTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.root, 0, "-")
    }
}
