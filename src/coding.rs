use {
    crate::{
        bits::render,
        frequency::ByteFrequency,
        tree::{HuffmanCodingTree, HuffmanNode, NodeId},
    },
    arr_macro::arr,
    bitvec::prelude::*,
    std::{ascii, fmt},
};

/// The code of every byte in a tree, ready for encoding.
///
/// The default table is empty; it is what an empty input gets.
pub struct HuffmanCoding {
    codings: [Option<BitBox<Local, u8>>; u8::MAX as usize + 1],
}

impl Default for HuffmanCoding {
    fn default() -> Self {
        HuffmanCoding {
            codings: arr![None; 256],
        }
    }
}

// Only the bytes that have a code.
impl fmt::Debug for HuffmanCoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(byte, code)| (byte, render(code))))
            .finish()
    }
}

impl fmt::Display for HuffmanCoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (byte, code) in self.iter() {
            writeln!(
                f,
                "{:#04x} '{}' {}",
                byte,
                ascii::escape_default(byte),
                render(code)
            )?;
        }
        Ok(())
    }
}

impl HuffmanCoding {
    /// Collect the root-to-leaf path of every leaf, 0 for left and 1 for right.
    pub fn of(tree: &HuffmanCodingTree) -> Self {
        let mut this = HuffmanCoding::default();
        let mut path = BitVec::new();
        this.apply(tree, tree.root(), &mut path);
        this
    }

    fn apply(&mut self, tree: &HuffmanCodingTree, id: NodeId, path: &mut BitVec<Local, u8>) {
        match *tree.node(id) {
            HuffmanNode::Leaf { byte, .. } => {
                let coding = &mut self.codings[byte as usize];
                debug_assert!(coding.is_none());
                *coding = Some(path.clone().into_boxed_bitslice());
            }
            HuffmanNode::Node { left, right, .. } => {
                path.push(false);
                self.apply(tree, left, path);
                path.pop();
                // The single-byte root reaches its leaf from both sides; keep the left path.
                if right != left {
                    path.push(true);
                    self.apply(tree, right, path);
                    path.pop();
                }
            }
        }
    }

    pub fn get(&self, byte: u8) -> Option<&BitSlice<Local, u8>> {
        self.codings[byte as usize].as_deref()
    }

    /// Every byte that has a code, in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &BitSlice<Local, u8>)> + '_ {
        (0..=u8::MAX)
            .zip(self.codings.iter())
            .filter_map(|(byte, coding)| Some((byte, coding.as_deref()?)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.codings.iter().all(Option::is_none)
    }

    /// Bits needed to encode an input with these byte counts.
    ///
    /// Counts of bytes without a code are ignored.
    pub fn encoded_len(&self, frequency: &ByteFrequency) -> u64 {
        frequency
            .iter()
            .filter_map(|(byte, count)| Some(count as u64 * self.get(byte)?.len() as u64))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coding_of(bytes: &[u8]) -> HuffmanCoding {
        let tree = HuffmanCodingTree::of(&ByteFrequency::of(bytes).unwrap()).unwrap();
        HuffmanCoding::of(&tree)
    }

    fn codes(coding: &HuffmanCoding) -> Vec<(u8, String)> {
        coding.iter().map(|(byte, code)| (byte, render(code))).collect()
    }

    #[test]
    fn default_is_empty() {
        let coding = HuffmanCoding::default();
        assert!(coding.is_empty());
        assert_eq!(coding.len(), 0);
        assert!(coding.get(0).is_none());
    }

    #[test]
    fn single_byte_gets_one_bit() {
        assert_eq!(codes(&coding_of(b"x")), vec![(b'x', "0".to_owned())]);
    }

    #[test]
    fn equal_weights_give_balanced_codes() {
        assert_eq!(
            codes(&coding_of(b"abcd")),
            vec![
                (b'a', "00".to_owned()),
                (b'b', "01".to_owned()),
                (b'c', "10".to_owned()),
                (b'd', "11".to_owned()),
            ]
        );
    }

    #[test]
    fn encoded_len_weights_code_lengths() {
        let bytes = b"aaabbc";
        let coding = coding_of(bytes);
        // c and b merge first, so a gets one bit and the others two.
        assert_eq!(coding.encoded_len(&ByteFrequency::of(bytes).unwrap()), 3 + 2 * 2 + 2);
    }
}
