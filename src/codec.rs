//! Turning bytes into codes and codes back into bytes.

use {
    crate::{
        bits::{BitSink, BitSource},
        coding::HuffmanCoding,
        error::{Error, Result},
        tree::{HuffmanCodingTree, HuffmanNode},
    },
    std::io::{self, prelude::*},
};

/// Write the code of every byte of `source` to `bits`, in order.
///
/// Returns the number of bits written. A byte without a code aborts the
/// encoding; whatever was written before it stays in `bits`.
pub fn encode<R: Read, S: BitSink>(
    coding: &HuffmanCoding,
    mut source: R,
    bits: &mut S,
) -> Result<u64> {
    let mut buf = [0; 8 * 1024];
    let mut offset = 0u64;
    let mut written = 0u64;
    loop {
        let read = match source.read(&mut buf) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        for &byte in &buf[..read] {
            let code = coding
                .get(byte)
                .ok_or(Error::UnknownSymbol { byte, offset })?;
            bits.write_bits(code)?;
            written += code.len() as u64;
            offset += 1;
        }
    }
    log::trace!("Encoded {} bytes into {} bits", offset, written);
    Ok(written)
}

/// Walk `tree` with the bits of `source` and write a byte at every leaf.
///
/// Returns the number of bytes written. Without a tree the input was empty:
/// nothing is read and nothing is written.
///
/// A tree built from a [`ByteFrequency`](crate::ByteFrequency) knows how
/// many bytes it encodes, and decoding expects exactly that many; see
/// [`decode_exact`]. A tree without frequencies, as read back by
/// [`HuffmanCodingTree::read_tree`], decodes until `source` is exhausted.
pub fn decode<S: BitSource, W: Write>(
    tree: Option<&HuffmanCodingTree>,
    bits: &mut S,
    sink: W,
) -> Result<u64> {
    let expected = match tree.map(HuffmanCodingTree::frequency) {
        None | Some(0) => None,
        Some(frequency) => Some(frequency as u64),
    };
    decode_exact(tree, bits, sink, expected)
}

/// [`decode`] with an explicit byte count.
///
/// With `Some(count)`, bits that end before `count` bytes are complete fail
/// with [`Error::Truncated`], and bits left over after them fail with
/// [`Error::Corrupt`]. With `None`, decoding runs until `source` is
/// exhausted and only a code cut in half is reported. The incomplete byte is
/// never written.
pub fn decode_exact<S: BitSource, W: Write>(
    tree: Option<&HuffmanCodingTree>,
    bits: &mut S,
    sink: W,
    expected: Option<u64>,
) -> Result<u64> {
    let tree = match tree {
        Some(tree) => tree,
        None => return Ok(0),
    };

    let mut sink = io::BufWriter::new(sink);
    let mut cursor = tree.root();
    let mut start = bits.position();
    let mut decoded = 0u64;
    while expected.map_or(true, |expected| decoded < expected) {
        let bit = match bits.read_bit()? {
            Some(bit) => bit,
            None => break,
        };
        cursor = tree.step(cursor, bit);
        if let HuffmanNode::Leaf { byte, .. } = *tree.node(cursor) {
            sink.write_all(&[byte])?;
            decoded += 1;
            cursor = tree.root();
            start = bits.position();
        }
    }
    sink.flush()?;

    if cursor != tree.root() || expected.map_or(false, |expected| decoded < expected) {
        return Err(Error::Truncated { position: start });
    }
    if expected.is_some() && bits.read_bit()?.is_some() {
        return Err(Error::Corrupt {
            position: start,
            reason: "bits left over after the last byte",
        });
    }
    log::trace!("Decoded {} bytes", decoded);
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{bits::BitCursor, frequency::ByteFrequency},
        bitvec::prelude::*,
    };

    fn tree_of(bytes: &[u8]) -> HuffmanCodingTree {
        HuffmanCodingTree::of(&ByteFrequency::of(bytes).unwrap()).unwrap()
    }

    #[test]
    fn no_tree_reads_nothing() {
        let mut bits: BitVec<Local, u8> = BitVec::new();
        bits.push(true);
        let mut cursor = BitCursor::new(&bits);
        let mut out = Vec::new();
        assert_eq!(decode(None, &mut cursor, &mut out).unwrap(), 0);
        assert!(out.is_empty());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn unknown_byte_reports_its_offset() {
        let coding = HuffmanCoding::of(&tree_of(b"ab"));
        let mut bits: BitVec<Local, u8> = BitVec::new();
        match encode(&coding, &b"abba!"[..], &mut bits) {
            Err(Error::UnknownSymbol { byte: b'!', offset: 4 }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn one_bit_short_of_the_last_byte_is_truncated() {
        // b=0, a=1
        let tree = tree_of(b"aaab");
        let coding = HuffmanCoding::of(&tree);
        let mut bits: BitVec<Local, u8> = BitVec::new();
        encode(&coding, &b"aaab"[..], &mut bits).unwrap();

        let mut out = Vec::new();
        match decode(Some(&tree), &mut BitCursor::new(&bits[..3]), &mut out) {
            Err(Error::Truncated { position: 3 }) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(out, b"aaa");
    }

    #[test]
    fn bits_past_the_last_byte_are_corrupt() {
        let tree = tree_of(b"aaab");
        let coding = HuffmanCoding::of(&tree);
        let mut bits: BitVec<Local, u8> = BitVec::new();
        encode(&coding, &b"aaab"[..], &mut bits).unwrap();
        bits.push(true);

        let mut out = Vec::new();
        match decode(Some(&tree), &mut BitCursor::new(&bits), &mut out) {
            Err(Error::Corrupt { position: 4, .. }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn without_a_count_decoding_runs_to_exhaustion() {
        let tree = tree_of(b"aaab");
        let coding = HuffmanCoding::of(&tree);
        let mut bits: BitVec<Local, u8> = BitVec::new();
        encode(&coding, &b"aaabba"[..], &mut bits).unwrap();

        let mut out = Vec::new();
        let decoded = decode_exact(Some(&tree), &mut BitCursor::new(&bits), &mut out, None);
        assert_eq!(decoded.unwrap(), 6);
        assert_eq!(out, b"aaabba");
    }

    #[test]
    fn truncation_points_at_the_incomplete_code() {
        // a=1, b=00, c=01
        let tree = tree_of(b"aaabc");
        let coding = HuffmanCoding::of(&tree);
        let mut bits: BitVec<Local, u8> = BitVec::new();
        assert_eq!(encode(&coding, &b"aaabc"[..], &mut bits).unwrap(), 7);

        let mut out = Vec::new();
        let result = decode(Some(&tree), &mut BitCursor::new(&bits[..6]), &mut out);
        match result {
            Err(Error::Truncated { position: 5 }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
