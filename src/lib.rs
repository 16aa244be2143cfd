//! Byte-oriented Huffman coding.
//!
//! The pipeline runs in four stages, each usable on its own:
//!
//! 1. [`count_frequencies`] counts how often every byte occurs,
//! 2. [`build_tree`] merges the rarest bytes first into a code tree,
//! 3. [`derive_codes`] reads every byte's code off the tree,
//! 4. [`encode`] and [`decode`] translate between bytes and bits.
//!
//! An empty input is carried through the stages as `None`: no frequency
//! table, no tree, an empty code table, and nothing to decode.
//!
//! [`compress`] and [`decompress`] wrap the whole pipeline into a single
//! buffer that also stores the tree, the exact number of meaningful bits and
//! the number of original bytes.

pub mod bits;
pub mod codec;
pub mod coding;
pub mod error;
pub mod frequency;
pub mod tree;

pub use {
    bits::{BitCursor, BitSink, BitSource},
    codec::{decode, decode_exact, encode},
    coding::HuffmanCoding,
    error::{Error, Result},
    frequency::ByteFrequency,
    tree::{HuffmanCodingTree, HuffmanNode, NodeId},
};

use {
    bitvec::prelude::*,
    std::{convert::TryFrom, io::prelude::*},
};

/// Size of the trailer at the end of a compressed buffer: the bit count,
/// then the byte count.
const TRAILER_LEN: usize = 16;

/// Count every byte `source` yields. `None` means the source was empty.
pub fn count_frequencies<R: Read>(source: R) -> Result<Option<ByteFrequency>> {
    Ok(ByteFrequency::read_from(source)?)
}

/// Build the code tree for `frequency`, or no tree for an empty input.
pub fn build_tree(frequency: Option<&ByteFrequency>) -> Result<Option<HuffmanCodingTree>> {
    frequency.map(HuffmanCodingTree::of).transpose()
}

/// Read the code table off `tree`. Without a tree the table is empty.
pub fn derive_codes(tree: Option<&HuffmanCodingTree>) -> HuffmanCoding {
    tree.map(HuffmanCoding::of).unwrap_or_default()
}

/// Compress `bytes` into a self-describing buffer.
///
/// The buffer holds the code tree (depth-first, pre-order), the code of
/// every byte, padding up to a whole byte, and finally the number of
/// meaningful bits and the number of original bytes, each a little-endian
/// `u64`.
pub fn compress(bytes: &[u8]) -> Result<Vec<u8>> {
    let byte_frequency = ByteFrequency::of(bytes);
    log::trace!("Byte frequency: {:?}", byte_frequency);

    let tree = build_tree(byte_frequency.as_ref())?;
    log::trace!("Huffman tree: {:?}", tree);

    let coding = derive_codes(tree.as_ref());
    log::trace!("Huffman coding: {:?}", coding);

    let mut bits: BitVec<Local, u8> = BitVec::new();
    // The tree goes first because it is needed to decode the rest.
    if let Some(tree) = &tree {
        tree.write_tree(&mut bits)?;
    }
    let header_bits = bits.len();
    let payload_bits = encode(&coding, bytes, &mut bits)?;
    log::debug!(
        "Compressed {} bytes into {} tree bits and {} payload bits",
        bytes.len(),
        header_bits,
        payload_bits
    );

    let bit_count = bits.len() as u64;
    let mut vec = bits.into_vec();
    vec.extend_from_slice(&bit_count.to_le_bytes());
    vec.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
    Ok(vec)
}

/// Reverse [`compress`].
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    if bytes.len() < TRAILER_LEN {
        return Err(Error::Corrupt {
            position: 0,
            reason: "missing trailer",
        });
    }
    let (body, trailer) = bytes.split_at(bytes.len() - TRAILER_LEN);
    let mut raw = [0; 8];
    raw.copy_from_slice(&trailer[..8]);
    let bit_count = u64::from_le_bytes(raw);
    raw.copy_from_slice(&trailer[8..]);
    let byte_count = u64::from_le_bytes(raw);

    let available = body.len() as u64 * 8;
    if bit_count > available || available - bit_count >= 8 {
        return Err(Error::Corrupt {
            position: body.len() as u64 * 8,
            reason: "bit count does not match the compressed length",
        });
    }
    let bit_count = usize::try_from(bit_count).map_err(|_| Error::Corrupt {
        position: body.len() as u64 * 8,
        reason: "bit count does not fit in memory",
    })?;
    let bits = &BitSlice::<Local, u8>::from_slice(body)[..bit_count];

    let mut out = Vec::new();
    match (bits.is_empty(), byte_count == 0) {
        (true, true) => return Ok(out),
        (false, false) => {}
        _ => {
            return Err(Error::Corrupt {
                position: body.len() as u64 * 8,
                reason: "only one of the bit count and the byte count is zero",
            })
        }
    }
    let mut cursor = BitCursor::new(bits);
    let tree = HuffmanCodingTree::read_tree(&mut cursor)?;
    log::trace!("Huffman tree: {:?}", tree);
    let header_bits = cursor.position();

    // Read-back trees carry no frequencies, so the trailer says when to stop.
    decode_exact(Some(&tree), &mut cursor, &mut out, Some(byte_count))?;
    log::debug!(
        "Decompressed {} tree bits and {} payload bits into {} bytes",
        header_bits,
        cursor.position() - header_bits,
        out.len()
    );
    Ok(out)
}
