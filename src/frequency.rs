use {
    crate::error::{Error, Result},
    std::{
        ascii, fmt,
        io::{self, prelude::*},
        ops::Index,
    },
};

const ALPHABET: usize = u8::MAX as usize + 1;

/// How often each byte value occurs in an input.
///
/// A `ByteFrequency` always counts at least one byte. An input without any
/// bytes has no frequency table at all, and every constructor reports that as
/// `None` so the later stages can treat empty input as its own case.
#[derive(Clone, PartialEq, Eq)]
pub struct ByteFrequency {
    bytes: [usize; ALPHABET],
}

impl Index<u8> for ByteFrequency {
    type Output = usize;

    fn index(&self, index: u8) -> &usize {
        &self.bytes[index as usize]
    }
}

// Only the bytes that occur; the full array is mostly zeroes.
impl fmt::Debug for ByteFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl fmt::Display for ByteFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (byte, frequency) in self.iter() {
            writeln!(f, "{:#04x} '{}' {}", byte, ascii::escape_default(byte), frequency)?;
        }
        Ok(())
    }
}

impl ByteFrequency {
    /// Count every byte of `bytes`.
    pub fn of(bytes: &[u8]) -> Option<Self> {
        let mut counts = [0; ALPHABET];
        for &byte in bytes {
            counts[byte as usize] += 1;
        }
        Self::new(counts)
    }

    /// Count every byte `source` yields until it reports end-of-stream.
    pub fn read_from<R: Read>(mut source: R) -> io::Result<Option<Self>> {
        let mut counts = [0; ALPHABET];
        let mut buf = [0; 8 * 1024];
        loop {
            let read = match source.read(&mut buf) {
                Ok(0) => break,
                Ok(read) => read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };
            for &byte in &buf[..read] {
                counts[byte as usize] += 1;
            }
        }
        Ok(Self::new(counts))
    }

    // Counts taken from real input cannot add up past the input length.
    fn new(counts: [usize; ALPHABET]) -> Option<Self> {
        if counts.iter().all(|&count| count == 0) {
            None
        } else {
            Some(ByteFrequency { bytes: counts })
        }
    }

    /// Use precomputed counts, indexed by byte value.
    ///
    /// The counts must add up to at most `usize::MAX`, the weight of the
    /// tree root.
    pub fn from_counts(counts: [usize; ALPHABET]) -> Result<Option<Self>> {
        counts
            .iter()
            .try_fold(0usize, |total, &count| total.checked_add(count))
            .ok_or(Error::CountOverflow)?;
        Ok(Self::new(counts))
    }

    /// Build from `(byte, count)` pairs. Repeated bytes add up.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u8, usize)>) -> Result<Option<Self>> {
        let mut counts = [0; ALPHABET];
        let mut total = 0usize;
        for (byte, count) in pairs {
            total = total.checked_add(count).ok_or(Error::CountOverflow)?;
            counts[byte as usize] += count;
        }
        Ok(Self::new(counts))
    }

    pub fn get(&self, byte: u8) -> Option<usize> {
        match self[byte] {
            0 => None,
            count => Some(count),
        }
    }

    /// The bytes that occur and their counts, in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
        (0..=u8::MAX)
            .zip(self.bytes.iter())
            .filter(|&(_, &frequency)| frequency > 0)
            .map(|(byte, &frequency)| (byte, frequency))
    }

    /// Number of distinct bytes.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Number of bytes counted.
    pub fn total(&self) -> usize {
        self.bytes.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_has_no_table() {
        assert_eq!(ByteFrequency::of(b""), None);
        assert_eq!(ByteFrequency::read_from(&b""[..]).unwrap(), None);
        assert_eq!(ByteFrequency::from_pairs(vec![(b'a', 0)]).unwrap(), None);
    }

    #[test]
    fn counts_only_present_bytes() {
        let frequency = ByteFrequency::of(b"abracadabra").unwrap();
        assert_eq!(
            frequency.iter().collect::<Vec<_>>(),
            vec![(b'a', 5), (b'b', 2), (b'c', 1), (b'd', 1), (b'r', 2)]
        );
        assert_eq!(frequency.get(b'z'), None);
        assert_eq!(frequency[b'z'], 0);
        assert_eq!(frequency.len(), 5);
        assert_eq!(frequency.total(), 11);
    }

    #[test]
    fn reader_agrees_with_slice() {
        let bytes: Vec<u8> = (0..20_000u32).map(|i| (i * 7 % 251) as u8).collect();
        assert_eq!(
            ByteFrequency::read_from(&bytes[..]).unwrap(),
            ByteFrequency::of(&bytes)
        );
    }

    #[test]
    fn pairs_accumulate() {
        let frequency = ByteFrequency::from_pairs(vec![(1, 2), (1, 3), (9, 1)])
            .unwrap()
            .unwrap();
        assert_eq!(frequency.get(1), Some(5));
        assert_eq!(frequency.get(9), Some(1));
    }

    #[test]
    fn counts_past_usize_max_are_rejected() {
        assert!(matches!(
            ByteFrequency::from_pairs(vec![(0, usize::MAX), (1, 1)]),
            Err(Error::CountOverflow)
        ));
        assert!(matches!(
            ByteFrequency::from_pairs(vec![(7, usize::MAX), (7, 1)]),
            Err(Error::CountOverflow)
        ));
        let mut counts = [0; ALPHABET];
        counts[3] = usize::MAX - 1;
        counts[200] = 2;
        assert!(matches!(ByteFrequency::from_counts(counts), Err(Error::CountOverflow)));

        counts[200] = 1;
        let frequency = ByteFrequency::from_counts(counts).unwrap().unwrap();
        assert_eq!(frequency.total(), usize::MAX);
    }

    #[test]
    fn read_errors_propagate() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
            }
        }
        assert!(ByteFrequency::read_from(Broken).is_err());
    }
}
