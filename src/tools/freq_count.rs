use std::collections::BTreeMap;

use log::debug;

/// Occurrence counts for every byte value present in the input. Bytes that never occur have
/// no entry at all.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrequencyTable {
    counts: BTreeMap<u8, u64>,
    total: u64,
}

impl FrequencyTable {
    /// Returns a frequency count of the input data.
    pub fn from_bytes(data: &[u8]) -> Self {
        // Count into a flat array first, it is much faster than hitting the map for every byte.
        let mut freqs = [0_u64; 256];
        data.iter().for_each(|&el| freqs[el as usize] += 1);

        let counts: BTreeMap<u8, u64> = freqs
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(sym, &count)| (sym as u8, count))
            .collect();
        let table = Self {
            counts,
            total: data.len() as u64,
        };
        debug!(
            "Counted {} symbols, {} distinct",
            table.total,
            table.counts.len()
        );
        table
    }

    /// Count for `symbol`, or None if it never occurred.
    pub fn get(&self, symbol: u8) -> Option<u64> {
        self.counts.get(&symbol).copied()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts, which is the length of the counted input.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// (symbol, count) pairs in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts.iter().map(|(&sym, &count)| (sym, count))
    }
}

#[cfg(test)]
mod test {
    use super::FrequencyTable;

    #[test]
    fn counts_test() {
        let freqs = FrequencyTable::from_bytes(b"aaabbc");
        assert_eq!(freqs.get(b'a'), Some(3));
        assert_eq!(freqs.get(b'b'), Some(2));
        assert_eq!(freqs.get(b'c'), Some(1));
        assert_eq!(freqs.get(b'd'), None);
        assert_eq!(freqs.len(), 3);
        assert_eq!(freqs.total(), 6);
    }

    #[test]
    fn empty_test() {
        let freqs = FrequencyTable::from_bytes(&[]);
        assert!(freqs.is_empty());
        assert_eq!(freqs.total(), 0);
        assert_eq!(freqs.iter().count(), 0);
    }

    #[test]
    fn sorted_iter_test() {
        let freqs = FrequencyTable::from_bytes(&[255, 0, 7, 0, 255, 255]);
        let pairs: Vec<(u8, u64)> = freqs.iter().collect();
        assert_eq!(pairs, vec![(0, 2), (7, 1), (255, 3)]);
    }

    #[test]
    fn sum_matches_length_test() {
        let data = "Making a silly test.".as_bytes();
        let freqs = FrequencyTable::from_bytes(data);
        assert_eq!(freqs.iter().map(|(_, c)| c).sum::<u64>(), data.len() as u64);
        assert!(freqs.iter().all(|(_, c)| c >= 1));
    }
}
