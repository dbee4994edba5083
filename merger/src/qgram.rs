//! Shared q-gram index and the SWIFT-style candidate filter on top of
//! it. Q-grams are packed two bits per base; windows containing an
//! ambiguous base are not indexed. The map keyed by the packed code
//! plays the role of an open-addressing directory: no table of size
//! 4^q is ever materialized.

use std::collections::HashMap;

fn ord_value(base: u8) -> Option<u64> {
    match base {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

/// Call `f(start, code)` for every unambiguous q-gram window of `seq`,
/// in order of the start position.
fn each_qgram<F: FnMut(usize, u64)>(seq: &[u8], q: usize, mut f: F) {
    assert!(0 < q && q < 32, "q-gram length must be in 1..32");
    if seq.len() < q {
        return;
    }
    let mask = (1u64 << (2 * q)) - 1;
    let mut code = 0u64;
    let mut valid = 0usize;
    for (i, &base) in seq.iter().enumerate() {
        match ord_value(base) {
            Some(value) => {
                code = ((code << 2) | value) & mask;
                valid += 1;
            }
            None => {
                code = 0;
                valid = 0;
            }
        }
        if valid >= q {
            f(i + 1 - q, code);
        }
    }
}

/// A candidate region reported by the SWIFT filter: the query shares at
/// least the q-gram-lemma number of q-grams with reference sequence
/// `seq_no` inside one diagonal bucket. `hstk_pos` and `ndl_pos` are
/// the query/reference coordinates of the bucket's topmost hit, so
/// `hstk_pos - ndl_pos` is the largest diagonal in the bucket; `delta`
/// and `overlap` bound how far below that diagonal the remaining hits
/// and any indels can sit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwiftHit {
    pub seq_no: usize,
    pub hstk_pos: usize,
    pub ndl_pos: usize,
    pub delta: usize,
    pub overlap: usize,
}

impl SwiftHit {
    /// The diagonal `hstk_pos - ndl_pos` of the bucket's topmost hit.
    pub fn diagonal(&self) -> i64 {
        self.hstk_pos as i64 - self.ndl_pos as i64
    }
}

/// Q-gram index over a set of reference sequences, queried with whole
/// contigs by the partitioner.
#[derive(Debug, Clone)]
pub struct QGramIndex {
    q: usize,
    /// Packed q-gram code -> occurrences as (sequence index, offset).
    occurrences: HashMap<u64, Vec<(u32, u32)>>,
}

impl QGramIndex {
    pub fn new<S: AsRef<[u8]>>(seqs: &[S], q: usize) -> Self {
        let mut occurrences: HashMap<u64, Vec<(u32, u32)>> = HashMap::new();
        for (seq_no, seq) in seqs.iter().enumerate() {
            each_qgram(seq.as_ref(), q, |pos, code| {
                occurrences
                    .entry(code)
                    .or_default()
                    .push((seq_no as u32, pos as u32));
            });
        }
        Self { q, occurrences }
    }

    pub fn q(&self) -> usize {
        self.q
    }

    /// SWIFT-style filtration: report every (reference, diagonal bucket)
    /// that collects enough q-gram hits from `query` to admit a local
    /// match of length `min_length` at error rate `error_rate`.
    /// Hits are ordered by query position; an empty result is normal.
    pub fn swift_hits(&self, query: &[u8], error_rate: f64, min_length: usize) -> Vec<SwiftHit> {
        assert!(0.0 < error_rate && error_rate < 1.0);
        let errors = (error_rate * min_length as f64).floor() as usize;
        // Q-gram lemma: an epsilon-match of length min_length keeps at
        // least this many q-grams intact.
        let threshold = (min_length + 1)
            .saturating_sub(self.q * (errors + 1))
            .max(1);
        let overlap = errors;
        let delta = (overlap + 1).next_power_of_two().max(16);
        // Top hit and count per (reference, diagonal bucket).
        let mut buckets: HashMap<(usize, i64), (usize, SwiftHit)> = HashMap::new();
        each_qgram(query, self.q, |i, code| {
            let Some(occs) = self.occurrences.get(&code) else {
                return;
            };
            for &(seq_no, j) in occs.iter() {
                let diag = i as i64 - j as i64;
                let key = (seq_no as usize, diag.div_euclid(delta as i64));
                let hit = SwiftHit {
                    seq_no: seq_no as usize,
                    hstk_pos: i,
                    ndl_pos: j as usize,
                    delta,
                    overlap,
                };
                let entry = buckets.entry(key).or_insert((0, hit));
                entry.0 += 1;
                if diag > entry.1.diagonal() {
                    entry.1 = hit;
                }
            }
        });
        let mut hits: Vec<SwiftHit> = buckets
            .into_values()
            .filter(|&(count, _)| count >= threshold)
            .map(|(_, hit)| hit)
            .collect();
        hits.sort_by_key(|hit| (hit.hstk_pos, hit.seq_no, hit.ndl_pos));
        hits
    }
}

/// The diagonal `pos_in_seq2 - pos_in_seq1` collecting the most q-gram
/// hits between the two sequences, used to seed a banded alignment.
/// Falls back to `q * 2 / 3` when no q-gram matches at all; `None` is
/// the sentinel for "no usable diagonal, align unbanded", returned once
/// the reduced q drops below 3 or q exceeds either sequence.
pub fn best_diagonal(seq1: &[u8], seq2: &[u8], q: usize) -> Option<i64> {
    if q < 3 || q > seq1.len() || q > seq2.len() {
        return None;
    }
    let len1 = seq1.len();
    let mut occurrences: HashMap<u64, Vec<usize>> = HashMap::new();
    each_qgram(seq1, q, |pos, code| {
        occurrences.entry(code).or_default().push(pos);
    });
    let mut counters = vec![0usize; len1 + seq2.len()];
    each_qgram(seq2, q, |i, code| {
        if let Some(occs) = occurrences.get(&code) {
            for &j in occs.iter() {
                counters[(len1 + i) - j] += 1;
            }
        }
    });
    let (best, &count) = counters
        .iter()
        .enumerate()
        .max_by_key(|&(index, count)| (count, std::cmp::Reverse(index)))
        .unwrap();
    if count == 0 {
        return best_diagonal(seq1, seq2, q * 2 / 3);
    }
    Some(best as i64 - len1 as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256StarStar;

    fn random_seq<R: Rng>(rng: &mut R, len: usize, alphabet: &[u8]) -> Vec<u8> {
        (0..len)
            .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
            .collect()
    }

    #[test]
    fn each_qgram_skips_ambiguous_windows() {
        let mut starts = vec![];
        each_qgram(b"ACGTNACGTT", 4, |pos, _| starts.push(pos));
        // Windows 1..=4 contain the N.
        assert_eq!(starts, vec![0, 5, 6]);
    }

    #[test]
    fn identical_sequence_is_its_own_hit() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(7);
        let seq = random_seq(&mut rng, 300, b"ACGT");
        let index = QGramIndex::new(&[seq.clone()], 11);
        let hits = index.swift_hits(&seq, 0.05, 50);
        assert!(!hits.is_empty());
        assert!(hits.iter().any(|hit| hit.diagonal() == 0));
    }

    #[test]
    fn unrelated_sequences_yield_no_hit() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(11);
        let seq_a = random_seq(&mut rng, 200, b"AC");
        let seq_b = random_seq(&mut rng, 200, b"GT");
        let index = QGramIndex::new(&[seq_a], 11);
        assert!(index.swift_hits(&seq_b, 0.05, 50).is_empty());
    }

    #[test]
    fn shared_segment_reports_its_diagonal() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(13);
        let shared = random_seq(&mut rng, 150, b"ACGT");
        let prefix = random_seq(&mut rng, 100, b"ACGT");
        let reference: Vec<u8> = [prefix, shared.clone()].concat();
        let index = QGramIndex::new(&[reference], 11);
        let hits = index.swift_hits(&shared, 0.05, 50);
        // The shared block sits 100 bases into the reference.
        assert!(hits.iter().any(|hit| hit.diagonal() == -100));
        for hit in hits.iter() {
            assert_eq!(hit.seq_no, 0);
        }
    }

    #[test]
    fn band_from_hit_covers_the_match_diagonal() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(17);
        let shared = random_seq(&mut rng, 120, b"ACGT");
        let query: Vec<u8> = [random_seq(&mut rng, 60, b"ACGT"), shared.clone()].concat();
        let index = QGramIndex::new(&[shared], 11);
        let hits = index.swift_hits(&query, 0.05, 50);
        assert!(!hits.is_empty());
        // The true diagonal of the match is +60.
        assert!(hits.iter().any(|hit| {
            let upper = hit.diagonal();
            let lower = upper - hit.delta as i64 - hit.overlap as i64;
            lower <= 60 && 60 <= upper
        }));
    }

    #[test]
    fn best_diagonal_of_shifted_copy() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(19);
        let seq1 = random_seq(&mut rng, 200, b"ACGT");
        let seq2: Vec<u8> = [random_seq(&mut rng, 25, b"ACGT"), seq1.clone()].concat();
        assert_eq!(best_diagonal(&seq1, &seq2, 11), Some(25));
    }

    #[test]
    fn best_diagonal_falls_back_to_smaller_q() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(23);
        // Only an 8-base block is shared, so q=11 finds nothing and the
        // 2/3 reduction to q=7 must take over.
        let shared = b"ACGTACGT".to_vec();
        let seq1: Vec<u8> = [random_seq(&mut rng, 40, b"AC"), shared.clone()].concat();
        let seq2: Vec<u8> = [random_seq(&mut rng, 70, b"GT"), shared].concat();
        assert_eq!(best_diagonal(&seq1, &seq2, 11), Some(30));
    }

    #[test]
    fn best_diagonal_sentinel_when_nothing_matches() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(29);
        let seq1 = random_seq(&mut rng, 100, b"AC");
        let seq2 = random_seq(&mut rng, 100, b"GT");
        assert_eq!(best_diagonal(&seq1, &seq2, 11), None);
        // q longer than either sequence is the sentinel immediately.
        assert_eq!(best_diagonal(&seq1, b"ACGTACGTA", 11), None);
    }
}
