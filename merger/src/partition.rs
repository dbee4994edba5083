//! All-pairs contig partitioning. One q-gram index is built over every
//! surviving contig; each contig owned by the batch is then streamed
//! against it through the SWIFT filter, candidates are verified with a
//! banded alignment, and verified pairs drive the twin-closed
//! union-find. The result is the aligned-pair set and the implied
//! component partition.

use crate::align::{local_alignment, Scoring};
use crate::error::MergeError;
use crate::find_union::FindUnion;
use crate::qgram::QGramIndex;
use definitions::{Contig, ContigBatch};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{BufRead, Write};
use std::path::Path;

/// Components beyond this size stop collecting further alignments from
/// the current contig; the component keeps growing through its other
/// members.
const COMPONENT_CUTOFF: usize = 100;

#[derive(Debug, Clone)]
pub struct PartitionConfig {
    /// Shape length of the shared q-gram index.
    pub qgram_length: usize,
    /// SWIFT filter error rate, in (0, 1).
    pub error_rate: f64,
    /// SWIFT minimal match length.
    pub minimal_length: usize,
    pub match_score: i32,
    pub error_penalty: i32,
    /// Verification threshold: a pair is kept if its banded local
    /// alignment scores strictly above this.
    pub min_score: i32,
}

impl PartitionConfig {
    pub fn new(
        qgram_length: usize,
        error_rate: f64,
        minimal_length: usize,
        match_score: i32,
        error_penalty: i32,
        min_score: i32,
    ) -> Self {
        Self {
            qgram_length,
            error_rate,
            minimal_length,
            match_score,
            error_penalty,
            min_score,
        }
    }
}

impl std::default::Default for PartitionConfig {
    fn default() -> Self {
        Self {
            qgram_length: 21,
            error_rate: 0.01,
            minimal_length: 100,
            match_score: 1,
            error_penalty: -5,
            min_score: 90,
        }
    }
}

/// Discover aligned pairs among the batch's contigs and join their
/// components. `contigs` maps global forward ids to surviving contigs;
/// `uf` spans the twin-closed id space `0..2N`.
pub fn partition_contigs(
    uf: &mut FindUnion,
    aligned_pairs: &mut BTreeSet<(usize, usize)>,
    contigs: &BTreeMap<usize, Contig>,
    batch: &ContigBatch,
    config: &PartitionConfig,
) -> Result<(), MergeError> {
    if contigs.is_empty() {
        return Err(MergeError::EmptyInput);
    }
    assert_eq!(uf.len(), batch.total_ids());
    debug!("START\tPartition");
    let ids: Vec<usize> = contigs.keys().copied().collect();
    let seqs: Vec<&[u8]> = contigs.values().map(|contig| contig.seq.as_slice()).collect();
    debug!("PARTITION\tIndexing\t{}", seqs.len());
    let index = QGramIndex::new(&seqs, config.qgram_length);
    let scoring = Scoring::new(config.match_score, config.error_penalty);
    let diag_extension = (config.min_score / 10) as i64;

    let mut comparisons = 0usize;
    let offset = batch.index_offset();
    for a in offset..offset + batch.batch_size() {
        let Some(contig_a) = contigs.get(&a) else {
            continue;
        };
        'finder: for hit in index.swift_hits(&contig_a.seq, config.error_rate, config.minimal_length) {
            let b = ids[hit.seq_no];
            let contig_b = &contigs[&b];
            // Only alignments across samples are evidence.
            if contig_a.id.sample == contig_b.id.sample {
                continue;
            }
            if uf.same(a, b) {
                continue;
            }
            let upper = hit.diagonal() + diag_extension;
            let lower =
                hit.diagonal() - hit.delta as i64 - hit.overlap as i64 - diag_extension;
            comparisons += 1;
            let aln = local_alignment(&contig_a.seq, &contig_b.seq, scoring, Some((lower, upper)));
            if aln.score <= config.min_score {
                continue;
            }
            aligned_pairs.insert((a, b));
            uf.unite(a, b);
            uf.unite(batch.rc_id(a), batch.rc_id(b));
            if uf.size(a) > COMPONENT_CUTOFF {
                break 'finder;
            }
        }
    }
    debug!("PARTITION\tComparisons\t{}", comparisons);
    debug!("PARTITION\tValidAlignments\t{}", aligned_pairs.len());
    Ok(())
}

/// Write the aligned-pair set, one `<a> <b>` line per pair.
pub fn write_aligned_pairs<W: Write>(
    wtr: &mut W,
    aligned_pairs: &BTreeSet<(usize, usize)>,
) -> Result<(), MergeError> {
    for &(a, b) in aligned_pairs.iter() {
        writeln!(wtr, "{} {}", a, b)?;
    }
    Ok(())
}

/// Read aligned pairs from one pair file, joining every loaded edge and
/// its reverse-complement twin edge. Lines whose endpoints are already
/// in the same component are accepted and skipped. Returns the number
/// of pairs loaded.
///
/// `total` is N, the number of forward contigs; ids must be below 2N.
pub fn read_aligned_pairs<R: BufRead>(
    uf: &mut FindUnion,
    aligned_pairs: &mut BTreeSet<(usize, usize)>,
    rdr: R,
    file: &Path,
    total: usize,
) -> Result<usize, MergeError> {
    let malformed = |line: usize, reason: &str| MergeError::MalformedPairFile {
        file: file.to_path_buf(),
        line,
        reason: reason.to_string(),
    };
    let mut num_pairs = 0;
    for (index, line) in rdr.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(key), Some(value), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(malformed(index + 1, "expected two ids"));
        };
        let (Ok(key), Ok(value)) = (key.parse::<usize>(), value.parse::<usize>()) else {
            return Err(malformed(index + 1, "ids must be non-negative integers"));
        };
        if key >= 2 * total || value >= 2 * total {
            return Err(malformed(index + 1, "id out of range"));
        }
        let key_rev = if key < total { key + total } else { key - total };
        let value_rev = if value < total { value + total } else { value - total };
        if uf.same(key, value) {
            continue;
        }
        aligned_pairs.insert((key, value));
        num_pairs += 1;
        uf.unite(key, value);
        uf.unite(key_rev, value_rev);
    }
    debug!("PARTITION\tLoaded\t{}\t{}", file.display(), num_pairs);
    Ok(num_pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use definitions::ContigId;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256StarStar;

    fn random_seq<R: Rng>(rng: &mut R, len: usize) -> Vec<u8> {
        (0..len).map(|_| b"ACGT"[rng.gen_range(0..4)]).collect()
    }

    fn contig(sample: &str, name: &str, seq: Vec<u8>) -> Contig {
        let id = ContigId {
            sample: sample.to_string(),
            name: name.to_string(),
            forward: true,
        };
        Contig::new(id, seq)
    }

    fn test_config() -> PartitionConfig {
        PartitionConfig::new(11, 0.05, 50, 1, -5, 100)
    }

    fn batch_of(n: usize) -> ContigBatch {
        let mut batch = ContigBatch::new(vec![], 0, 1);
        batch.contigs_in_total = n;
        batch
    }

    #[test]
    fn identical_cross_sample_contigs_pair_up() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(42);
        let seq = random_seq(&mut rng, 500);
        let contigs: BTreeMap<usize, Contig> = vec![
            (0, contig("0", "c0", seq.clone())),
            (1, contig("1", "c0", seq)),
        ]
        .into_iter()
        .collect();
        let batch = batch_of(2);
        let mut uf = FindUnion::new(batch.total_ids());
        let mut pairs = BTreeSet::new();
        partition_contigs(&mut uf, &mut pairs, &contigs, &batch, &test_config()).unwrap();
        assert_eq!(pairs, vec![(0, 1)].into_iter().collect());
        assert!(uf.same(0, 1));
        assert!(uf.same(2, 3));
        assert!(!uf.same(0, 2));
        // Twin closure: components of twins have equal sizes.
        for i in 0..4 {
            assert_eq!(uf.size(i), uf.size(batch.rc_id(i)));
        }
    }

    #[test]
    fn same_sample_contigs_stay_apart() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(43);
        let seq = random_seq(&mut rng, 500);
        let contigs: BTreeMap<usize, Contig> = vec![
            (0, contig("0", "c0", seq.clone())),
            (1, contig("0", "c1", seq)),
        ]
        .into_iter()
        .collect();
        let batch = batch_of(2);
        let mut uf = FindUnion::new(batch.total_ids());
        let mut pairs = BTreeSet::new();
        partition_contigs(&mut uf, &mut pairs, &contigs, &batch, &test_config()).unwrap();
        assert!(pairs.is_empty());
        for i in 0..4 {
            assert_eq!(uf.size(i), 1);
        }
    }

    #[test]
    fn unrelated_contigs_stay_apart() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(44);
        let contigs: BTreeMap<usize, Contig> = vec![
            (0, contig("0", "c0", random_seq(&mut rng, 400))),
            (1, contig("1", "c0", random_seq(&mut rng, 400))),
        ]
        .into_iter()
        .collect();
        let batch = batch_of(2);
        let mut uf = FindUnion::new(batch.total_ids());
        let mut pairs = BTreeSet::new();
        partition_contigs(&mut uf, &mut pairs, &contigs, &batch, &test_config()).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn no_contigs_is_empty_input() {
        let contigs = BTreeMap::new();
        let batch = batch_of(0);
        let mut uf = FindUnion::new(0);
        let mut pairs = BTreeSet::new();
        let err =
            partition_contigs(&mut uf, &mut pairs, &contigs, &batch, &test_config()).unwrap_err();
        assert!(matches!(err, MergeError::EmptyInput));
    }

    #[test]
    fn overlapping_contigs_pair_up_on_their_diagonal() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(45);
        let shared = random_seq(&mut rng, 300);
        let left: Vec<u8> = [random_seq(&mut rng, 150), shared.clone()].concat();
        let right: Vec<u8> = [shared, random_seq(&mut rng, 150)].concat();
        let contigs: BTreeMap<usize, Contig> = vec![
            (0, contig("0", "c0", left)),
            (1, contig("1", "c0", right)),
        ]
        .into_iter()
        .collect();
        let batch = batch_of(2);
        let mut uf = FindUnion::new(batch.total_ids());
        let mut pairs = BTreeSet::new();
        partition_contigs(&mut uf, &mut pairs, &contigs, &batch, &test_config()).unwrap();
        assert_eq!(pairs, vec![(0, 1)].into_iter().collect());
    }

    #[test]
    fn pair_file_round_trip() {
        let pairs: BTreeSet<(usize, usize)> = vec![(0, 1), (1, 4)].into_iter().collect();
        let mut buffer = vec![];
        write_aligned_pairs(&mut buffer, &pairs).unwrap();
        assert_eq!(String::from_utf8(buffer.clone()).unwrap(), "0 1\n1 4\n");

        let mut uf = FindUnion::new(10);
        let mut loaded = BTreeSet::new();
        let n = read_aligned_pairs(&mut uf, &mut loaded, &buffer[..], Path::new("pairs"), 5)
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(loaded, pairs);
        assert!(uf.same(0, 4));
        // Twin edges are reconstructed from the id arithmetic.
        assert!(uf.same(5, 6));
        assert!(uf.same(6, 9));
    }

    #[test]
    fn redundant_pair_lines_are_skipped() {
        let input = b"0 1\n1 0\n0 1\n" as &[u8];
        let mut uf = FindUnion::new(4);
        let mut loaded = BTreeSet::new();
        let n = read_aligned_pairs(&mut uf, &mut loaded, input, Path::new("pairs"), 2).unwrap();
        assert_eq!(n, 1);
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn malformed_pair_lines_are_rejected() {
        let mut uf = FindUnion::new(8);
        let mut loaded = BTreeSet::new();
        for input in ["0 x", "7", "0 1 2", "0 99"] {
            let err = read_aligned_pairs(
                &mut uf,
                &mut loaded,
                input.as_bytes(),
                Path::new("pairs"),
                4,
            )
            .unwrap_err();
            assert!(matches!(err, MergeError::MalformedPairFile { .. }), "{}", input);
        }
    }
}
