//! Low-complexity screening. Contigs whose average dinucleotide entropy
//! falls below the cutoff never enter partitioning; they are recorded in
//! the skipped-contig log together with the observed entropy.

use crate::error::MergeError;
use definitions::Contig;
use std::collections::BTreeMap;
use std::io::Write;

fn ord_value(base: u8) -> Option<usize> {
    match base {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

/// Average dinucleotide entropy of a sequence.
///
/// Counts the 16 dinucleotides over all adjacent pairs where neither
/// symbol is ambiguous, converts the counts to a distribution, and
/// returns its Shannon entropy divided by four. A sequence with no
/// countable dinucleotide (shorter than two bases, or all-N) scores 0.
pub fn average_entropy(seq: &[u8]) -> f64 {
    let mut di_counts = [0usize; 16];
    let mut counted = 0usize;
    for pair in seq.windows(2) {
        if let (Some(first), Some(second)) = (ord_value(pair[0]), ord_value(pair[1])) {
            di_counts[first + 4 * second] += 1;
            counted += 1;
        }
    }
    if counted == 0 {
        return 0.0;
    }
    let mut entropy = 0f64;
    for &count in di_counts.iter().filter(|&&count| count > 0) {
        let p = count as f64 / counted as f64;
        entropy -= p * p.log2();
    }
    entropy / 4.0
}

/// Remove low-entropy contigs from the map, logging each removed contig
/// as a FASTA-like record with its entropy to the skipped stream.
/// Fails with [MergeError::EmptyInput] if no contig survives.
pub fn filter_by_entropy<W: Write>(
    contigs: &mut BTreeMap<usize, Contig>,
    min_entropy: f64,
    skipped: &mut W,
) -> Result<(), MergeError> {
    let mut low_entropy = vec![];
    for (&index, contig) in contigs.iter() {
        let entropy = average_entropy(&contig.seq);
        if entropy < min_entropy {
            writeln!(skipped, ">{} (entropy filter, entropy: {})", contig.id, entropy)?;
            skipped.write_all(&contig.seq)?;
            writeln!(skipped)?;
            low_entropy.push(index);
        }
    }
    for index in low_entropy {
        debug!("ENTROPY\tSkip\t{}", index);
        contigs.remove(&index);
    }
    if contigs.is_empty() {
        return Err(MergeError::EmptyInput);
    }
    debug!("ENTROPY\tPassed\t{}", contigs.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use definitions::{Contig, ContigId};

    fn contig(index: usize, seq: &[u8]) -> (usize, Contig) {
        let id = ContigId {
            sample: format!("{:02}", index),
            name: format!("ctg{}", index),
            forward: true,
        };
        (index, Contig::new(id, seq.to_vec()))
    }

    #[test]
    fn homopolymer_has_zero_entropy() {
        assert_eq!(average_entropy(&vec![b'A'; 100]), 0.0);
    }

    #[test]
    fn all_n_has_zero_entropy() {
        assert_eq!(average_entropy(&vec![b'N'; 50]), 0.0);
        assert_eq!(average_entropy(b"A"), 0.0);
        assert_eq!(average_entropy(b""), 0.0);
    }

    #[test]
    fn uniform_dinucleotides_have_full_entropy() {
        // Every dinucleotide over {A,C,G,T} equally often: entropy 4 bits,
        // averaged to 1. A de-Bruijn-like cycle covering all 16 pairs.
        let seq = b"AACAGATCCGCTGGTTA";
        let entropy = average_entropy(seq);
        assert!((entropy - 1.0).abs() < 1e-9, "{}", entropy);
    }

    #[test]
    fn two_letter_repeat_is_low() {
        let seq: Vec<u8> = b"AT".iter().cycle().take(100).copied().collect();
        let entropy = average_entropy(&seq);
        assert!(entropy < 0.3, "{}", entropy);
    }

    #[test]
    fn filter_drops_homopolymer_and_logs_it() {
        let mut contigs: BTreeMap<_, _> = vec![
            contig(0, &vec![b'A'; 100]),
            contig(1, b"TTCTAGGCAACGTGCAATTGCCTAGGATCCAGTCAGTCTGTCAGCGT"),
        ]
        .into_iter()
        .collect();
        let mut skipped = vec![];
        filter_by_entropy(&mut contigs, 0.5, &mut skipped).unwrap();
        assert_eq!(contigs.len(), 1);
        assert!(contigs.contains_key(&1));
        let log = String::from_utf8(skipped).unwrap();
        assert!(log.starts_with(">00.ctg0 (entropy filter, entropy: 0"));
        assert!(log.contains(&"A".repeat(100)));
    }

    #[test]
    fn filter_with_no_survivor_is_empty_input() {
        let mut contigs: BTreeMap<_, _> =
            vec![contig(0, &vec![b'A'; 80]), contig(1, &vec![b'C'; 80])]
                .into_iter()
                .collect();
        let mut skipped = vec![];
        let err = filter_by_entropy(&mut contigs, 0.5, &mut skipped).unwrap_err();
        assert!(matches!(err, MergeError::EmptyInput));
    }
}
