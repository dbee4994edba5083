//! Definitions -- the data model shared by the partitioner, the merger,
//! and the CLI. A [Contig] is one assembled sequence from one sample;
//! a [ContigBatch] describes which slice of the global id space a worker
//! owns. Forward contigs occupy ids `0..N`, their reverse-complement
//! twins `N..2N`, and [ContigBatch::rc_id] maps between the two halves.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Identifier of a contig: the sample it was assembled from, the record
/// name inside that sample's FASTA file, and its orientation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ContigId {
    /// Zero-padded sample index, see [formatted_index].
    pub sample: String,
    /// FASTA record name within the sample.
    pub name: String,
    /// True for the forward strand, false for the reverse-complement twin.
    pub forward: bool,
}

impl std::fmt::Display for ContigId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.forward {
            write!(f, "{}.{}", self.sample, self.name)
        } else {
            write!(f, "{}.{}_rc", self.sample, self.name)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contig {
    pub id: ContigId,
    pub seq: Vec<u8>,
}

impl Contig {
    pub fn new(id: ContigId, seq: Vec<u8>) -> Self {
        Self { id, seq }
    }
    /// The reverse-complement twin of this contig.
    pub fn rev_comp(&self) -> Self {
        let seq = self
            .seq
            .iter()
            .rev()
            .map(|base| match base {
                b'A' => b'T',
                b'C' => b'G',
                b'G' => b'C',
                b'T' => b'A',
                _ => b'N',
            })
            .collect();
        let id = ContigId {
            sample: self.id.sample.clone(),
            name: self.id.name.clone(),
            forward: !self.id.forward,
        };
        Self { id, seq }
    }
}

/// Shard coordinates of one batch worker. All workers see the same
/// contig files and the same global id space; a batch only restricts
/// which ids the worker iterates itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContigBatch {
    /// One FASTA file per sample, in global id order.
    pub contig_files: Vec<PathBuf>,
    /// Index of this batch in `0..batches_in_total`.
    pub number: usize,
    pub batches_in_total: usize,
    /// N, the number of forward contigs over all samples.
    pub contigs_in_total: usize,
}

impl ContigBatch {
    pub fn new(contig_files: Vec<PathBuf>, number: usize, batches_in_total: usize) -> Self {
        assert!(number < batches_in_total);
        Self {
            contig_files,
            number,
            batches_in_total,
            contigs_in_total: 0,
        }
    }
    /// Number of forward ids each batch owns (the last batch may own fewer).
    pub fn contigs_per_batch(&self) -> usize {
        (self.contigs_in_total + self.batches_in_total - 1) / self.batches_in_total
    }
    /// First forward id owned by this batch.
    pub fn index_offset(&self) -> usize {
        self.number * self.contigs_per_batch()
    }
    /// Number of forward ids owned by this batch.
    pub fn batch_size(&self) -> usize {
        let offset = self.index_offset();
        self.contigs_in_total
            .saturating_sub(offset)
            .min(self.contigs_per_batch())
    }
    /// Size of the twin-closed id space, 2N.
    pub fn total_ids(&self) -> usize {
        2 * self.contigs_in_total
    }
    /// The reverse-complement twin of a global id.
    /// `rc_id(rc_id(i)) == i` for every `i < 2N`.
    pub fn rc_id(&self, i: usize) -> usize {
        assert!(i < self.total_ids());
        if i < self.contigs_in_total {
            i + self.contigs_in_total
        } else {
            i - self.contigs_in_total
        }
    }
}

/// Zero-padded decimal representation of a sample index. The width is
/// the number of digits of the total sample count so that ids sort
/// lexicographically in file order.
pub fn formatted_index(index: usize, total: usize) -> String {
    let width = total.max(1).to_string().len();
    format!("{:0width$}", index, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rev_comp_twice_is_identity() {
        let id = ContigId {
            sample: "00".to_string(),
            name: "contig_1".to_string(),
            forward: true,
        };
        let contig = Contig::new(id, b"AACGTNACGT".to_vec());
        let twin = contig.rev_comp();
        assert_eq!(twin.seq, b"ACGTNACGTT".to_vec());
        assert!(!twin.id.forward);
        let back = twin.rev_comp();
        assert_eq!(back.seq, contig.seq);
        assert!(back.id.forward);
    }

    #[test]
    fn rc_id_is_involution() {
        let mut batch = ContigBatch::new(vec![], 0, 1);
        batch.contigs_in_total = 7;
        for i in 0..14 {
            assert_eq!(batch.rc_id(batch.rc_id(i)), i);
        }
        assert_eq!(batch.rc_id(0), 7);
        assert_eq!(batch.rc_id(13), 6);
    }

    #[test]
    fn batch_split_covers_all_ids() {
        let mut covered = vec![];
        for number in 0..3 {
            let mut batch = ContigBatch::new(vec![], number, 3);
            batch.contigs_in_total = 10;
            let offset = batch.index_offset();
            covered.extend(offset..offset + batch.batch_size());
        }
        assert_eq!(covered, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn formatted_index_width() {
        assert_eq!(formatted_index(3, 9), "3");
        assert_eq!(formatted_index(3, 10), "03");
        assert_eq!(formatted_index(42, 500), "042");
    }

    #[test]
    fn display_marks_reverse() {
        let id = ContigId {
            sample: "03".to_string(),
            name: "ctg7".to_string(),
            forward: false,
        };
        assert_eq!(id.to_string(), "03.ctg7_rc");
    }
}
