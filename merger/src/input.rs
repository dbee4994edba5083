//! Contig input. Each sample contributes one FASTA file; global ids are
//! assigned by streaming the files in order, so every worker that sees
//! the same file list derives the same id space. The sample tag is the
//! zero-padded file index.

use crate::error::MergeError;
use bio::io::fasta;
use definitions::{formatted_index, Contig, ContigBatch, ContigId};
use std::collections::BTreeMap;

/// Read every contig of every sample file, assign global forward ids
/// `0..N` in traversal order, and record N in the batch.
pub fn read_contigs(batch: &mut ContigBatch) -> Result<BTreeMap<usize, Contig>, MergeError> {
    debug!("START\tReadContigs");
    let mut contigs = BTreeMap::new();
    let mut global_id = 0;
    let num_samples = batch.contig_files.len();
    for (file_index, path) in batch.contig_files.iter().enumerate() {
        let sample = formatted_index(file_index, num_samples);
        let reader = fasta::Reader::from_file(path).map_err(|err| match err.downcast::<std::io::Error>() {
            Ok(io_err) => MergeError::Io(io_err),
            Err(other) => MergeError::Other(other),
        })?;
        for record in reader.records() {
            let record = record?;
            let id = ContigId {
                sample: sample.clone(),
                name: record.id().to_string(),
                forward: true,
            };
            let seq = record.seq().to_ascii_uppercase();
            contigs.insert(global_id, Contig::new(id, seq));
            global_id += 1;
        }
        debug!("INPUT\t{}\t{}", path.display(), global_id);
    }
    batch.contigs_in_total = global_id;
    Ok(contigs)
}
