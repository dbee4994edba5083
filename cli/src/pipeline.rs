use definitions::ContigBatch;
use merger::{MergeConfig, PartitionConfig};
use serde::{Deserialize, Serialize};
extern crate log;
use log::*;
use std::collections::BTreeSet;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PipelineConfig {
    contig_files: Vec<String>,
    out_dir: String,
    prefix: String,
    verbose: usize,
    min_entropy: f64,
    qgram_length: usize,
    error_rate: f64,
    minimal_length: usize,
    match_score: i32,
    error_penalty: i32,
    min_score: i32,
    min_branch_len: usize,
    max_paths: usize,
    batch_index: usize,
    total_batches: usize,
}

/// Run partition and merge in one process, wiring the two through a
/// pair file under `out_dir`.
pub fn run_pipeline(config: &PipelineConfig) -> std::io::Result<()> {
    let PipelineConfig {
        contig_files,
        out_dir,
        prefix,
        verbose,
        min_entropy,
        qgram_length,
        error_rate,
        minimal_length,
        match_score,
        error_penalty,
        min_score,
        min_branch_len,
        max_paths,
        batch_index,
        total_batches,
    } = config.clone();
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    std::fs::create_dir_all(&out_dir)?;
    let file_stem = format!("{out_dir}/{prefix}");
    let pair_file = format!("{file_stem}.pairs.txt");
    let skipped_file = format!("{file_stem}.skipped.fa");
    let output_file = format!("{file_stem}.supercontigs.fa");

    let partition_config = PartitionConfig::new(
        qgram_length,
        error_rate,
        minimal_length,
        match_score,
        error_penalty,
        min_score,
    );
    let mut merge_config = MergeConfig::new(match_score, error_penalty, qgram_length, min_branch_len);
    merge_config.max_paths = max_paths;

    let contig_files: Vec<PathBuf> = contig_files.iter().map(PathBuf::from).collect();
    let mut batch = ContigBatch::new(contig_files, batch_index, total_batches);

    // Partition.
    let mut contigs = merger::read_contigs(&mut batch).map_err(to_io)?;
    let mut skipped = std::fs::File::create(&skipped_file).map(BufWriter::new)?;
    merger::filter_by_entropy(&mut contigs, min_entropy, &mut skipped).map_err(to_io)?;
    let mut uf = merger::FindUnion::new(batch.total_ids());
    let mut aligned_pairs = BTreeSet::new();
    merger::partition_contigs(&mut uf, &mut aligned_pairs, &contigs, &batch, &partition_config)
        .map_err(to_io)?;
    let mut wtr = std::fs::File::create(&pair_file).map(BufWriter::new)?;
    merger::write_aligned_pairs(&mut wtr, &aligned_pairs).map_err(to_io)?;
    debug!("PIPELINE\tPairs\t{}", pair_file);

    // Merge.
    let pair_files = vec![PathBuf::from(&pair_file)];
    let mut components =
        merger::read_and_merge_components(&pair_files, &contigs, &batch).map_err(to_io)?;
    let out = std::fs::File::create(&output_file).map(BufWriter::new)?;
    let stats =
        merger::construct_supercontigs(&mut components, &contigs, &batch, &merge_config, out)
            .map_err(to_io)?;
    println!("{}", stats);
    Ok(())
}

pub fn to_io(error: merger::MergeError) -> std::io::Error {
    match error {
        merger::MergeError::Io(error) => error,
        other => std::io::Error::new(std::io::ErrorKind::Other, other.to_string()),
    }
}
