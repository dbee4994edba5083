use definitions::ContigBatch;
use novin_cli::pipeline::to_io;
use std::collections::BTreeSet;
use std::io::BufWriter;
use std::path::PathBuf;
#[macro_use]
extern crate log;

fn main() -> std::io::Result<()> {
    let matches = novin_cli::commands::novin_parser().get_matches();
    if let Some(("pipeline", sub_m)) = matches.subcommand() {
        let path = sub_m.value_of("profile").unwrap();
        use std::io::Read;
        let mut rdr = std::fs::File::open(path).map(std::io::BufReader::new)?;
        let mut file = String::new();
        rdr.read_to_string(&mut file)?;
        let config: novin_cli::pipeline::PipelineConfig = toml::from_str(&file).unwrap();
        return novin_cli::pipeline::run_pipeline(&config);
    }
    if let Some((_, sub_m)) = matches.subcommand() {
        let level = match sub_m.occurrences_of("verbose") {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    }
    match matches.subcommand() {
        Some(("partition", sub_m)) => partition(sub_m),
        Some(("merge", sub_m)) => merge(sub_m),
        _ => unreachable!(),
    }
}

fn value<T: std::str::FromStr>(matches: &clap::ArgMatches, name: &str) -> T
where
    T::Err: std::fmt::Debug,
{
    matches.value_of(name).unwrap().parse().unwrap()
}

fn read_filtered_contigs(
    matches: &clap::ArgMatches,
) -> std::io::Result<(ContigBatch, std::collections::BTreeMap<usize, definitions::Contig>)> {
    let contig_files: Vec<PathBuf> = matches
        .values_of("contigs")
        .unwrap()
        .map(PathBuf::from)
        .collect();
    let batch_index = value(matches, "batch_index");
    let batches = value(matches, "batches");
    let mut batch = ContigBatch::new(contig_files, batch_index, batches);
    let mut contigs = merger::read_contigs(&mut batch).map_err(to_io)?;
    debug!("Read {} contigs", contigs.len());
    let skipped = matches.value_of("skipped").unwrap();
    let mut skipped = std::fs::File::create(skipped).map(BufWriter::new)?;
    merger::filter_by_entropy(&mut contigs, value(matches, "min_entropy"), &mut skipped)
        .map_err(to_io)?;
    Ok((batch, contigs))
}

fn partition(matches: &clap::ArgMatches) -> std::io::Result<()> {
    debug!("START\tPartition");
    let config = merger::PartitionConfig::new(
        value(matches, "qgram_length"),
        value(matches, "error_rate"),
        value(matches, "minimal_length"),
        value(matches, "match_score"),
        value(matches, "error_penalty"),
        value(matches, "min_score"),
    );
    let (batch, contigs) = read_filtered_contigs(matches)?;
    let mut uf = merger::FindUnion::new(batch.total_ids());
    let mut aligned_pairs = BTreeSet::new();
    merger::partition_contigs(&mut uf, &mut aligned_pairs, &contigs, &batch, &config)
        .map_err(to_io)?;
    let pairs = matches.value_of("pairs").unwrap();
    let mut wtr = std::fs::File::create(pairs).map(BufWriter::new)?;
    merger::write_aligned_pairs(&mut wtr, &aligned_pairs).map_err(to_io)?;
    debug!("Wrote {} pairs to {}", aligned_pairs.len(), pairs);
    Ok(())
}

fn merge(matches: &clap::ArgMatches) -> std::io::Result<()> {
    debug!("START\tMerge");
    let mut config = merger::MergeConfig::new(
        value(matches, "match_score"),
        value(matches, "error_penalty"),
        value(matches, "qgram_length"),
        value(matches, "min_branch_len"),
    );
    config.max_paths = value(matches, "max_paths");
    let (batch, contigs) = read_filtered_contigs(matches)?;
    let pair_files: Vec<PathBuf> = matches
        .values_of("pairs")
        .unwrap()
        .map(PathBuf::from)
        .collect();
    let mut components =
        merger::read_and_merge_components(&pair_files, &contigs, &batch).map_err(to_io)?;
    let out = matches.value_of("output").unwrap();
    let out = std::fs::File::create(out).map(BufWriter::new)?;
    let stats = merger::construct_supercontigs(&mut components, &contigs, &batch, &config, out)
        .map_err(to_io)?;
    println!("{}", stats);
    Ok(())
}
