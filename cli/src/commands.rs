use clap::{Arg, Command};

fn arg_verbose() -> Arg<'static> {
    Arg::new("verbose")
        .short('v')
        .multiple_occurrences(true)
        .help("Debug mode")
}

fn arg_contigs() -> Arg<'static> {
    Arg::new("contigs")
        .long("contigs")
        .short('c')
        .takes_value(true)
        .multiple_values(true)
        .required(true)
        .value_name("FASTA")
        .help("Contig FASTA files, one per sample, in id order.")
}

fn arg_skipped() -> Arg<'static> {
    Arg::new("skipped")
        .long("skipped")
        .takes_value(true)
        .default_value("skipped.fa")
        .value_name("PATH")
        .help("Log of contigs removed by the entropy filter.")
}

fn scoring_args(command: Command<'static>) -> Command<'static> {
    command
        .arg(
            Arg::new("min_entropy")
                .long("min_entropy")
                .takes_value(true)
                .default_value("0.75")
                .help("Minimum average dinucleotide entropy of a contig."),
        )
        .arg(
            Arg::new("qgram_length")
                .long("qgram_length")
                .takes_value(true)
                .default_value("21")
                .help("Length of the q-grams, at most 31."),
        )
        .arg(
            Arg::new("match_score")
                .long("match_score")
                .takes_value(true)
                .default_value("1")
                .help("Alignment match score."),
        )
        .arg(
            Arg::new("error_penalty")
                .long("error_penalty")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-5")
                .help("Alignment mismatch and gap penalty (negative)."),
        )
        .arg(
            Arg::new("batch_index")
                .long("batch_index")
                .takes_value(true)
                .default_value("0")
                .help("Index of this batch."),
        )
        .arg(
            Arg::new("batches")
                .long("batches")
                .takes_value(true)
                .default_value("1")
                .help("Total number of batches."),
        )
}

fn subcommand_partition() -> Command<'static> {
    let command = Command::new("partition")
        .version("0.1")
        .about("Partition contigs into components of the same insertion.")
        .arg(arg_verbose())
        .arg(arg_contigs())
        .arg(
            Arg::new("pairs")
                .long("pairs")
                .short('o')
                .takes_value(true)
                .required(true)
                .value_name("PATH")
                .help("Output file for the verified aligned pairs."),
        )
        .arg(arg_skipped())
        .arg(
            Arg::new("error_rate")
                .long("error_rate")
                .takes_value(true)
                .default_value("0.01")
                .help("Error rate of the SWIFT filter, in (0,1)."),
        )
        .arg(
            Arg::new("minimal_length")
                .long("minimal_length")
                .takes_value(true)
                .default_value("100")
                .help("Minimal match length of the SWIFT filter."),
        )
        .arg(
            Arg::new("min_score")
                .long("min_score")
                .takes_value(true)
                .default_value("90")
                .help("Minimal alignment score for a verified pair."),
        );
    scoring_args(command)
}

fn subcommand_merge() -> Command<'static> {
    let command = Command::new("merge")
        .version("0.1")
        .about("Merge each component's contigs into supercontigs.")
        .arg(arg_verbose())
        .arg(arg_contigs())
        .arg(
            Arg::new("pairs")
                .long("pairs")
                .short('p')
                .takes_value(true)
                .multiple_values(true)
                .required(true)
                .value_name("PATH")
                .help("Aligned-pair files written by the partition batches."),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .takes_value(true)
                .required(true)
                .value_name("FASTA")
                .help("Output FASTA file for the supercontigs."),
        )
        .arg(arg_skipped())
        .arg(
            Arg::new("min_branch_len")
                .long("min_branch_len")
                .takes_value(true)
                .default_value("30")
                .help("Unaligned tails up to this length are dropped."),
        )
        .arg(
            Arg::new("max_paths")
                .long("max_paths")
                .takes_value(true)
                .default_value("30")
                .help("Give up on a component beyond this many paths."),
        );
    scoring_args(command)
}

fn subcommand_pipeline() -> Command<'static> {
    Command::new("pipeline")
        .version("0.1")
        .about("Run partition and merge based on the given TOML file.")
        .arg(
            Arg::new("profile")
                .short('p')
                .takes_value(true)
                .required(true)
                .help("TOML configuration file."),
        )
}

pub fn novin_parser() -> clap::Command<'static> {
    clap::Command::new("novin")
        .version("0.1")
        .about("Assembles novel sequence insertions from population contigs")
        .arg_required_else_help(true)
        .subcommand(subcommand_partition())
        .subcommand(subcommand_merge())
        .subcommand(subcommand_pipeline())
}
