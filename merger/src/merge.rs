//! Supercontig construction. Per component, contigs are brought into an
//! align order, threaded one by one onto a consensus graph along their
//! best-scoring path, and the final source-to-sink paths are emitted as
//! supercontig FASTA records.

use crate::align::{local_alignment, LocalAlignment, Scoring};
use crate::components::ContigComponent;
use crate::consensus_graph::{ConsensusGraph, GraphPath};
use crate::error::MergeError;
use crate::qgram::best_diagonal;
use bio::io::fasta;
use definitions::{Contig, ContigBatch};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

/// Width of the band around the estimated diagonal when threading a
/// contig onto a path.
const DIAG_WINDOW: i64 = 25;

#[derive(Debug, Clone)]
pub struct MergeConfig {
    pub match_score: i32,
    pub error_penalty: i32,
    /// Shape length handed to the diagonal estimator.
    pub qgram_length: usize,
    /// Unaligned tails this short are dropped instead of branching.
    pub min_branch_len: usize,
    /// Abort a component once its graph enumerates more paths than this.
    pub max_paths: usize,
}

impl MergeConfig {
    pub fn new(
        match_score: i32,
        error_penalty: i32,
        qgram_length: usize,
        min_branch_len: usize,
    ) -> Self {
        Self {
            match_score,
            error_penalty,
            qgram_length,
            min_branch_len,
            max_paths: 30,
        }
    }
}

impl std::default::Default for MergeConfig {
    fn default() -> Self {
        Self {
            match_score: 1,
            error_penalty: -5,
            qgram_length: 21,
            min_branch_len: 30,
            max_paths: 30,
        }
    }
}

/// Counters of one merge run, logged as the end-of-run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Multi-contig components merged into supercontigs.
    pub merged: usize,
    /// Contigs that never aligned with any other contig.
    pub singletons: usize,
    /// Components whose final graph had more than one path.
    pub branching: usize,
    /// Components abandoned because the path cap was exceeded.
    pub very_branching: usize,
    /// Components skipped for exceeding ten contigs per sample.
    pub too_large: usize,
}

impl std::fmt::Display for MergeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "merged:{}\tsingletons:{}\tbranching:{}\tgiven_up:{}\toversized:{}",
            self.merged, self.singletons, self.branching, self.very_branching, self.too_large
        )
    }
}

/// Bring the component's members into an order where every contig
/// (after the first) aligns with an earlier one: breadth-first over the
/// aligned-pair relation from the smallest id of the first pair.
/// Members unreachable from there are omitted; a singleton component
/// orders its key contig alone. Reverse ids materialize the
/// reverse-complement twin sequence.
pub fn get_seqs_by_align_order(
    key: usize,
    component: &mut ContigComponent,
    contigs: &BTreeMap<usize, Contig>,
    batch: &ContigBatch,
) {
    let mut order = vec![];
    match component.aligned_pairs.iter().next() {
        Some(&(first, _)) => order.push(first),
        None => order.push(key),
    }
    let mut ordered: BTreeSet<usize> = order.iter().copied().collect();
    let mut i = 0;
    while i < order.len() {
        let id = order[i];
        for &(_, neighbor) in component.aligned_pairs.range((id, 0)..=(id, usize::MAX)) {
            if ordered.insert(neighbor) {
                order.push(neighbor);
            }
        }
        i += 1;
    }
    for id in order {
        let contig = if id < batch.contigs_in_total {
            contigs[&id].clone()
        } else {
            contigs[&batch.rc_id(id)].rev_comp()
        };
        component.ids.push(contig.id);
        component.contigs.push(contig.seq);
    }
}

/// Merge the ordered sequences of one component into consensus paths.
/// Returns `None` when the graph branches beyond the path cap.
pub fn merge_sequences(seqs: &[Vec<u8>], config: &MergeConfig) -> Option<Vec<Vec<u8>>> {
    let mut graph = ConsensusGraph::new(seqs[0].clone());
    if !add_sequences_to_graph(&mut graph, seqs, config) {
        return None;
    }
    let final_paths = graph.enumerate_paths();
    if graph.vertex_count() > 1 {
        debug!(
            "MERGE\tGraph\t{}\tvertices\t{}\tpaths",
            graph.vertex_count(),
            final_paths.len()
        );
    }
    Some(final_paths.into_iter().map(|path| path.seq).collect())
}

/// Thread each sequence after the first onto the graph along its
/// best-scoring path. False once the path cap is exceeded.
fn add_sequences_to_graph(
    graph: &mut ConsensusGraph,
    seqs: &[Vec<u8>],
    config: &MergeConfig,
) -> bool {
    let scoring = Scoring::new(config.match_score, config.error_penalty);
    for seq in seqs.iter().skip(1) {
        let paths = graph.enumerate_paths();
        if paths.len() > config.max_paths {
            return false;
        }
        let mut best: Option<(GraphPath, LocalAlignment)> = None;
        for path in paths {
            let aln = match best_diagonal(seq, &path.seq, config.qgram_length) {
                Some(diag) => local_alignment(
                    &path.seq,
                    seq,
                    scoring,
                    Some((diag - DIAG_WINDOW, diag + DIAG_WINDOW)),
                ),
                None => local_alignment(&path.seq, seq, scoring, None),
            };
            if best.as_ref().map_or(true, |(_, prev)| aln.score > prev.score) {
                best = Some((path, aln));
            }
        }
        let (path, aln) = best.expect("graph has at least one path");
        merge_seq_with_graph(graph, &path, seq, &aln, config.min_branch_len);
    }
    true
}

/// Graft `seq` onto the graph so its aligned region coincides with the
/// chosen path. An unaligned suffix either extends the path's last
/// label or branches off the vertex at the alignment end; an unaligned
/// prefix either extends the path's first label or becomes a new
/// source. Tails no longer than `min_branch_len` are dropped.
fn merge_seq_with_graph(
    graph: &mut ConsensusGraph,
    path: &GraphPath,
    seq: &[u8],
    aln: &LocalAlignment,
    min_branch_len: usize,
) {
    // In the alignment, x is the path sequence and y the new contig.
    let align_end_seq = aln.y_end;
    let align_end_path = aln.x_end;
    if align_end_seq < seq.len() {
        let (&v_pos, &v) = path
            .position_map
            .range(align_end_path..)
            .next()
            .expect("alignment end within path");
        if align_end_path == path.seq.len() {
            graph.append_label(v, &seq[align_end_seq..]);
        } else if seq.len() - align_end_seq > min_branch_len {
            if v_pos > align_end_path {
                // The alignment ends inside v's label: split so the
                // boundary coincides with a vertex boundary.
                let split_pos = graph.label(v).len() - (v_pos - align_end_path);
                graph.split_vertex(v, split_pos);
            }
            let v_branch = graph.add_vertex(seq[align_end_seq..].to_vec());
            graph.add_edge(v, v_branch);
        }
    }

    let align_begin_seq = aln.y_begin;
    let align_begin_path = aln.x_begin;
    if align_begin_seq > 0 {
        use std::ops::Bound::{Excluded, Unbounded};
        let (&u_pos, &u) = path
            .position_map
            .range((Excluded(align_begin_path), Unbounded))
            .next()
            .expect("alignment begin within path");
        if align_begin_path == 0 {
            graph.prepend_label(u, &seq[..align_begin_seq]);
        } else if align_begin_seq > min_branch_len {
            let label_len = graph.label(u).len();
            let mut u_split = u;
            if u_pos >= label_len && u_pos - label_len < align_begin_path {
                let split_pos = label_len - (u_pos - align_begin_path);
                u_split = graph.split_vertex(u, split_pos);
            }
            let u_branch = graph.add_vertex(seq[..align_begin_seq].to_vec());
            graph.push_source(u_branch);
            graph.add_edge(u_branch, u_split);
        }
    }
}

fn path_tag(index: usize, total: usize) -> String {
    if total <= 26 {
        char::from(b'a' + index as u8).to_string()
    } else {
        format!(
            "{}{}",
            char::from(b'a' + (index / 26) as u8),
            char::from(b'a' + (index % 26) as u8)
        )
    }
}

/// Write one FASTA record per consensus path.
pub fn write_supercontigs<W: Write>(
    wtr: &mut fasta::Writer<W>,
    merged_seqs: &[Vec<u8>],
    num_contigs: usize,
    batch_index: usize,
    pos: usize,
) -> Result<(), MergeError> {
    for (index, seq) in merged_seqs.iter().enumerate() {
        let name = format!(
            "COMPONENT_{}.{}_{}_length_{}_size_{}",
            batch_index,
            pos,
            path_tag(index, merged_seqs.len()),
            seq.len(),
            num_contigs
        );
        wtr.write(&name, None, seq)?;
    }
    Ok(())
}

/// Merge every component and emit its supercontigs. Components in
/// sorted key order; oversized and overbranched components are counted
/// and skipped. Returns the run's counters.
pub fn construct_supercontigs<W: Write>(
    components: &mut BTreeMap<usize, ContigComponent>,
    contigs: &BTreeMap<usize, Contig>,
    batch: &ContigBatch,
    config: &MergeConfig,
    out: W,
) -> Result<MergeStats, MergeError> {
    debug!("START\tConstructSupercontigs");
    let mut wtr = fasta::Writer::new(out);
    let mut stats = MergeStats::default();
    let mut pos = 0;
    for (&key, component) in components.iter_mut() {
        get_seqs_by_align_order(key, component, contigs, batch);

        if component.contigs.len() > 10 * batch.contig_files.len() {
            debug!("MERGE\tTooLarge\t{}\t{}", key, component.contigs.len());
            stats.too_large += 1;
            continue;
        }

        if component.contigs.len() == 1 {
            wtr.write(&component.ids[0].to_string(), None, &component.contigs[0])?;
            stats.singletons += 1;
            continue;
        }

        debug!(
            "MERGE\tComponent\t{}.{}\t{}",
            batch.number,
            pos,
            component.contigs.len()
        );
        match merge_sequences(&component.contigs, config) {
            None => {
                debug!("MERGE\tGivenUp\t{}.{}", batch.number, pos);
                stats.branching += 1;
                stats.very_branching += 1;
            }
            Some(merged_seqs) => {
                if merged_seqs.len() > 1 {
                    stats.branching += 1;
                }
                write_supercontigs(
                    &mut wtr,
                    &merged_seqs,
                    component.contigs.len(),
                    batch.number,
                    pos,
                )?;
                stats.merged += 1;
            }
        }
        pos += 1;
    }
    wtr.flush()?;
    info!("MERGE\tSummary\t{}", stats);
    Ok(stats)
}
