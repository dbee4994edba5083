//! From aligned pairs to components. The union-find partition is
//! materialized as a sorted map from a canonical representative id to
//! the component's symmetric, twin-closed pair set; contigs that never
//! aligned become empty singleton components. Components can also be
//! rebuilt from pair files written by independent partition batches.

use crate::error::MergeError;
use crate::find_union::FindUnion;
use crate::partition::read_aligned_pairs;
use definitions::{Contig, ContigBatch, ContigId};
use std::collections::{BTreeMap, BTreeSet};
use std::io::BufReader;
use std::path::PathBuf;

/// One connected component of the aligned-pair relation. `ids` and
/// `contigs` are empty until the merger brings the members into align
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContigComponent {
    /// Twin-closed, symmetric subset of the aligned pairs with both
    /// endpoints in this component.
    pub aligned_pairs: BTreeSet<(usize, usize)>,
    pub ids: Vec<ContigId>,
    pub contigs: Vec<Vec<u8>>,
}

/// Group the aligned pairs by component. The canonical key of a pair is
/// the smaller of the forward-side and twin-side roots; each pair is
/// stored in both orders together with its twin pair.
pub fn union_find_to_components(
    components: &mut BTreeMap<usize, ContigComponent>,
    uf: &mut FindUnion,
    aligned_pairs: &BTreeSet<(usize, usize)>,
    batch: &ContigBatch,
) {
    for &(a, b) in aligned_pairs.iter() {
        let rev1 = batch.rc_id(a);
        let rev2 = batch.rc_id(b);
        let set = uf.find(a).min(uf.find(rev1));
        let pairs = &mut components.entry(set).or_default().aligned_pairs;
        pairs.insert((a, b));
        pairs.insert((b, a));
        pairs.insert((rev1, rev2));
        pairs.insert((rev2, rev1));
    }
    debug!("COMPONENTS\tGrouped\t{}", components.len());
}

/// Add an empty component for every surviving forward contig that is
/// its own root and not yet keyed, i.e. never aligned to anything.
pub fn add_singletons(
    components: &mut BTreeMap<usize, ContigComponent>,
    uf: &mut FindUnion,
    contigs: &BTreeMap<usize, Contig>,
) {
    let mut num_singletons = 0;
    for &i in contigs.keys() {
        if uf.find(i) == i && !components.contains_key(&i) {
            components.insert(i, ContigComponent::default());
            num_singletons += 1;
        }
    }
    debug!("COMPONENTS\tSingletons\t{}", num_singletons);
}

/// Rebuild the component partition from the union of pair files written
/// by the partition batches, then keep only this batch's shard of the
/// sorted component keys. A malformed pair file is logged and abandoned
/// at the offending line; pairs read before it stay in effect.
pub fn read_and_merge_components(
    component_files: &[PathBuf],
    contigs: &BTreeMap<usize, Contig>,
    batch: &ContigBatch,
) -> Result<BTreeMap<usize, ContigComponent>, MergeError> {
    debug!("START\tReadComponents");
    let mut uf = FindUnion::new(batch.total_ids());
    let mut aligned_pairs = BTreeSet::new();
    for file in component_files.iter() {
        let rdr = std::fs::File::open(file).map(BufReader::new)?;
        match read_aligned_pairs(
            &mut uf,
            &mut aligned_pairs,
            rdr,
            file,
            batch.contigs_in_total,
        ) {
            Ok(_) => {}
            Err(error @ MergeError::MalformedPairFile { .. }) => warn!("{}", error),
            Err(error) => return Err(error),
        }
    }

    let mut components = BTreeMap::new();
    union_find_to_components(&mut components, &mut uf, &aligned_pairs, batch);
    add_singletons(&mut components, &mut uf, contigs);

    // Keep every batches_in_total'th component of the sorted key order.
    if batch.batches_in_total != 1 {
        let keys: Vec<usize> = components.keys().copied().collect();
        for (rank, key) in keys.into_iter().enumerate() {
            if rank % batch.batches_in_total != batch.number {
                components.remove(&key);
            }
        }
    }
    Ok(components)
}
