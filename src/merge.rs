use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::AddAssign;

use anyhow::Result;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::align::AlignmentScorer;
use crate::assembly::{Block, IdType, Strand};
use crate::pctg::{Assembly, Outcome, PairedContig, PctgBuilder};

/// 同一对 contig（同方向）的全部 block 汇总为首尾两个
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPair {
    pub first: Block,
    pub last: Block,
    /// master 上被 block 覆盖的跨度
    pub span: usize,
}

impl BlockPair {
    pub fn master_id(&self) -> IdType {
        self.first.master_id()
    }

    pub fn slave_id(&self) -> IdType {
        self.first.slave_id()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// 以 block 对起始的 paired contig 数
    pub seeds: usize,
    /// 成功合并的候选 contig 数
    pub merges: usize,
    /// 两侧均已存在时的原位校正次数
    pub reconciliations: usize,
    /// 未通过阈值的候选数（包括退化为单 master 的种子）
    pub rejections: usize,
    /// 没有任何可用 block 的 master contig 数
    pub singletons: usize,
    /// 合并被拒、单独输出的候选 contig 数
    pub unmerged: usize,
}

impl AddAssign for MergeStats {
    fn add_assign(&mut self, rhs: Self) {
        self.seeds += rhs.seeds;
        self.merges += rhs.merges;
        self.reconciliations += rhs.reconciliations;
        self.rejections += rhs.rejections;
        self.singletons += rhs.singletons;
        self.unmerged += rhs.unmerged;
    }
}

/// Groups blocks by `(master, slave, strand)`.
///
/// `first` is the block starting leftmost on the master, `last` the one
/// ending rightmost. Output order is deterministic (sorted by key).
pub fn group_blocks(blocks: &[Block]) -> Vec<BlockPair> {
    let mut groups: BTreeMap<(IdType, IdType, Strand), (Block, Block)> = BTreeMap::new();
    for b in blocks {
        groups
            .entry((b.master_id(), b.slave_id(), b.strand()))
            .and_modify(|(first, last)| {
                if b.master.start < first.master.start {
                    *first = *b;
                }
                if b.master.end > last.master.end {
                    *last = *b;
                }
            })
            .or_insert((*b, *b));
    }
    groups
        .into_values()
        .map(|(first, last)| BlockPair { first, last, span: last.master.end - first.master.start })
        .collect()
}

/// Connected components of the master/slave contig graph, as lists of pair
/// indices in ascending order.
pub fn connected_components(pairs: &[BlockPair]) -> Vec<Vec<usize>> {
    let mut node_of: HashMap<(Assembly, IdType), usize> = HashMap::new();
    let mut ends = Vec::with_capacity(pairs.len());
    for p in pairs {
        let mut node = |key| {
            let next = node_of.len();
            *node_of.entry(key).or_insert(next)
        };
        ends.push((node((Assembly::Master, p.master_id())), node((Assembly::Slave, p.slave_id()))));
    }

    // 并查集，带路径压缩
    fn find(parent: &mut [usize], x: usize) -> usize {
        let p = parent[x];
        if p != x {
            parent[x] = find(parent, p);
        }
        parent[x]
    }

    let mut parent: Vec<usize> = (0..node_of.len()).collect();
    for &(m, s) in &ends {
        let (rm, rs) = (find(&mut parent, m), find(&mut parent, s));
        if rm != rs {
            parent[rs] = rm;
        }
    }

    let mut by_root: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &(m, _)) in ends.iter().enumerate() {
        by_root.entry(find(&mut parent, m)).or_default().push(i);
    }
    let mut comps: Vec<Vec<usize>> = by_root.into_values().collect();
    comps.sort_by_key(|c| c[0]);
    comps
}

/// Builds every paired contig of one component.
///
/// Seeds with the unused pair of largest span whose contigs are both still
/// unplaced, then applies every pair touching the paired contig until none
/// applies. Each contig is placed at most once; rejected candidates that no
/// later pair places are emitted as standalone paired contigs.
fn merge_component<S: AlignmentScorer>(
    builder: &PctgBuilder<'_, S>,
    pairs: &[BlockPair],
) -> Result<(Vec<PairedContig>, MergeStats)> {
    let mut stats = MergeStats::default();
    let mut placed: HashSet<(Assembly, IdType)> = HashSet::new();
    let mut used = vec![false; pairs.len()];
    let mut out = Vec::new();
    let mut rejected: Vec<(Assembly, IdType)> = Vec::new();

    loop {
        let seed = (0..pairs.len())
            .filter(|&i| {
                !used[i]
                    && !placed.contains(&(Assembly::Master, pairs[i].master_id()))
                    && !placed.contains(&(Assembly::Slave, pairs[i].slave_id()))
            })
            .max_by(|&a, &b| pairs[a].span.cmp(&pairs[b].span).then(b.cmp(&a)));
        let Some(seed) = seed else { break };
        used[seed] = true;

        let sp = &pairs[seed];
        let mut pctg = builder.add_first_block_to(PairedContig::new(0), &sp.first, &sp.last)?;
        stats.seeds += 1;
        if !pctg.contains(Assembly::Slave, sp.slave_id()) {
            stats.rejections += 1;
            rejected.push((Assembly::Slave, sp.slave_id()));
        }
        mark_placed(&pctg, &mut placed);

        loop {
            let mut progressed = false;
            for (i, p) in pairs.iter().enumerate() {
                if used[i] {
                    continue;
                }
                let has_m = pctg.contains(Assembly::Master, p.master_id());
                let has_s = pctg.contains(Assembly::Slave, p.slave_id());
                if !has_m && !has_s {
                    continue;
                }
                used[i] = true;
                if (has_m && !has_s && placed.contains(&(Assembly::Slave, p.slave_id())))
                    || (has_s && !has_m && placed.contains(&(Assembly::Master, p.master_id())))
                {
                    // the other contig already lives in another paired contig
                    continue;
                }

                match builder.extend_by_block(&pctg, &p.first, &p.last)? {
                    Outcome::Merged(next) => {
                        pctg = next;
                        if has_m && has_s {
                            stats.reconciliations += 1;
                        } else {
                            stats.merges += 1;
                        }
                        mark_placed(&pctg, &mut placed);
                        progressed = true;
                    }
                    Outcome::Rejected(r) => {
                        debug!(
                            "{} {} not merged: {}",
                            r.origin,
                            builder.contig_name(r.origin, r.ctg_id),
                            r.reason
                        );
                        stats.rejections += 1;
                        rejected.push((r.origin, r.ctg_id));
                    }
                }
            }
            if !progressed {
                break;
            }
        }
        out.push(pctg);
    }

    for (origin, id) in rejected {
        if placed.insert((origin, id)) {
            out.push(builder.standalone(0, origin, id)?);
            stats.unmerged += 1;
        }
    }

    Ok((out, stats))
}

fn mark_placed(pctg: &PairedContig, placed: &mut HashSet<(Assembly, IdType)>) {
    placed.extend(pctg.infos().map(|i| (i.origin, i.id)));
}

/// Merges the two assemblies along `blocks`.
///
/// Components of the block graph are processed in parallel on the current
/// rayon pool. Masters in `master_ids` left out of every paired contig and
/// candidates whose merge was rejected are emitted alone; slave contigs
/// that no block touches are not part of the output. Output is ordered by
/// the smallest master ID of each paired contig, slave-only paired contigs
/// last by slave ID.
pub fn merge_assemblies<S: AlignmentScorer>(
    builder: &PctgBuilder<'_, S>,
    blocks: &[Block],
    master_ids: &[IdType],
) -> Result<(Vec<PairedContig>, MergeStats)> {
    builder.ensure_configured()?;

    let pairs = group_blocks(blocks);
    let comps = connected_components(&pairs);
    info!("{} blocks, {} contig pairs, {} components", blocks.len(), pairs.len(), comps.len());

    let results: Vec<(Vec<PairedContig>, MergeStats)> = comps
        .par_iter()
        .map(|comp| {
            let local: Vec<BlockPair> = comp.iter().map(|&i| pairs[i]).collect();
            merge_component(builder, &local)
        })
        .collect::<Result<_>>()?;

    let mut stats = MergeStats::default();
    let mut pctgs = Vec::new();
    for (p, s) in results {
        pctgs.extend(p);
        stats += s;
    }

    let placed: HashSet<IdType> = pctgs.iter().flat_map(|p| p.master_infos().map(|i| i.id)).collect();
    for &id in master_ids {
        if !placed.contains(&id) {
            pctgs.push(builder.init_by_contig(0, id)?);
            stats.singletons += 1;
        }
    }

    pctgs.sort_by_key(|p| {
        (
            p.master_infos().map(|i| i.id).min().unwrap_or(IdType::MAX),
            p.slave_infos().map(|i| i.id).min().unwrap_or(IdType::MAX),
        )
    });
    for (i, p) in pctgs.iter_mut().enumerate() {
        p.set_id(i as IdType);
    }

    info!(
        "{} paired contigs: {} seeds, {} merges, {} reconciliations, {} rejections, {} singletons, {} unmerged",
        pctgs.len(),
        stats.seeds,
        stats.merges,
        stats.reconciliations,
        stats.rejections,
        stats.singletons,
        stats.unmerged
    );
    Ok((pctgs, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pctg::MergeConfig;
    use crate::pool::ContigPool;

    fn random_seq(len: usize, seed: u32) -> Vec<u8> {
        let bases = [b'A', b'C', b'G', b'T'];
        let mut x = seed;
        (0..len)
            .map(|_| {
                x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                bases[(x >> 16) as usize % 4]
            })
            .collect()
    }

    fn blk(m: IdType, mr: (usize, usize), s: IdType, sr: (usize, usize)) -> Block {
        Block::from_coords(m, mr, s, sr, Strand::Forward).unwrap()
    }

    #[test]
    fn grouping_keeps_outermost_blocks() {
        let blocks = vec![
            blk(0, (300, 400), 0, (200, 300)),
            blk(0, (100, 200), 0, (0, 100)),
            blk(1, (0, 50), 0, (600, 650)),
            blk(0, (150, 350), 0, (50, 250)),
        ];
        let pairs = group_blocks(&blocks);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].first.master.start, 100);
        assert_eq!(pairs[0].last.master.end, 400);
        assert_eq!(pairs[0].span, 300);
        assert_eq!(pairs[1].master_id(), 1);
    }

    #[test]
    fn components_follow_shared_contigs() {
        let pairs = group_blocks(&[
            blk(0, (0, 10), 0, (0, 10)),
            blk(1, (0, 10), 0, (20, 30)),
            blk(2, (0, 10), 1, (0, 10)),
            blk(3, (0, 10), 1, (20, 30)),
            blk(4, (0, 10), 2, (0, 10)),
        ]);
        assert_eq!(connected_components(&pairs), vec![vec![0, 1], vec![2, 3], vec![4]]);
    }

    #[test]
    fn bridging_slave_joins_two_masters() {
        let genome = random_seq(1600, 77);
        let master = ContigPool::from_named(vec![
            ("m0", genome[0..600].to_vec(), None),
            ("m1", genome[1000..1500].to_vec(), None),
            ("m2", random_seq(300, 5), None),
        ]);
        let slave = ContigPool::from_named(vec![("s0", genome[400..1200].to_vec(), None)]);
        let builder = PctgBuilder::new(MergeConfig::default()).with_assemblies(&master, &slave);
        let blocks = vec![blk(0, (400, 600), 0, (0, 200)), blk(1, (0, 200), 0, (600, 800))];

        let (pctgs, stats) = merge_assemblies(&builder, &blocks, &master.ids()).unwrap();
        assert_eq!(pctgs.len(), 2);
        assert_eq!(pctgs[0].id(), 0);
        assert_eq!(pctgs[0].seq(), &genome[0..1500]);
        assert_eq!(pctgs[0].contig_count(), 3);
        assert_eq!(pctgs[1].master_infos().map(|i| i.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(stats, MergeStats { seeds: 1, merges: 1, singletons: 1, ..MergeStats::default() });
        assert!(pctgs.iter().all(PairedContig::spans_within_bounds));
    }

    #[test]
    fn unrelated_seed_slave_is_emitted_alone() {
        let master = ContigPool::from_named(vec![("m0", random_seq(500, 1), None)]);
        let slave = ContigPool::from_named(vec![("s0", random_seq(500, 2), None)]);
        let builder = PctgBuilder::new(MergeConfig::default()).with_assemblies(&master, &slave);
        let blocks = vec![blk(0, (100, 400), 0, (100, 400))];

        let (pctgs, stats) = merge_assemblies(&builder, &blocks, &master.ids()).unwrap();
        assert_eq!(pctgs.len(), 2);
        assert_eq!(pctgs[0].seq(), master.lookup(0).unwrap().seq.as_slice());
        assert!(pctgs[0].slave_infos().next().is_none());
        assert_eq!(pctgs[1].seq(), slave.lookup(0).unwrap().seq.as_slice());
        assert_eq!(pctgs[1].slave_infos().map(|i| i.id).collect::<Vec<_>>(), vec![0]);
        assert!(pctgs[1].master_infos().next().is_none());
        assert_eq!(stats.rejections, 1);
        assert_eq!(stats.unmerged, 1);
    }

    #[test]
    fn rejected_extension_slave_is_emitted_alone() {
        let genome = random_seq(900, 78);
        let master = ContigPool::from_named(vec![("m0", genome[0..600].to_vec(), None)]);
        let slave = ContigPool::from_named(vec![
            ("s0", genome[400..900].to_vec(), None),
            ("s1", random_seq(400, 3), None),
        ]);
        let builder = PctgBuilder::new(MergeConfig::default()).with_assemblies(&master, &slave);
        // s0 seeds (larger span), s1 is then tried against the paired contig
        let blocks = vec![blk(0, (400, 600), 0, (0, 200)), blk(0, (0, 150), 1, (0, 150))];

        let (pctgs, stats) = merge_assemblies(&builder, &blocks, &master.ids()).unwrap();
        assert_eq!(pctgs.len(), 2);
        assert_eq!(pctgs[0].seq(), &genome[..]);
        assert_eq!(pctgs[1].id(), 1);
        assert_eq!(pctgs[1].slave_infos().map(|i| i.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(pctgs[1].len(), 400);
        assert_eq!(stats, MergeStats { seeds: 1, rejections: 1, unmerged: 1, ..MergeStats::default() });
        assert!(pctgs.iter().all(PairedContig::spans_within_bounds));
    }

    #[test]
    fn unconfigured_builder_is_an_error() {
        let builder = PctgBuilder::new(MergeConfig::default());
        assert!(merge_assemblies(&builder, &[], &[]).is_err());
    }
}
