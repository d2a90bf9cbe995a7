use tracing::{debug, warn};

use super::alignment::BestPctgCtgAlignment;
use super::config::MergeConfig;
use super::error::{Outcome, PctgError, RejectReason, Rejection};
use super::info::{Assembly, ContigInPctgInfo};
use super::paired::PairedContig;
use crate::align::{AlignmentScorer, AlnOp, BandedSw};
use crate::assembly::{Block, Contig, Frame, IdType, Strand};
use crate::pool::{ContigPool, RefVector};
use crate::util::dna::{UNKNOWN_BASE, UNKNOWN_QUAL};

/// Builder of paired contigs.
///
/// The builder never owns state tied to a single merge: it only borrows the
/// two contig pools and the two reference-name vectors, so one instance can be
/// shared by any number of threads working on *different* paired contigs.
///
/// Operations come in two families:
/// - constructors (`init_by_contig`, `add_first_*`, `extend_by_block`,
///   `merge_contig`, `shift_pctg_of`) return a new [`PairedContig`];
/// - mutators (`extend_pctg_with_ctg_*`, `merge_*ctg_in_pos`) evolve the
///   paired contig they are given and hand the same reference back.
pub struct PctgBuilder<'a, S: AlignmentScorer = BandedSw> {
    master_pool: Option<&'a ContigPool>,
    slave_pool: Option<&'a ContigPool>,
    master_refs: Option<&'a RefVector>,
    slave_refs: Option<&'a RefVector>,
    config: MergeConfig,
    scorer: S,
}

impl<'a> PctgBuilder<'a, BandedSw> {
    /// An unconfigured builder; pools and reference vectors are attached
    /// later. Merge operations fail with [`PctgError::Unconfigured`] until
    /// all four collaborators are present.
    pub fn new(config: MergeConfig) -> Self {
        let config = config.sanitized();
        Self {
            master_pool: None,
            slave_pool: None,
            master_refs: None,
            slave_refs: None,
            scorer: BandedSw::with_band(config.band_width),
            config,
        }
    }
}

impl<'a, S: AlignmentScorer> PctgBuilder<'a, S> {
    pub fn with_pools(mut self, master: &'a ContigPool, slave: &'a ContigPool) -> Self {
        self.master_pool = Some(master);
        self.slave_pool = Some(slave);
        self
    }

    pub fn with_ref_vectors(mut self, master: &'a RefVector, slave: &'a RefVector) -> Self {
        self.master_refs = Some(master);
        self.slave_refs = Some(slave);
        self
    }

    /// Attaches both pools together with the reference vectors they carry.
    pub fn with_assemblies(self, master: &'a ContigPool, slave: &'a ContigPool) -> Self {
        self.with_pools(master, slave).with_ref_vectors(&master.refs, &slave.refs)
    }

    pub fn with_scorer<T: AlignmentScorer>(self, scorer: T) -> PctgBuilder<'a, T> {
        PctgBuilder {
            master_pool: self.master_pool,
            slave_pool: self.slave_pool,
            master_refs: self.master_refs,
            slave_refs: self.slave_refs,
            config: self.config,
            scorer,
        }
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    pub fn is_configured(&self) -> bool {
        self.ensure_configured().is_ok()
    }

    pub fn ensure_configured(&self) -> Result<(), PctgError> {
        if self.master_pool.is_none() {
            return Err(PctgError::Unconfigured("master contig pool"));
        }
        if self.slave_pool.is_none() {
            return Err(PctgError::Unconfigured("slave contig pool"));
        }
        if self.master_refs.is_none() {
            return Err(PctgError::Unconfigured("master reference vector"));
        }
        if self.slave_refs.is_none() {
            return Err(PctgError::Unconfigured("slave reference vector"));
        }
        Ok(())
    }

    fn pool(&self, assembly: Assembly) -> Result<&'a ContigPool, PctgError> {
        match assembly {
            Assembly::Master => self.master_pool.ok_or(PctgError::Unconfigured("master contig pool")),
            Assembly::Slave => self.slave_pool.ok_or(PctgError::Unconfigured("slave contig pool")),
        }
    }

    fn load_contig(&self, assembly: Assembly, id: IdType) -> Result<Contig, PctgError> {
        self.pool(assembly)?.fetch(assembly, id).cloned()
    }

    pub fn load_master_contig(&self, ctg_id: IdType) -> Result<Contig, PctgError> {
        self.load_contig(Assembly::Master, ctg_id)
    }

    pub fn load_slave_contig(&self, ctg_id: IdType) -> Result<Contig, PctgError> {
        self.load_contig(Assembly::Slave, ctg_id)
    }

    /// 可读名称，仅用于日志与输出
    pub fn contig_name(&self, assembly: Assembly, id: IdType) -> String {
        let refs = match assembly {
            Assembly::Master => self.master_refs,
            Assembly::Slave => self.slave_refs,
        };
        refs.and_then(|r| r.name(id))
            .map_or_else(|| format!("{}#{}", assembly, id), str::to_string)
    }

    // ── 初始化 ─────────────────────────────────────────

    /// Paired contig made of a single master contig.
    pub fn init_by_contig(&self, pctg_id: IdType, ctg_id: IdType) -> Result<PairedContig, PctgError> {
        self.standalone(pctg_id, Assembly::Master, ctg_id)
    }

    /// Paired contig made of a single contig of either assembly; used to
    /// emit candidates whose merge was rejected.
    pub fn standalone(&self, pctg_id: IdType, assembly: Assembly, ctg_id: IdType) -> Result<PairedContig, PctgError> {
        self.ensure_configured()?;
        let ctg = self.load_contig(assembly, ctg_id)?;
        let mut pctg = PairedContig::new(pctg_id);
        pctg.reset_with(&ctg, assembly);
        Ok(pctg)
    }

    pub fn add_first_contig_to(&self, pctg: &PairedContig, ctg_id: IdType) -> Result<PairedContig, PctgError> {
        if pctg.has_contigs() {
            return Err(PctgError::InvalidState(format!(
                "paired contig {} is not empty ({} contigs)",
                pctg.id(),
                pctg.contig_count()
            )));
        }
        self.init_by_contig(pctg.id(), ctg_id)
    }

    /// Seeds an empty paired contig from the first and last block shared by
    /// a master/slave pair.
    ///
    /// Layout: longer left flank, reconciled shared span, longer right flank
    /// (master wins ties). When the shared span does not pass the thresholds
    /// the result holds the master contig alone.
    pub fn add_first_block_to(
        &self,
        mut pctg: PairedContig,
        first_block: &Block,
        last_block: &Block,
    ) -> Result<PairedContig, PctgError> {
        self.ensure_configured()?;
        if pctg.has_contigs() {
            return Err(PctgError::InvalidState(format!(
                "cannot seed paired contig {}: it already holds {} contigs",
                pctg.id(),
                pctg.contig_count()
            )));
        }
        check_same_pair(first_block, last_block)?;

        let master = self.load_master_contig(first_block.master_id())?;
        let slave = self.load_slave_contig(first_block.slave_id())?;
        let strand = first_block.strand();
        let (slave, s_first, s_last) = orient(slave, first_block.slave, last_block.slave, strand);

        let (m_start, m_end) = frames_span(&first_block.master, &last_block.master, master.len());
        let (s_start, s_end) = frames_span(&s_first, &s_last, slave.len());

        let consensus = self.reconcile_windows(
            (&master.seq[m_start..m_end], &master.qual[m_start..m_end]),
            (&slave.seq[s_start..s_end], &slave.qual[s_start..s_end]),
            strand,
        );
        let (mid_seq, mid_qual) = match consensus {
            Ok(c) => c,
            Err(aln) => {
                warn!(
                    "seed {} / {} not reconcilable ({}), keeping master only",
                    self.contig_name(Assembly::Master, master.id),
                    self.contig_name(Assembly::Slave, slave.id),
                    aln.reject_reason().map_or_else(String::new, |r| r.to_string())
                );
                pctg.reset_with(&master, Assembly::Master);
                return Ok(pctg);
            }
        };

        let left_len = m_start.max(s_start);
        let m_tail = master.len() - m_end;
        let s_tail = slave.len() - s_end;

        let mut out = PairedContig::new(pctg.id());
        if s_start > m_start {
            out.push_bases(&slave.seq[..s_start], &slave.qual[..s_start]);
        } else {
            out.push_bases(&master.seq[..m_start], &master.qual[..m_start]);
        }
        out.push_bases(&mid_seq, &mid_qual);
        if s_tail > m_tail {
            out.push_bases(&slave.seq[s_end..], &slave.qual[s_end..]);
        } else {
            out.push_bases(&master.seq[m_end..], &master.qual[m_end..]);
        }

        let mid = mid_seq.len();
        let mut m_info = ContigInPctgInfo::for_contig(&master, Assembly::Master, Strand::Forward);
        m_info.offset = left_len - m_start;
        m_info.size = m_start + mid + m_tail;
        let mut s_info = ContigInPctgInfo::for_contig(&slave, Assembly::Slave, strand);
        s_info.offset = left_len - s_start;
        s_info.size = s_start + mid + s_tail;
        out.insert_info(m_info);
        out.insert_info(s_info);
        out.clip_infos();

        debug!(
            pctg = out.id(),
            len = out.len(),
            "seeded from {} + {} ({})",
            self.contig_name(Assembly::Master, master.id),
            self.contig_name(Assembly::Slave, slave.id),
            strand
        );
        debug_assert!(out.spans_within_bounds());
        Ok(out)
    }

    // ── 扩展 ───────────────────────────────────────────

    /// Extends `pctg` with the contig of the block pair it does not hold yet.
    ///
    /// If both contigs are already present the shared region is reconciled
    /// in place. If neither is present the blocks do not touch `pctg`.
    pub fn extend_by_block(
        &self,
        pctg: &PairedContig,
        first_block: &Block,
        last_block: &Block,
    ) -> Result<Outcome<PairedContig>, PctgError> {
        self.ensure_configured()?;
        check_same_pair(first_block, last_block)?;
        let has_master = pctg.contains(Assembly::Master, first_block.master_id());
        let has_slave = pctg.contains(Assembly::Slave, first_block.slave_id());

        match (has_master, has_slave) {
            (true, false) => self.merge_contig(pctg, first_block, last_block, false),
            (false, true) => self.merge_contig(pctg, first_block, last_block, true),
            (true, true) => self.reconcile_block(pctg, first_block, last_block),
            (false, false) => Err(PctgError::InvalidState(format!(
                "block {} / {} does not touch paired contig {}",
                self.contig_name(Assembly::Master, first_block.master_id()),
                self.contig_name(Assembly::Slave, first_block.slave_id()),
                pctg.id()
            ))),
        }
    }

    /// 两条 contig 均已在 paired contig 中：用 slave 证据校正 master 区间
    fn reconcile_block(
        &self,
        pctg: &PairedContig,
        first_block: &Block,
        last_block: &Block,
    ) -> Result<Outcome<PairedContig>, PctgError> {
        let slave_id = first_block.slave_id();
        let m_info = pctg
            .info(Assembly::Master, first_block.master_id())
            .cloned()
            .ok_or_else(|| PctgError::InvalidState("master info vanished".into()))?;
        let s_info = pctg
            .info(Assembly::Slave, slave_id)
            .cloned()
            .ok_or_else(|| PctgError::InvalidState("slave info vanished".into()))?;

        let slave = self.load_slave_contig(slave_id)?;
        let s_strand = m_info.strand().compose(first_block.strand());
        let rejected = |reason: RejectReason, alignment: BestPctgCtgAlignment| -> Result<Outcome<PairedContig>, PctgError> {
            Ok(Outcome::Rejected(Rejection { ctg_id: slave_id, origin: Assembly::Slave, reason, alignment }))
        };
        if s_strand != s_info.strand() {
            debug!(pctg = pctg.id(), slave = slave_id, "block orientation disagrees with placement");
            return rejected(RejectReason::NoAlignment, BestPctgCtgAlignment::empty(s_strand));
        }
        let (slave, s_first, s_last) = orient(slave, first_block.slave, last_block.slave, s_strand);
        let (s_start, s_end) = frames_span(&s_first, &s_last, slave.len());

        let (m_start, m_end) = frames_span(&first_block.master, &last_block.master, m_info.ctg_len);
        let (p_start, p_end) = m_info.pctg_range(m_start, m_end);
        let p_end = p_end.min(pctg.len());
        if p_start >= p_end || s_start >= s_end {
            return rejected(RejectReason::NoAlignment, BestPctgCtgAlignment::empty(s_strand));
        }

        match self.reconcile_windows(
            (&pctg.seq()[p_start..p_end], &pctg.qual()[p_start..p_end]),
            (&slave.seq[s_start..s_end], &slave.qual[s_start..s_end]),
            s_strand,
        ) {
            Ok((seq, qual)) => {
                let mut out = pctg.clone();
                out.splice(p_start..p_end, &seq, &qual);
                debug!(pctg = out.id(), start = p_start, end = p_end, "reconciled shared region");
                Ok(Outcome::Merged(out))
            }
            Err(aln) => {
                let reason = aln.reject_reason().unwrap_or(RejectReason::NoAlignment);
                rejected(reason, aln)
            }
        }
    }

    /// Right-end extension.
    ///
    /// Keeps `orig[..pos.0]`, then appends `gaps.0` unknown bases,
    /// `ctg[pos.1..]` and `gaps.1` unknown bases. The new length is
    /// `pos.0 + gaps.0 + (ctg.len() - pos.1) + gaps.1`. When `pos.1 > pos.0`
    /// the paired contig is shifted first so the contig head fits.
    pub fn extend_pctg_with_ctg_from<'p>(
        &self,
        orig: &'p mut PairedContig,
        ctg: &Contig,
        ctg_info: &mut ContigInPctgInfo,
        pos: (usize, usize),
        gaps: (usize, usize),
        origin: Assembly,
    ) -> &'p mut PairedContig {
        let (mut pctg_pos, ctg_pos) = (pos.0, pos.1.min(ctg.len()));
        if ctg_pos > pctg_pos {
            let shift = ctg_pos - pctg_pos;
            orig.shift(shift);
            pctg_pos += shift;
        }

        if pctg_pos > orig.len() {
            let missing = pctg_pos - orig.len();
            orig.push_unknown(missing);
        } else {
            orig.truncate(pctg_pos);
        }
        orig.push_unknown(gaps.0);
        orig.push_bases(&ctg.seq[ctg_pos..], &ctg.qual[ctg_pos..]);
        orig.push_unknown(gaps.1);

        ctg_info.id = ctg.id;
        ctg_info.origin = origin;
        ctg_info.ctg_len = ctg.len();
        ctg_info.offset = pctg_pos - ctg_pos;
        ctg_info.size = ctg.len() + gaps.0 + gaps.1;
        ctg_info.left_gap = gaps.0;
        ctg_info.right_gap = gaps.1;
        ctg_info.head_clip = 0;
        orig.insert_info(ctg_info.clone());

        debug_assert!(orig.spans_within_bounds());
        orig
    }

    /// Left-end extension.
    ///
    /// Prepends `pctg_shift` bases of `ctg` taken right before the contig
    /// position aligned with `orig[0]` (derived from `pos`), padding with
    /// unknown bases when the contig has fewer, and moves every recorded
    /// offset by `pctg_shift`. Contig bases left of the prepended ones are
    /// recorded as `head_clip`.
    pub fn extend_pctg_with_ctg_upto<'p>(
        &self,
        orig: &'p mut PairedContig,
        ctg: &Contig,
        ctg_info: &ContigInPctgInfo,
        pos: (usize, usize),
        pctg_shift: usize,
        origin: Assembly,
    ) -> &'p mut PairedContig {
        let aligned_with_start = pos.1.saturating_sub(pos.0).min(ctg.len());
        let from = aligned_with_start.saturating_sub(pctg_shift);
        let pad = pctg_shift - (aligned_with_start - from);

        let mut seq = vec![UNKNOWN_BASE; pad];
        let mut qual = vec![UNKNOWN_QUAL; pad];
        seq.extend_from_slice(&ctg.seq[from..aligned_with_start]);
        qual.extend_from_slice(&ctg.qual[from..aligned_with_start]);
        orig.prepend(&seq, &qual);

        let mut info = ctg_info.clone();
        info.id = ctg.id;
        info.origin = origin;
        info.ctg_len = ctg.len();
        info.offset = pad;
        info.head_clip = from;
        info.size = (ctg.len() - from).min(orig.len() - pad);
        info.left_gap = pad;
        info.right_gap = 0;
        orig.insert_info(info);

        debug_assert!(orig.spans_within_bounds());
        orig
    }

    /// Copy of `orig` with `shift_size` unknown bases prepended.
    pub fn shift_pctg_of(&self, orig: &PairedContig, shift_size: usize) -> PairedContig {
        let mut out = orig.clone();
        out.shift(shift_size);
        out
    }

    // ── 合并 ───────────────────────────────────────────

    /// Merges the master (`merge_master`) or slave contig of the block pair
    /// into a copy of `pctg`. The other contig of the pair is the anchor and
    /// must already be part of `pctg`.
    pub fn merge_contig(
        &self,
        pctg: &PairedContig,
        first_block: &Block,
        last_block: &Block,
        merge_master: bool,
    ) -> Result<Outcome<PairedContig>, PctgError> {
        self.ensure_configured()?;
        check_same_pair(first_block, last_block)?;

        let origin = Assembly::from_is_master(merge_master);
        let (ctg_id, anchor_id, cand_frames, anchor_frames) = if merge_master {
            (
                first_block.master_id(),
                first_block.slave_id(),
                (first_block.master, last_block.master),
                (first_block.slave, last_block.slave),
            )
        } else {
            (
                first_block.slave_id(),
                first_block.master_id(),
                (first_block.slave, last_block.slave),
                (first_block.master, last_block.master),
            )
        };

        let anchor = pctg.info(origin.other(), anchor_id).cloned().ok_or_else(|| {
            PctgError::InvalidState(format!(
                "anchor {} is not part of paired contig {}",
                self.contig_name(origin.other(), anchor_id),
                pctg.id()
            ))
        })?;
        if pctg.contains(origin, ctg_id) {
            return Err(PctgError::InvalidState(format!(
                "{} is already part of paired contig {}",
                self.contig_name(origin, ctg_id),
                pctg.id()
            )));
        }

        let ctg = self.load_contig(origin, ctg_id)?;
        let strand = anchor.strand().compose(first_block.strand());
        let (ctg, f1, f2) = orient(ctg, cand_frames.0, cand_frames.1, strand);
        let (first_frame, last_frame) = if f1.start <= f2.start { (f1, f2) } else { (f2, f1) };

        let (a_start, a_end) = frames_span(&anchor_frames.0, &anchor_frames.1, anchor.ctg_len);
        let pctg_pos = anchor.pctg_range_start(a_start, a_end);

        let best = self.find_best_alignment(pctg, &anchor, pctg_pos, &ctg, first_frame, last_frame);

        let mut out = pctg.clone();
        if let Outcome::Rejected(r) = self.merge_ctg_in_pos(&mut out, &ctg, ctg_id, &best, merge_master) {
            return Ok(Outcome::Rejected(r));
        }
        Ok(Outcome::Merged(out))
    }

    pub fn merge_ctg_in_pos<'p>(
        &self,
        pctg: &'p mut PairedContig,
        ctg: &Contig,
        ctg_id: IdType,
        best_align: &BestPctgCtgAlignment,
        merge_master: bool,
    ) -> Outcome<&'p mut PairedContig> {
        if merge_master {
            self.merge_master_ctg_in_pos(pctg, ctg, ctg_id, best_align)
        } else {
            self.merge_slave_ctg_in_pos(pctg, ctg, ctg_id, best_align)
        }
    }

    /// Master evidence wins quality ties on mismatching columns.
    pub fn merge_master_ctg_in_pos<'p>(
        &self,
        pctg: &'p mut PairedContig,
        ctg: &Contig,
        ctg_id: IdType,
        best_align: &BestPctgCtgAlignment,
    ) -> Outcome<&'p mut PairedContig> {
        self.merge_in_pos(pctg, ctg, ctg_id, best_align, Assembly::Master)
    }

    /// Slave evidence replaces a base only with strictly higher quality.
    pub fn merge_slave_ctg_in_pos<'p>(
        &self,
        pctg: &'p mut PairedContig,
        ctg: &Contig,
        ctg_id: IdType,
        best_align: &BestPctgCtgAlignment,
    ) -> Outcome<&'p mut PairedContig> {
        self.merge_in_pos(pctg, ctg, ctg_id, best_align, Assembly::Slave)
    }

    fn merge_in_pos<'p>(
        &self,
        pctg: &'p mut PairedContig,
        ctg: &Contig,
        ctg_id: IdType,
        best: &BestPctgCtgAlignment,
        origin: Assembly,
    ) -> Outcome<&'p mut PairedContig> {
        if let Some(reason) = best.reject_reason() {
            debug!(
                pctg = pctg.id(),
                len = best.length,
                homology = best.homology,
                "rejected {}: {}",
                self.contig_name(origin, ctg_id),
                reason
            );
            return Outcome::Rejected(Rejection { ctg_id, origin, reason, alignment: best.clone() });
        }

        let (p0, c0) = best.first_pair();
        let (mut p1, c1) = best.end_pair();
        // contig positions facing both ends of the paired contig
        let at_start = self.project_head(pctg, ctg, p0, c0);
        let at_end = self.project_tail(pctg, ctg, p1, c1);
        let left_over = usize::try_from(at_start).unwrap_or(0).min(ctg.len());
        let right_over = ctg.len().saturating_sub(at_end);

        let mut info = ContigInPctgInfo::for_contig(ctg, origin, best.strand);
        info.id = ctg_id;

        if left_over > 0 || right_over > 0 {
            self.resolve_columns(pctg, ctg, best, origin);
        }
        if left_over > 0 {
            self.extend_pctg_with_ctg_upto(pctg, ctg, &info, (0, left_over), left_over, origin);
            p1 += left_over;
        }
        if right_over > 0 {
            let len = pctg.len();
            if at_end <= len {
                self.extend_pctg_with_ctg_from(pctg, ctg, &mut info, (len, at_end), (0, 0), origin);
            } else {
                // contig head already in place: append the tail only
                pctg.push_bases(&ctg.seq[at_end..], &ctg.qual[at_end..]);
            }
        }

        info.id = ctg_id;
        info.offset = usize::try_from(-at_start).unwrap_or(0);
        info.head_clip = 0;
        info.left_gap = 0;
        info.right_gap = 0;
        let end = if right_over > 0 {
            pctg.len()
        } else {
            (p1 + (ctg.len() - c1.min(ctg.len()))).min(pctg.len())
        };
        info.size = end.saturating_sub(info.offset);
        pctg.insert_info(info);

        debug!(
            pctg = pctg.id(),
            left = left_over,
            right = right_over,
            homology = best.homology,
            "merged {} ({})",
            self.contig_name(origin, ctg_id),
            best.strand
        );
        debug_assert!(pctg.spans_within_bounds());
        Outcome::Merged(pctg)
    }

    /// Contig position facing `pctg[0]`, negative when the contig starts
    /// inside the paired contig. The head `pctg[..p0]` is re-aligned against
    /// the contig bases before `c0` so indels there are accounted for.
    fn project_head(&self, pctg: &PairedContig, ctg: &Contig, p0: usize, c0: usize) -> isize {
        let diagonal = c0 as isize - p0 as isize;
        if p0 == 0 || c0 == 0 {
            return diagonal;
        }
        // 等长窗口，末端对齐在 (p0, c0)
        let h = p0.min(c0).min(self.config.max_searched_alignment);
        let (r_lo, q_lo) = (p0 - h, c0 - h);
        let res = self.scorer.align(&pctg.seq()[r_lo..p0], &ctg.seq[q_lo..c0]);
        if res.columns() == 0 {
            return diagonal;
        }
        (q_lo + res.query_start) as isize - (r_lo + res.ref_start) as isize
    }

    /// Contig position facing `pctg.len()`, found by re-aligning the tail
    /// `pctg[p1..]` against the contig bases after `c1`.
    fn project_tail(&self, pctg: &PairedContig, ctg: &Contig, p1: usize, c1: usize) -> usize {
        let tail = pctg.len().saturating_sub(p1);
        if tail == 0 || c1 >= ctg.len() {
            return c1 + tail;
        }
        let r_hi = p1 + tail.min(self.config.max_searched_alignment);
        let q_hi = (c1 + (r_hi - p1) + self.config.max_gaps).min(ctg.len());
        let res = self.scorer.align(&pctg.seq()[p1..r_hi], &ctg.seq[c1..q_hi]);
        if res.columns() == 0 {
            return c1 + tail;
        }
        // 比对末端之后沿对角线推算
        c1 + res.query_end + (tail - res.ref_end)
    }

    /// 对齐列上的错配按质量取舍（master 平局胜出）
    fn resolve_columns(&self, pctg: &mut PairedContig, ctg: &Contig, best: &BestPctgCtgAlignment, origin: Assembly) {
        for (p, c, op) in best.columns() {
            if op != AlnOp::M || p >= pctg.len() || c >= ctg.len() {
                continue;
            }
            let (pb, pq) = (pctg.seq()[p], pctg.qual()[p]);
            let (cb, cq) = (ctg.seq[c], ctg.qual[c]);
            if pb == cb {
                continue;
            }
            let wins = if origin.is_master() { cq >= pq } else { cq > pq };
            if wins {
                pctg.set_base(p, cb, cq);
            }
        }
    }

    // ── 比对搜索 ───────────────────────────────────────

    /// Best local alignment between `pctg` around `pctg_pos` (bounded by
    /// `pctg_info`'s span) and `ctg[first_frame.start..last_frame.end]`.
    ///
    /// Candidate diagonals step by `band_width` over `[-max_gaps, max_gaps]`;
    /// each candidate window is scored once. Alignments cut by their window
    /// edge rank after complete ones. See
    /// [`BestPctgCtgAlignment::rank_cmp`] for the selection order.
    pub fn find_best_alignment(
        &self,
        pctg: &PairedContig,
        pctg_info: &ContigInPctgInfo,
        pctg_pos: usize,
        ctg: &Contig,
        first_frame: Frame,
        last_frame: Frame,
    ) -> BestPctgCtgAlignment {
        let cfg = &self.config;
        let strand = first_frame.strand;

        let c_start = first_frame.start.min(last_frame.start).min(ctg.len());
        let c_end = first_frame.end.max(last_frame.end).min(ctg.len());
        let c_end = c_end.min(c_start + cfg.max_searched_alignment);
        let span_lo = pctg_info.offset.min(pctg.len());
        let span_hi = pctg_info.end().min(pctg.len());
        if c_start >= c_end || span_lo >= span_hi {
            return BestPctgCtgAlignment::empty(strand);
        }
        let region = &ctg.seq[c_start..c_end];

        let mut best: Option<BestPctgCtgAlignment> = None;
        for start in candidate_starts(pctg_pos, span_lo, span_hi, cfg.band_width, cfg.max_gaps) {
            let end = (start + region.len() + cfg.max_gaps).min(span_hi);
            let res = self.scorer.align(&pctg.seq()[start..end], region);
            // 比对贴着窗口边界而两侧序列仍可继续：真实比对在窗口外
            let clipped = (res.ref_start == 0 && res.query_start > 0 && start > span_lo)
                || (res.ref_end == end - start && res.query_end < region.len() && end < span_hi);
            let mut cand = BestPctgCtgAlignment::from_window(
                &res,
                start,
                c_start,
                start as isize - pctg_pos as isize,
                strand,
                (pctg.seq(), pctg.qual()),
                (ctg.seq.as_slice(), ctg.qual.as_slice()),
                cfg,
            );
            cand.clipped = clipped && res.columns() > 0;
            let better = best
                .as_ref()
                .map_or(true, |b| cand.rank_cmp(b, cfg.min_alignment).is_gt());
            if better {
                best = Some(cand);
            }
        }

        best.unwrap_or_else(|| BestPctgCtgAlignment::empty(strand))
    }

    /// Aligns two windows and builds a consensus following `reference`:
    /// aligned columns keep the higher-quality base (reference on ties),
    /// indels follow the reference. Fails with the alignment when it does
    /// not pass the thresholds.
    fn reconcile_windows(
        &self,
        reference: (&[u8], &[u8]),
        query: (&[u8], &[u8]),
        strand: Strand,
    ) -> Result<(Vec<u8>, Vec<u8>), BestPctgCtgAlignment> {
        let cap = self.config.max_searched_alignment;
        let r_len = reference.0.len().min(cap);
        let q_len = query.0.len().min(cap);
        let res = self.scorer.align(&reference.0[..r_len], &query.0[..q_len]);
        let aln = BestPctgCtgAlignment::from_window(&res, 0, 0, 0, strand, reference, query, &self.config);
        if !aln.is_acceptable() {
            return Err(aln);
        }

        let mut seq = reference.0.to_vec();
        let mut qual = reference.1.to_vec();
        for (r, q, op) in aln.columns() {
            if op != AlnOp::M || r >= seq.len() || q >= query.0.len() {
                continue;
            }
            let (qb, qq) = (query.0[q], query.1[q]);
            if qb == seq[r] {
                qual[r] = qual[r].max(qq);
            } else if qq > qual[r] {
                seq[r] = qb;
                qual[r] = qq;
            }
        }
        Ok((seq, qual))
    }
}

fn check_same_pair(first: &Block, last: &Block) -> Result<(), PctgError> {
    if first.same_pair(last) {
        Ok(())
    } else {
        Err(PctgError::InvalidState(format!(
            "first/last blocks name different contig pairs ({}/{} vs {}/{})",
            first.master_id(),
            first.slave_id(),
            last.master_id(),
            last.slave_id()
        )))
    }
}

/// 按方向返回 contig（必要时反向互补）及映射后的两个 frame
fn orient(ctg: Contig, first: Frame, last: Frame, strand: Strand) -> (Contig, Frame, Frame) {
    if strand.is_reverse() {
        let len = ctg.len();
        let mut f1 = first.reversed_within(len);
        let mut f2 = last.reversed_within(len);
        f1.strand = Strand::Reverse;
        f2.strand = Strand::Reverse;
        (ctg.reverse_complement(), f1, f2)
    } else {
        let mut f1 = first;
        let mut f2 = last;
        f1.strand = Strand::Forward;
        f2.strand = Strand::Forward;
        (ctg, f1, f2)
    }
}

/// Union of two frames clamped to `[0, len]`.
fn frames_span(a: &Frame, b: &Frame, len: usize) -> (usize, usize) {
    let start = a.start.min(b.start).min(len);
    let end = a.end.max(b.end).min(len).max(start);
    (start, end)
}

/// Window starts for the candidate diagonals, nearest first (negative
/// before positive), clamped into `[lo, hi)` and deduplicated.
fn candidate_starts(pctg_pos: usize, lo: usize, hi: usize, step: usize, max_gaps: usize) -> Vec<usize> {
    let step = step.max(1);
    let mut starts: Vec<usize> = Vec::new();
    let mut push = |d: isize| {
        let s = (pctg_pos as isize + d).clamp(lo as isize, hi as isize - 1) as usize;
        if !starts.contains(&s) {
            starts.push(s);
        }
    };
    push(0);
    let mut d = step;
    while d <= max_gaps {
        push(-(d as isize));
        push(d as isize);
        d += step;
    }
    starts
}
