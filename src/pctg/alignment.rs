use std::cmp::Ordering;

use super::config::MergeConfig;
use super::error::RejectReason;
use crate::align::{AlnOp, SwResult};
use crate::assembly::Strand;

/// paired contig 区域与候选 contig 之间的最佳局部比对
///
/// 坐标均为绝对坐标：`pctg_*` 在 paired contig 上，`ctg_*` 在（已定向的）候选
/// contig 上，区间左闭右开。
#[derive(Debug, Clone, PartialEq)]
pub struct BestPctgCtgAlignment {
    pub pctg_start: usize,
    pub pctg_end: usize,
    pub ctg_start: usize,
    pub ctg_end: usize,
    /// 候选 contig 相对原始序列的方向
    pub strand: Strand,
    /// 产生此比对的候选对角线偏移
    pub diagonal: isize,
    /// 比对列数
    pub length: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub indels: usize,
    pub homology: f64,
    /// 冲突约束：两侧碱基质量都足够高的错配列 (pctg 位置, ctg 位置)
    pub disattended: Vec<(usize, usize)>,
    pub cigar: Vec<(AlnOp, usize)>,
    /// 比对被搜索窗口边界截断（真实比对延伸到窗口之外）
    pub clipped: bool,
    verdict: Option<RejectReason>,
}

impl BestPctgCtgAlignment {
    /// An alignment that found nothing; never acceptable.
    pub fn empty(strand: Strand) -> Self {
        Self {
            pctg_start: 0,
            pctg_end: 0,
            ctg_start: 0,
            ctg_end: 0,
            strand,
            diagonal: 0,
            length: 0,
            matches: 0,
            mismatches: 0,
            indels: 0,
            homology: 0.0,
            disattended: Vec::new(),
            cigar: Vec::new(),
            clipped: false,
            verdict: Some(RejectReason::NoAlignment),
        }
    }

    /// Lifts a window-relative scorer result to absolute coordinates and
    /// collects the disattended constraints from the base qualities.
    pub fn from_window(
        res: &SwResult,
        pctg_offset: usize,
        ctg_offset: usize,
        diagonal: isize,
        strand: Strand,
        pctg_bases: (&[u8], &[u8]),
        ctg_bases: (&[u8], &[u8]),
        config: &MergeConfig,
    ) -> Self {
        if res.columns() == 0 {
            return Self::empty(strand);
        }
        let (pseq, pqual) = pctg_bases;
        let (cseq, cqual) = ctg_bases;
        let min_q = config.disattended_quality;

        let mut disattended = Vec::new();
        for (r, q, op) in res.columns_iter() {
            if op != AlnOp::M {
                continue;
            }
            let (pp, cp) = (pctg_offset + r, ctg_offset + q);
            let (Some(&pb), Some(&cb)) = (pseq.get(pp), cseq.get(cp)) else {
                continue;
            };
            if pb != cb && pqual.get(pp).copied().unwrap_or(0) >= min_q && cqual.get(cp).copied().unwrap_or(0) >= min_q {
                disattended.push((pp, cp));
            }
        }

        let mut aln = Self {
            pctg_start: pctg_offset + res.ref_start,
            pctg_end: pctg_offset + res.ref_end,
            ctg_start: ctg_offset + res.query_start,
            ctg_end: ctg_offset + res.query_end,
            strand,
            diagonal,
            length: res.columns(),
            matches: res.matches,
            mismatches: res.mismatches,
            indels: res.indels,
            homology: res.homology(),
            disattended,
            cigar: res.cigar.clone(),
            clipped: false,
            verdict: None,
        };
        aln.evaluate(config);
        aln
    }

    /// 依据阈值重新判定是否可接受
    pub fn evaluate(&mut self, config: &MergeConfig) {
        self.verdict = if self.length == 0 {
            Some(RejectReason::NoAlignment)
        } else if self.length < config.min_alignment {
            Some(RejectReason::TooShort)
        } else if self.homology < config.min_homology {
            Some(RejectReason::LowHomology)
        } else if self.disattended_ratio() > config.min_alignment_quotient {
            Some(RejectReason::TooManyDisattended)
        } else {
            None
        };
    }

    pub fn is_acceptable(&self) -> bool {
        self.verdict.is_none()
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        self.verdict
    }

    pub fn disattended_ratio(&self) -> f64 {
        if self.length == 0 {
            0.0
        } else {
            self.disattended.len() as f64 / self.length as f64
        }
    }

    /// 第一对对齐位置 (pctg, ctg)
    pub fn first_pair(&self) -> (usize, usize) {
        (self.pctg_start, self.ctg_start)
    }

    /// 最后一对对齐位置之后的位置 (pctg, ctg)
    pub fn end_pair(&self) -> (usize, usize) {
        (self.pctg_end, self.ctg_end)
    }

    /// Absolute `(pctg_pos, ctg_pos, op)` for every alignment column.
    pub fn columns(&self) -> impl Iterator<Item = (usize, usize, AlnOp)> + '_ {
        let mut p = self.pctg_start;
        let mut c = self.ctg_start;
        self.cigar
            .iter()
            .flat_map(|&(op, len)| std::iter::repeat(op).take(len))
            .map(move |op| {
                let col = (p, c, op);
                match op {
                    AlnOp::M => {
                        p += 1;
                        c += 1;
                    }
                    AlnOp::I => c += 1,
                    AlnOp::D => p += 1,
                }
                col
            })
    }

    /// Candidate ranking used by the search.
    ///
    /// Candidates reaching `min_alignment` come first, then candidates not
    /// clipped by their search window; then higher homology, longer
    /// alignment, smaller `|diagonal|`, and finally the smaller (leftmost)
    /// diagonal.
    pub fn rank_cmp(&self, other: &Self, min_alignment: usize) -> Ordering {
        let floor_a = self.length >= min_alignment && self.length > 0;
        let floor_b = other.length >= min_alignment && other.length > 0;
        floor_a
            .cmp(&floor_b)
            .then(other.clipped.cmp(&self.clipped))
            .then(self.homology.total_cmp(&other.homology))
            .then(self.length.cmp(&other.length))
            .then(other.diagonal.unsigned_abs().cmp(&self.diagonal.unsigned_abs()))
            .then(other.diagonal.cmp(&self.diagonal))
    }
}
