use std::collections::BTreeMap;
use std::ops::Range;

use super::info::{Assembly, ContigInPctgInfo};
use crate::assembly::{Contig, IdType};
use crate::util::dna::{UNKNOWN_BASE, UNKNOWN_QUAL};

/// 合并中的 paired contig：碱基序列 + 各源 contig 的位置记录
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PairedContig {
    id: IdType,
    seq: Vec<u8>,
    qual: Vec<u8>,
    master: BTreeMap<IdType, ContigInPctgInfo>,
    slave: BTreeMap<IdType, ContigInPctgInfo>,
}

impl PairedContig {
    pub fn new(id: IdType) -> Self {
        Self { id, ..Self::default() }
    }

    #[inline]
    pub fn id(&self) -> IdType {
        self.id
    }

    pub fn set_id(&mut self, id: IdType) {
        self.id = id;
    }

    #[inline]
    pub fn seq(&self) -> &[u8] {
        &self.seq
    }

    #[inline]
    pub fn qual(&self) -> &[u8] {
        &self.qual
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    /// No bases and no contributing contigs.
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty() && !self.has_contigs()
    }

    pub fn has_contigs(&self) -> bool {
        !self.master.is_empty() || !self.slave.is_empty()
    }

    pub fn contig_count(&self) -> usize {
        self.master.len() + self.slave.len()
    }

    fn map(&self, origin: Assembly) -> &BTreeMap<IdType, ContigInPctgInfo> {
        match origin {
            Assembly::Master => &self.master,
            Assembly::Slave => &self.slave,
        }
    }

    pub fn contains(&self, origin: Assembly, id: IdType) -> bool {
        self.map(origin).contains_key(&id)
    }

    pub fn info(&self, origin: Assembly, id: IdType) -> Option<&ContigInPctgInfo> {
        self.map(origin).get(&id)
    }

    pub fn master_infos(&self) -> impl Iterator<Item = &ContigInPctgInfo> {
        self.master.values()
    }

    pub fn slave_infos(&self) -> impl Iterator<Item = &ContigInPctgInfo> {
        self.slave.values()
    }

    pub fn infos(&self) -> impl Iterator<Item = &ContigInPctgInfo> {
        self.master.values().chain(self.slave.values())
    }

    fn infos_mut(&mut self) -> impl Iterator<Item = &mut ContigInPctgInfo> {
        self.master.values_mut().chain(self.slave.values_mut())
    }

    /// 每条记录都满足 `offset + size <= len`
    pub fn spans_within_bounds(&self) -> bool {
        let len = self.len();
        self.infos().all(|i| i.end() <= len)
    }

    pub(crate) fn insert_info(&mut self, info: ContigInPctgInfo) {
        let map = match info.origin {
            Assembly::Master => &mut self.master,
            Assembly::Slave => &mut self.slave,
        };
        map.insert(info.id, info);
    }

    /// Replaces the whole sequence with a contig's bases and records a single
    /// info spanning it.
    pub(crate) fn reset_with(&mut self, ctg: &Contig, origin: Assembly) {
        self.seq = ctg.seq.clone();
        self.qual = ctg.qual.clone();
        self.master.clear();
        self.slave.clear();
        self.insert_info(ContigInPctgInfo::new(ctg.id, origin, ctg.len(), 0));
    }

    pub(crate) fn push_bases(&mut self, seq: &[u8], qual: &[u8]) {
        debug_assert_eq!(seq.len(), qual.len());
        self.seq.extend_from_slice(seq);
        self.qual.extend_from_slice(qual);
    }

    pub(crate) fn push_unknown(&mut self, n: usize) {
        self.seq.resize(self.seq.len() + n, UNKNOWN_BASE);
        self.qual.resize(self.qual.len() + n, UNKNOWN_QUAL);
    }

    /// 截断序列，并把越界的记录裁剪到新边界
    pub(crate) fn truncate(&mut self, len: usize) {
        self.seq.truncate(len);
        self.qual.truncate(len);
        self.clip_infos();
    }

    pub(crate) fn clip_infos(&mut self) {
        let len = self.len();
        for info in self.infos_mut() {
            info.clip_to(len);
        }
    }

    /// Prepends `seq`/`qual` and moves every recorded offset right by the
    /// prepended length.
    pub(crate) fn prepend(&mut self, seq: &[u8], qual: &[u8]) {
        debug_assert_eq!(seq.len(), qual.len());
        let n = seq.len();
        if n == 0 {
            return;
        }
        self.seq.splice(0..0, seq.iter().copied());
        self.qual.splice(0..0, qual.iter().copied());
        for info in self.infos_mut() {
            info.offset += n;
        }
    }

    /// 在左端插入 `n` 个未知碱基
    pub(crate) fn shift(&mut self, n: usize) {
        let seq = vec![UNKNOWN_BASE; n];
        let qual = vec![UNKNOWN_QUAL; n];
        self.prepend(&seq, &qual);
    }

    /// Replaces `range` with new bases, keeping every recorded span valid:
    /// spans after the range move by the length difference, spans covering
    /// it grow or shrink with it.
    pub(crate) fn splice(&mut self, range: Range<usize>, seq: &[u8], qual: &[u8]) {
        debug_assert_eq!(seq.len(), qual.len());
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        let old = end - start;
        let new = seq.len();
        self.seq.splice(start..end, seq.iter().copied());
        self.qual.splice(start..end, qual.iter().copied());

        for info in self.infos_mut() {
            if info.offset >= end {
                info.offset = info.offset + new - old;
            } else if info.offset <= start && info.end() >= end {
                info.size = info.size + new - old;
            } else if info.end() > start {
                // partial overlap
                let tail = info.end().saturating_sub(end);
                if info.offset < start {
                    info.size = (start - info.offset) + new + tail;
                } else {
                    let into = (info.offset - start).min(new);
                    info.offset = start + into;
                    info.size = (new - into) + tail;
                }
            }
        }
        self.clip_infos();
    }

    pub(crate) fn set_base(&mut self, pos: usize, base: u8, qual: u8) {
        if pos < self.seq.len() {
            self.seq[pos] = base;
            self.qual[pos] = qual;
        }
    }
}
