use std::fmt;

use crate::assembly::{Contig, IdType, Strand};

/// contig 所属的组装
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Assembly {
    Master,
    Slave,
}

impl Assembly {
    pub fn from_is_master(is_master: bool) -> Self {
        if is_master {
            Assembly::Master
        } else {
            Assembly::Slave
        }
    }

    pub fn is_master(self) -> bool {
        matches!(self, Assembly::Master)
    }

    pub fn other(self) -> Self {
        match self {
            Assembly::Master => Assembly::Slave,
            Assembly::Slave => Assembly::Master,
        }
    }
}

impl fmt::Display for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assembly::Master => f.write_str("master"),
            Assembly::Slave => f.write_str("slave"),
        }
    }
}

/// 单条源 contig 在 paired contig 中的位置记录
///
/// `offset..offset + size` 是该 contig 在 paired contig 中覆盖的区间（含 gap）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContigInPctgInfo {
    pub id: IdType,
    pub origin: Assembly,
    /// contig 以反向互补形式存放在 paired contig 中
    pub reversed: bool,
    pub ctg_len: usize,
    pub offset: usize,
    pub size: usize,
    pub left_gap: usize,
    pub right_gap: usize,
    /// 左端被截去、未进入 paired contig 的 contig 碱基数（按 paired contig 方向）
    pub head_clip: usize,
}

impl ContigInPctgInfo {
    pub fn new(id: IdType, origin: Assembly, ctg_len: usize, offset: usize) -> Self {
        Self { id, origin, reversed: false, ctg_len, offset, size: ctg_len, left_gap: 0, right_gap: 0, head_clip: 0 }
    }

    /// Template info for a contig about to be placed, oriented by `strand`.
    pub fn for_contig(ctg: &Contig, origin: Assembly, strand: Strand) -> Self {
        let mut info = Self::new(ctg.id, origin, ctg.len(), 0);
        info.reversed = strand.is_reverse();
        info
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.size
    }

    pub fn strand(&self) -> Strand {
        if self.reversed {
            Strand::Reverse
        } else {
            Strand::Forward
        }
    }

    /// 将 contig 原始坐标映射到 paired contig 坐标（落在记录的区间内）
    pub fn pctg_pos(&self, ctg_pos: usize) -> usize {
        let oriented = if self.reversed {
            self.ctg_len.saturating_sub(ctg_pos + 1)
        } else {
            ctg_pos
        };
        self.offset + oriented.saturating_sub(self.head_clip).min(self.size.saturating_sub(1))
    }

    /// Start of the paired-contig range covered by `[start, end)` on the contig.
    pub fn pctg_range_start(&self, start: usize, end: usize) -> usize {
        if self.reversed {
            self.pctg_pos(end.saturating_sub(1).max(start))
        } else {
            self.pctg_pos(start)
        }
    }

    /// Paired-contig range covered by `[start, end)` on the contig.
    pub fn pctg_range(&self, start: usize, end: usize) -> (usize, usize) {
        let a = self.pctg_range_start(start, end);
        let b = if self.reversed { self.pctg_pos(start) } else { self.pctg_pos(end.saturating_sub(1).max(start)) };
        (a, (b + 1).max(a))
    }

    pub fn overlaps(&self, other: &ContigInPctgInfo) -> bool {
        self.offset < other.end() && other.offset < self.end()
    }

    /// 收缩到 paired contig 的边界内
    pub(crate) fn clip_to(&mut self, pctg_len: usize) {
        if self.offset > pctg_len {
            self.offset = pctg_len;
        }
        if self.end() > pctg_len {
            self.size = pctg_len - self.offset;
        }
    }
}
