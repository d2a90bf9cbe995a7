use std::fmt;

use serde::{Deserialize, Serialize};

use super::contig::IdType;
use crate::pctg::PctgError;

/// 链方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Strand {
    #[default]
    Forward,
    Reverse,
}

impl Strand {
    pub fn flip(self) -> Self {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
        }
    }

    pub fn is_reverse(self) -> bool {
        matches!(self, Strand::Reverse)
    }

    /// Combines two orientations: reverse twice is forward again.
    pub fn compose(self, other: Strand) -> Self {
        if self == other {
            Strand::Forward
        } else {
            Strand::Reverse
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

/// contig 上带方向的坐标区间 [start, end)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub ctg_id: IdType,
    pub start: usize,
    pub end: usize,
    pub strand: Strand,
}

impl Frame {
    pub fn new(ctg_id: IdType, start: usize, end: usize, strand: Strand) -> Self {
        debug_assert!(start <= end, "frame start {} > end {}", start, end);
        Self { ctg_id, start, end: end.max(start), strand }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// 映射到反向互补后的 contig（长度为 `ctg_len`）上
    pub fn reversed_within(&self, ctg_len: usize) -> Self {
        let end = ctg_len.saturating_sub(self.start);
        let start = ctg_len.saturating_sub(self.end);
        Self { ctg_id: self.ctg_id, start, end, strand: self.strand.flip() }
    }
}

/// master contig 区间与 slave contig 区间之间的一致性证据
///
/// master 区间总是正向；slave 区间的方向即整个 block 的方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub master: Frame,
    pub slave: Frame,
}

impl Block {
    pub fn new(master: Frame, slave: Frame) -> Result<Self, PctgError> {
        if master.is_empty() || slave.is_empty() {
            return Err(PctgError::InvalidBlock(format!(
                "empty range in block master {}:{}-{} / slave {}:{}-{}",
                master.ctg_id, master.start, master.end, slave.ctg_id, slave.start, slave.end
            )));
        }
        if master.strand.is_reverse() {
            return Err(PctgError::InvalidBlock(format!(
                "master frame of contig {} must be forward",
                master.ctg_id
            )));
        }
        Ok(Self { master, slave })
    }

    /// Shorthand used by readers and tests.
    pub fn from_coords(
        master_id: IdType,
        master_range: (usize, usize),
        slave_id: IdType,
        slave_range: (usize, usize),
        strand: Strand,
    ) -> Result<Self, PctgError> {
        Self::new(
            Frame::new(master_id, master_range.0, master_range.1, Strand::Forward),
            Frame::new(slave_id, slave_range.0, slave_range.1, strand),
        )
    }

    #[inline]
    pub fn master_id(&self) -> IdType {
        self.master.ctg_id
    }

    #[inline]
    pub fn slave_id(&self) -> IdType {
        self.slave.ctg_id
    }

    #[inline]
    pub fn strand(&self) -> Strand {
        self.slave.strand
    }

    /// 两个 block 是否连接同一对 contig 且方向一致
    pub fn same_pair(&self, other: &Block) -> bool {
        self.master_id() == other.master_id()
            && self.slave_id() == other.slave_id()
            && self.strand() == other.strand()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_rejects_empty_ranges() {
        assert!(Block::from_coords(0, (10, 10), 1, (0, 5), Strand::Forward).is_err());
        assert!(Block::from_coords(0, (0, 10), 1, (5, 5), Strand::Forward).is_err());
        assert!(Block::from_coords(0, (0, 10), 1, (0, 10), Strand::Reverse).is_ok());
    }

    #[test]
    fn frame_reversal_round_trips() {
        let f = Frame::new(3, 10, 40, Strand::Forward);
        let r = f.reversed_within(100);
        assert_eq!((r.start, r.end, r.strand), (60, 90, Strand::Reverse));
        assert_eq!(r.reversed_within(100), f);
    }

    #[test]
    fn strand_composition() {
        assert_eq!(Strand::Reverse.compose(Strand::Reverse), Strand::Forward);
        assert_eq!(Strand::Forward.compose(Strand::Reverse), Strand::Reverse);
        assert_eq!(Strand::Reverse.to_string(), "-");
    }
}
