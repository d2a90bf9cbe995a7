use serde::{Deserialize, Serialize};

use crate::util::dna;

/// 组装中 contig 的数值标识（与 BAM header 中的 reference ID 一致）
pub type IdType = u32;

/// 一条组装序列：碱基 + 逐碱基质量
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contig {
    pub id: IdType,
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
}

impl Contig {
    /// Builds a contig with a uniform default quality.
    pub fn new(id: IdType, seq: &[u8]) -> Self {
        let seq = dna::normalize_seq(seq);
        let qual = vec![dna::DEFAULT_QUALITY; seq.len()];
        Self { id, seq, qual }
    }

    /// Builds a contig with explicit per-base phred qualities.
    ///
    /// Missing trailing qualities are filled with the default quality and
    /// extra ones are dropped, so `seq` and `qual` always have equal length.
    pub fn with_qual(id: IdType, seq: &[u8], qual: &[u8]) -> Self {
        let seq = dna::normalize_seq(seq);
        let mut qual = qual.to_vec();
        qual.resize(seq.len(), dna::DEFAULT_QUALITY);
        Self { id, seq, qual }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// 反向互补副本（质量值同步反转）
    pub fn reverse_complement(&self) -> Self {
        let mut qual = self.qual.clone();
        qual.reverse();
        Self { id: self.id, seq: dna::revcomp(&self.seq), qual }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_contig_normalizes_and_fills_quality() {
        let c = Contig::new(7, b"acgtx");
        assert_eq!(c.id, 7);
        assert_eq!(c.seq, b"ACGTN");
        assert_eq!(c.qual, vec![dna::DEFAULT_QUALITY; 5]);
    }

    #[test]
    fn with_qual_pads_short_quality() {
        let c = Contig::with_qual(1, b"ACGT", &[40, 30]);
        assert_eq!(c.qual, vec![40, 30, dna::DEFAULT_QUALITY, dna::DEFAULT_QUALITY]);
    }

    #[test]
    fn reverse_complement_flips_quality() {
        let c = Contig::with_qual(1, b"AACG", &[1, 2, 3, 4]);
        let rc = c.reverse_complement();
        assert_eq!(rc.seq, b"CGTT");
        assert_eq!(rc.qual, vec![4, 3, 2, 1]);
        assert_eq!(rc.reverse_complement(), c);
    }
}
