/// 未知碱基（占位 / 低置信度位置）
pub const UNKNOWN_BASE: u8 = b'N';
/// 未知碱基的质量值
pub const UNKNOWN_QUAL: u8 = 0;
/// FASTA 输入没有质量信息时使用的统一质量值
pub const DEFAULT_QUALITY: u8 = 20;
/// FASTQ 质量字符的 phred 偏移（Sanger / Illumina 1.8+）
pub const PHRED_OFFSET: u8 = 33;

pub fn normalize_seq(seq: &[u8]) -> Vec<u8> {
    seq.iter().map(|&b| normalize_base(b)).collect()
}

#[inline]
pub fn normalize_base(b: u8) -> u8 {
    let up = b.to_ascii_uppercase();
    match up {
        b'A' | b'C' | b'G' | b'T' | b'N' => up,
        b'U' => b'T',
        _ => UNKNOWN_BASE,
    }
}

#[inline]
pub fn complement(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' | b'U' => b'A',
        _ => UNKNOWN_BASE,
    }
}

pub fn revcomp(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}

/// 将 FASTQ 质量字符串转换为 phred 数值
pub fn phred_from_ascii(qual: &[u8]) -> Vec<u8> {
    qual.iter().map(|&q| q.saturating_sub(PHRED_OFFSET)).collect()
}

/// 是否为可比较的确定碱基（N 与任何碱基都不构成错配证据）
#[inline]
pub fn is_called(base: u8) -> bool {
    base != UNKNOWN_BASE
}
