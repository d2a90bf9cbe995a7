use serde::{Deserialize, Serialize};

use crate::util::dna::DEFAULT_QUALITY;

pub const DEFAULT_MAX_GAPS: usize = 300;
pub const DEFAULT_MAX_SEARCHED_ALIGNMENT: usize = 400_000;
pub const DEFAULT_MIN_ALIGNMENT: usize = 100;
pub const DEFAULT_MIN_HOMOLOGY: f64 = 0.85;
pub const DEFAULT_MIN_ALIGNMENT_QUOTIENT: f64 = 0.001;
pub const DEFAULT_BAND_WIDTH: usize = 32;
/// 与 FASTA 碱基的默认质量相同
pub const DEFAULT_DISATTENDED_QUALITY: u8 = DEFAULT_QUALITY;

/// 合并接受策略与搜索上限
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// 可接受比对的最小长度（列数）
    pub min_alignment: usize,
    /// 最小同源度，取值 [0, 1]
    pub min_homology: f64,
    /// 冲突约束数 / 比对长度 的上限
    pub min_alignment_quotient: f64,
    /// 搜索的最大对角线偏移（即允许的最大 gap）
    pub max_gaps: usize,
    /// 单次比对窗口的最大长度
    pub max_searched_alignment: usize,
    /// 候选对角线步长，同时也是打分器的带宽
    pub band_width: usize,
    /// 错配两侧碱基质量都不低于此值时记为冲突约束
    pub disattended_quality: u8,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            min_alignment: DEFAULT_MIN_ALIGNMENT,
            min_homology: DEFAULT_MIN_HOMOLOGY,
            min_alignment_quotient: DEFAULT_MIN_ALIGNMENT_QUOTIENT,
            max_gaps: DEFAULT_MAX_GAPS,
            max_searched_alignment: DEFAULT_MAX_SEARCHED_ALIGNMENT,
            band_width: DEFAULT_BAND_WIDTH,
            disattended_quality: DEFAULT_DISATTENDED_QUALITY,
        }
    }
}

impl MergeConfig {
    /// Clamps out-of-range values instead of failing: homology and quotient
    /// into `[0, 1]`, band width to at least 1.
    pub fn sanitized(mut self) -> Self {
        self.min_homology = self.min_homology.clamp(0.0, 1.0);
        self.min_alignment_quotient = self.min_alignment_quotient.clamp(0.0, 1.0);
        self.band_width = self.band_width.max(1);
        self
    }
}
