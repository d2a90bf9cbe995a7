pub mod sw;

pub use sw::{banded_sw, banded_sw_with_buf, AlnOp, SwBuffer, SwParams, SwResult};

/// 比对打分原语：给定两个窗口，返回最佳局部比对
///
/// `reference` 为 paired contig 窗口，`query` 为候选 contig 窗口；
/// 结果坐标相对于各自窗口。实现必须可在线程间共享。
pub trait AlignmentScorer: Send + Sync {
    fn align(&self, reference: &[u8], query: &[u8]) -> SwResult;
}

/// Default scorer: banded affine-gap Smith-Waterman.
#[derive(Debug, Clone, Copy, Default)]
pub struct BandedSw {
    pub params: SwParams,
}

impl BandedSw {
    pub fn new(params: SwParams) -> Self {
        Self { params }
    }

    pub fn with_band(band_width: usize) -> Self {
        Self { params: SwParams { band_width, ..SwParams::default() } }
    }
}

impl AlignmentScorer for BandedSw {
    fn align(&self, reference: &[u8], query: &[u8]) -> SwResult {
        banded_sw(query, reference, self.params)
    }
}

impl<T: AlignmentScorer + ?Sized> AlignmentScorer for &T {
    fn align(&self, reference: &[u8], query: &[u8]) -> SwResult {
        (**self).align(reference, query)
    }
}
