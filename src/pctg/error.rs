use thiserror::Error;

use super::alignment::BestPctgCtgAlignment;
use super::info::Assembly;
use crate::assembly::IdType;

/// Errors raised by the paired contig builder.
///
/// Alignment rejection is not an error: it is reported through
/// [`Outcome::Rejected`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PctgError {
    #[error("{assembly} contig {id} not found in pool")]
    NotFound { assembly: Assembly, id: IdType },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("builder is missing its {0}")]
    Unconfigured(&'static str),

    #[error("invalid block: {0}")]
    InvalidBlock(String),
}

/// 比对未通过阈值的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// 搜索窗口内没有任何局部比对
    NoAlignment,
    /// 比对长度低于 `min_alignment`
    TooShort,
    /// 同源度低于 `min_homology`
    LowHomology,
    /// 冲突约束比例超过 `min_alignment_quotient`
    TooManyDisattended,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RejectReason::NoAlignment => "no alignment",
            RejectReason::TooShort => "alignment too short",
            RejectReason::LowHomology => "homology too low",
            RejectReason::TooManyDisattended => "too many disattended constraints",
        };
        f.write_str(s)
    }
}

/// A candidate contig that could not be merged into a paired contig.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub ctg_id: IdType,
    pub origin: Assembly,
    pub reason: RejectReason,
    pub alignment: BestPctgCtgAlignment,
}

/// 合并操作的结果：成功合并，或因阈值被拒绝（由调用方将候选 contig 单独输出）
#[derive(Debug)]
pub enum Outcome<T> {
    Merged(T),
    Rejected(Rejection),
}

impl<T> Outcome<T> {
    pub fn is_merged(&self) -> bool {
        matches!(self, Outcome::Merged(_))
    }

    pub fn merged(self) -> Option<T> {
        match self {
            Outcome::Merged(v) => Some(v),
            Outcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::Merged(_) => None,
            Outcome::Rejected(r) => Some(r),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Merged(v) => Outcome::Merged(f(v)),
            Outcome::Rejected(r) => Outcome::Rejected(r),
        }
    }
}
