//! # gam-rust
//!
//! 受 [GAM-NGS](https://github.com/vice87/gam-ngs) 启发的 Rust 版基因组组装合并工具。
//!
//! 给定一个 **master** 组装与一个 **slave** 组装，以及两者之间的 block
//! （master contig 区间与 slave contig 区间的一致性证据），本 crate 将两者
//! 合并为 **paired contig**：共享区域按碱基质量取舍，仅一侧覆盖的区域用该侧
//! 序列延伸。
//!
//! - **Contig 池**：从 FASTA / FASTQ 构建，按 ID 查找，可序列化为 `.pool`
//! - **比对打分**：带状仿射间隙 Smith-Waterman 局部对齐
//! - **Paired contig 构建**：初始化、左右延伸、原位校正、阈值判定
//! - **合并驱动**：按 block 图的连通分量并行构建全部 paired contig
//!
//! ## 快速示例
//!
//! ```rust,no_run
//! use gam_rust::assembly::{Block, Strand};
//! use gam_rust::pctg::{MergeConfig, PairedContig, PctgBuilder};
//! use gam_rust::pool::ContigPool;
//!
//! let master = ContigPool::from_named(vec![("m0", b"ACGT".repeat(150), None)]);
//! let slave = ContigPool::from_named(vec![("s0", b"ACGT".repeat(160), None)]);
//! let builder = PctgBuilder::new(MergeConfig::default()).with_assemblies(&master, &slave);
//!
//! let block = Block::from_coords(0, (100, 400), 0, (100, 400), Strand::Forward)?;
//! let pctg = builder.add_first_block_to(PairedContig::new(0), &block, &block)?;
//! println!("paired contig of {} bp, {} contigs", pctg.len(), pctg.contig_count());
//! # Ok::<(), gam_rust::pctg::PctgError>(())
//! ```
//!
//! ## 模块说明
//!
//! - [`assembly`]：contig、frame、block 等输入类型
//! - [`pool`]：contig 池与参考名表
//! - [`align`]：比对打分原语（Smith-Waterman）
//! - [`pctg`]：paired contig 及其构建器
//! - [`merge`]：合并驱动
//! - [`io`]：FASTA / FASTQ / block 表读取，paired contig 输出
//! - [`util`]：DNA 规范化、反向互补等工具函数

pub mod align;
pub mod assembly;
pub mod io;
pub mod merge;
pub mod pctg;
pub mod pool;
pub mod util;
