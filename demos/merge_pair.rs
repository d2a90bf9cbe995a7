//! 演示如何在 library 模式下用 gam-rust 合并两条重叠的 contig。
//!
//! 运行方式：
//! ```bash
//! cargo run --example merge_pair
//! ```

use gam_rust::assembly::{Block, Strand};
use gam_rust::io::fasta::FastaWriter;
use gam_rust::pctg::{Assembly, MergeConfig, Outcome, PctgBuilder};
use gam_rust::pool::ContigPool;

fn main() -> anyhow::Result<()> {
    // 1. 构造一段"真实"基因组，并从中切出两个组装的 contig
    let genome: Vec<u8> = b"ACGTTGCAAGGCTTACCGATAGCTTAGGCATCGATCCGTAAGCTTGACCATGGTACGATCG"
        .iter()
        .cycle()
        .take(900)
        .enumerate()
        .map(|(i, &b)| if i % 97 == 0 { b'T' } else { b })
        .collect();
    let master = ContigPool::from_named(vec![("master_ctg", genome[0..600].to_vec(), None)]);
    let slave = ContigPool::from_named(vec![("slave_ctg", genome[350..900].to_vec(), None)]);
    println!("master: {} bp, slave: {} bp", master.total_len(), slave.total_len());

    // 2. 以 master 为起点，用 block 证据合并 slave
    let builder = PctgBuilder::new(MergeConfig::default()).with_assemblies(&master, &slave);
    let pctg = builder.init_by_contig(0, 0)?;
    let block = Block::from_coords(0, (350, 600), 0, (0, 250), Strand::Forward)?;

    let merged = match builder.extend_by_block(&pctg, &block, &block)? {
        Outcome::Merged(p) => p,
        Outcome::Rejected(r) => {
            println!("slave rejected: {} (homology {:.3})", r.reason, r.alignment.homology);
            pctg
        }
    };

    // 3. 输出结果
    for info in merged.infos() {
        println!(
            "{} {}: offset={} size={} reversed={}",
            info.origin,
            builder.contig_name(info.origin, info.id),
            info.offset,
            info.size,
            info.reversed
        );
    }
    println!("paired contig: {} bp, contains slave: {}", merged.len(), merged.contains(Assembly::Slave, 0));

    let mut writer = FastaWriter::new(std::io::stdout());
    writer.write_all([&merged], &master.refs, &slave.refs)?;
    Ok(())
}
