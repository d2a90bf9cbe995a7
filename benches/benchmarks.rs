use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gam_rust::align::{self, SwBuffer, SwParams};
use gam_rust::assembly::{Block, Frame, Strand};
use gam_rust::merge::merge_assemblies;
use gam_rust::pctg::{Assembly, MergeConfig, PctgBuilder};
use gam_rust::pool::ContigPool;

fn make_sequence(len: usize, seed: u32) -> Vec<u8> {
    let bases = [b'A', b'C', b'G', b'T'];
    let mut seq = Vec::with_capacity(len);
    let mut x: u32 = seed;
    for _ in 0..len {
        x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        seq.push(bases[(x >> 16) as usize % 4]);
    }
    seq
}

fn bench_banded_sw(c: &mut Criterion) {
    let query = make_sequence(1_000, 42);
    let mut ref_seq = query.clone();
    ref_seq[500] = b'N';
    ref_seq.insert(700, b'A');
    let params = SwParams::default();

    c.bench_function("banded_sw_1kbp", |b| {
        b.iter(|| {
            black_box(align::banded_sw(black_box(&query), black_box(&ref_seq), params));
        })
    });

    let mut buf = SwBuffer::new();
    c.bench_function("banded_sw_1kbp_reused_buffer", |b| {
        b.iter(|| {
            black_box(align::banded_sw_with_buf(black_box(&query), black_box(&ref_seq), params, &mut buf));
        })
    });
}

fn bench_find_best_alignment(c: &mut Criterion) {
    let genome = make_sequence(6_000, 7);
    let master = ContigPool::from_named(vec![("m0", genome[0..4_000].to_vec(), None)]);
    let slave = ContigPool::from_named(vec![("s0", genome[3_000..6_000].to_vec(), None)]);
    let builder = PctgBuilder::new(MergeConfig::default()).with_assemblies(&master, &slave);
    let pctg = builder.init_by_contig(0, 0).expect("master contig");
    let info = pctg.info(Assembly::Master, 0).cloned().expect("master info");
    let ctg = builder.load_slave_contig(0).expect("slave contig");
    let frame = Frame::new(0, 0, 1_000, Strand::Forward);

    c.bench_function("find_best_alignment_1kbp_overlap", |b| {
        b.iter(|| {
            black_box(builder.find_best_alignment(
                black_box(&pctg),
                &info,
                3_040,
                &ctg,
                frame,
                frame,
            ));
        })
    });
}

fn bench_merge_chain(c: &mut Criterion) {
    let genome = make_sequence(20_000, 99);
    let mut masters = Vec::new();
    let mut slaves = Vec::new();
    let mut blocks = Vec::new();
    // masters every 2 kbp, slaves bridging consecutive masters by 300 bp each side
    for i in 0..10u32 {
        let start = i as usize * 2_000;
        masters.push((format!("m{}", i), genome[start..start + 1_500].to_vec(), None));
        if i < 9 {
            slaves.push((format!("s{}", i), genome[start + 1_200..start + 2_300].to_vec(), None));
            blocks.push(Block::from_coords(i, (1_200, 1_500), i, (0, 300), Strand::Forward).expect("block"));
            blocks.push(Block::from_coords(i + 1, (0, 300), i, (800, 1_100), Strand::Forward).expect("block"));
        }
    }
    let master = ContigPool::from_named(masters);
    let slave = ContigPool::from_named(slaves);
    let builder = PctgBuilder::new(MergeConfig::default()).with_assemblies(&master, &slave);
    let ids = master.ids();

    c.bench_function("merge_chain_10_masters", |b| {
        b.iter(|| {
            black_box(merge_assemblies(&builder, black_box(&blocks), &ids).expect("merge"));
        })
    });
}

criterion_group!(benches, bench_banded_sw, bench_find_best_alignment, bench_merge_chain);
criterion_main!(benches);
