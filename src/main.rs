use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gam_rust::io::blocks::BlockReader;
use gam_rust::io::fasta::{self, FastaWriter};
use gam_rust::io::fastq;
use gam_rust::merge::merge_assemblies;
use gam_rust::pctg::{MergeConfig, PctgBuilder};
use gam_rust::pool::{ContigPool, PoolMeta};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "gam-rust", author, version, about = "Merge two genome assemblies into paired contigs", arg_required_else_help = true)]
struct Cli {
    /// Print merge decisions
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a contig pool from a FASTA or FASTQ assembly
    Pool {
        /// Assembly file (.fa/.fasta/.fna or .fq/.fastq)
        assembly: String,
        /// Output prefix for the pool file
        #[arg(short, long, default_value = "assembly")]
        output: String,
    },
    /// Merge a master and a slave assembly along a block table
    Merge {
        /// Master contig pool (.pool)
        #[arg(short = 'm', long = "master")]
        master: String,
        /// Slave contig pool (.pool)
        #[arg(short = 's', long = "slave")]
        slave: String,
        /// Block table (TSV)
        #[arg(short = 'b', long = "blocks")]
        blocks: String,
        /// Output FASTA path (stdout if omitted)
        #[arg(short, long)]
        out: Option<String>,
        #[arg(long = "min-alignment", default_value_t = gam_rust::pctg::config::DEFAULT_MIN_ALIGNMENT)]
        min_alignment: usize,
        /// Minimum homology, in percent
        #[arg(long = "min-homology", default_value_t = 85.0)]
        min_homology: f64,
        #[arg(long = "min-alignment-quotient", default_value_t = gam_rust::pctg::config::DEFAULT_MIN_ALIGNMENT_QUOTIENT)]
        min_alignment_quotient: f64,
        #[arg(long = "max-gaps", default_value_t = gam_rust::pctg::config::DEFAULT_MAX_GAPS)]
        max_gaps: usize,
        #[arg(long = "max-searched-alignment", default_value_t = gam_rust::pctg::config::DEFAULT_MAX_SEARCHED_ALIGNMENT)]
        max_searched_alignment: usize,
        #[arg(long = "band-width", default_value_t = gam_rust::pctg::config::DEFAULT_BAND_WIDTH)]
        band_width: usize,
        #[arg(long = "disattended-quality", default_value_t = gam_rust::pctg::config::DEFAULT_DISATTENDED_QUALITY)]
        disattended_quality: u8,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("gam_rust=debug,info")
    } else {
        EnvFilter::new("gam_rust=warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Pool { assembly, output } => run_pool(&assembly, &output),
        Commands::Merge {
            master,
            slave,
            blocks,
            out,
            min_alignment,
            min_homology,
            min_alignment_quotient,
            max_gaps,
            max_searched_alignment,
            band_width,
            disattended_quality,
            threads,
        } => {
            let config = MergeConfig {
                min_alignment,
                min_homology: min_homology / 100.0,
                min_alignment_quotient,
                max_gaps,
                max_searched_alignment,
                band_width,
                disattended_quality,
            };
            run_merge(&master, &slave, &blocks, out.as_deref(), config, threads)
        }
    }
}

fn is_fastq(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".fq") || lower.ends_with(".fastq")
}

fn run_pool(assembly: &str, output: &str) -> Result<()> {
    let fh = std::fs::File::open(assembly)
        .map_err(|e| anyhow!("cannot open assembly '{}': {}", assembly, e))?;
    let buf = std::io::BufReader::new(fh);
    let mut pool = if is_fastq(assembly) {
        fastq::read_pool(buf)
    } else {
        fasta::read_pool(buf)
    }
    .with_context(|| format!("cannot parse assembly '{}'", assembly))?;

    if pool.is_empty() {
        anyhow::bail!("assembly '{}' contains no sequences", assembly);
    }

    println!("assembly: {}", assembly);
    println!("contigs: {}", pool.len());
    println!("total_len: {}", pool.total_len());

    pool.set_meta(PoolMeta {
        source_file: Some(assembly.to_string()),
        build_args: Some(std::env::args().collect::<Vec<_>>().join(" ")),
        build_timestamp: Some(chrono::Utc::now().to_rfc3339()),
    });

    let out_path = format!("{}.pool", output);
    pool.save_to_file(&out_path)
        .map_err(|e| anyhow!("cannot write pool to '{}': {}", out_path, e))?;
    println!("contig pool saved: {}", out_path);
    Ok(())
}

fn run_merge(
    master_path: &str,
    slave_path: &str,
    blocks_path: &str,
    out_path: Option<&str>,
    config: MergeConfig,
    threads: usize,
) -> Result<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build_global()?;

    let master = ContigPool::load_from_file(master_path)
        .with_context(|| format!("cannot load master pool '{}'", master_path))?;
    let slave = ContigPool::load_from_file(slave_path)
        .with_context(|| format!("cannot load slave pool '{}'", slave_path))?;

    let fh = std::fs::File::open(blocks_path)
        .map_err(|e| anyhow!("cannot open block table '{}': {}", blocks_path, e))?;
    let blocks = BlockReader::new(std::io::BufReader::new(fh), &master.refs, &slave.refs)
        .read_all()
        .with_context(|| format!("cannot read block table '{}'", blocks_path))?;

    let builder = PctgBuilder::new(config).with_assemblies(&master, &slave);
    let (pctgs, stats) = merge_assemblies(&builder, &blocks, &master.ids())?;

    let out: Box<dyn std::io::Write> = if let Some(p) = out_path {
        Box::new(std::io::BufWriter::new(
            std::fs::File::create(p).map_err(|e| anyhow!("cannot create output '{}': {}", p, e))?,
        ))
    } else {
        Box::new(std::io::BufWriter::new(std::io::stdout()))
    };
    let mut writer = FastaWriter::new(out);
    writer.write_all(&pctgs, &master.refs, &slave.refs)?;

    eprintln!(
        "paired contigs: {} (seeds {}, merges {}, rejections {}, singletons {}, unmerged {})",
        pctgs.len(),
        stats.seeds,
        stats.merges,
        stats.rejections,
        stats.singletons,
        stats.unmerged
    );
    Ok(())
}
