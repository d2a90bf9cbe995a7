pub mod blocks;
pub mod fasta;
pub mod fastq;
