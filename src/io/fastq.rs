use anyhow::{anyhow, Result};
use std::io::BufRead;

use crate::pool::ContigPool;
use crate::util::dna;

#[derive(Debug, Clone)]
pub struct FastqRecord {
    pub id: String,
    pub desc: Option<String>,
    pub seq: Vec<u8>,
    /// phred 数值（已减去偏移）
    pub qual: Vec<u8>,
}

pub struct FastqReader<R: BufRead> {
    reader: R,
    buf: String,
    done: bool,
}

impl<R: BufRead> FastqReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: String::new(), done: false }
    }

    fn read_line(&mut self) -> Result<usize> {
        self.buf.clear();
        Ok(self.reader.read_line(&mut self.buf)?)
    }

    pub fn next_record(&mut self) -> Result<Option<FastqRecord>> {
        if self.done { return Ok(None); }

        // header，跳过空行
        loop {
            if self.read_line()? == 0 { self.done = true; return Ok(None); }
            if !self.buf.trim().is_empty() { break; }
        }
        let Some(header) = self.buf.strip_prefix('@') else {
            return Err(anyhow!("FASTQ header not starting with '@'"));
        };
        let header = header.trim_end().to_string();
        let mut parts = header.splitn(2, char::is_whitespace);
        let id = parts.next().unwrap_or("").to_string();
        let desc = parts.next().map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        if self.read_line()? == 0 { return Err(anyhow!("unexpected EOF after header of '{}'", id)); }
        let seq = dna::normalize_seq(self.buf.trim_end().as_bytes());

        if self.read_line()? == 0 || !self.buf.starts_with('+') {
            return Err(anyhow!("missing '+' line for '{}'", id));
        }

        if self.read_line()? == 0 { return Err(anyhow!("missing quality line for '{}'", id)); }
        let qual = dna::phred_from_ascii(self.buf.trim_end().as_bytes());

        if qual.len() != seq.len() {
            return Err(anyhow!("seq/qual length mismatch for '{}' ({} vs {})", id, seq.len(), qual.len()));
        }

        Ok(Some(FastqRecord { id, desc, seq, qual }))
    }
}

/// Reads every FASTQ record into a pool, keeping the per-base qualities.
pub fn read_pool<R: BufRead>(reader: R) -> Result<ContigPool> {
    let mut reader = FastqReader::new(reader);
    let mut pool = ContigPool::new();
    while let Some(rec) = reader.next_record()? {
        if pool.refs.id_of(&rec.id).is_some() {
            anyhow::bail!("duplicate contig name '{}'", rec.id);
        }
        pool.add(rec.id, &rec.seq, Some(&rec.qual));
    }
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_record_with_phred() {
        let data = b"@c1 some desc\nACgt\n+\n!!II\n\n@c2\nNN\n+c2\n55\n";
        let mut r = FastqReader::new(Cursor::new(&data[..]));
        let a = r.next_record().unwrap().unwrap();
        assert_eq!(a.id, "c1");
        assert_eq!(a.desc.as_deref(), Some("some desc"));
        assert_eq!(a.seq, b"ACGT");
        assert_eq!(a.qual, vec![0, 0, 40, 40]);
        let b = r.next_record().unwrap().unwrap();
        assert_eq!(b.qual, vec![20, 20]);
        assert!(r.next_record().unwrap().is_none());
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let data = b"@c1\nACGT\n+\nII\n";
        let mut r = FastqReader::new(Cursor::new(&data[..]));
        assert!(r.next_record().is_err());
    }

    #[test]
    fn pool_keeps_qualities() {
        let data = b"@x\nAC\n+\n+5\n";
        let pool = read_pool(Cursor::new(&data[..])).unwrap();
        assert_eq!(pool.lookup(0).map(|c| c.qual.clone()), Some(vec![10, 20]));
    }
}
