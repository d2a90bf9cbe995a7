use anyhow::{Context, Result};
use std::io::{BufRead, Write};

use crate::pctg::PairedContig;
use crate::pool::{ContigPool, RefVector};
use crate::util::dna;

/// 输出时每行的碱基数
pub const LINE_WIDTH: usize = 60;

#[derive(Debug, Clone)]
pub struct FastaRecord {
    pub id: String,
    pub desc: Option<String>,
    pub seq: Vec<u8>,
}

pub struct FastaReader<R: BufRead> {
    reader: R,
    buf: String,
    done: bool,
    peek_header: Option<String>,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            done: false,
            peek_header: None,
        }
    }

    pub fn next_record(&mut self) -> Result<Option<FastaRecord>> {
        if self.done {
            return Ok(None);
        }

        let header = if let Some(h) = self.peek_header.take() {
            h
        } else {
            loop {
                self.buf.clear();
                let n = self.reader.read_line(&mut self.buf)?;
                if n == 0 {
                    self.done = true;
                    return Ok(None);
                }
                if let Some(rest) = self.buf.strip_prefix('>') {
                    break rest.trim().to_string();
                }
            }
        };

        let mut parts = header.splitn(2, char::is_whitespace);
        let id = parts.next().unwrap_or("").to_string();
        let desc = parts
            .next()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        // 序列行，直到下一个 header
        let mut seq: Vec<u8> = Vec::new();
        loop {
            self.buf.clear();
            let n = self.reader.read_line(&mut self.buf)?;
            if n == 0 {
                self.done = true;
                break;
            }
            if let Some(rest) = self.buf.strip_prefix('>') {
                self.peek_header = Some(rest.trim().to_string());
                break;
            }
            seq.extend(
                self.buf
                    .bytes()
                    .filter(|b| !b.is_ascii_whitespace())
                    .map(dna::normalize_base),
            );
        }

        Ok(Some(FastaRecord { id, desc, seq }))
    }
}

/// Reads every FASTA record into a pool; IDs follow file order and every base
/// gets the default quality.
pub fn read_pool<R: BufRead>(reader: R) -> Result<ContigPool> {
    let mut reader = FastaReader::new(reader);
    let mut pool = ContigPool::new();
    while let Some(rec) = reader.next_record()? {
        if pool.refs.id_of(&rec.id).is_some() {
            anyhow::bail!("duplicate contig name '{}'", rec.id);
        }
        pool.add(rec.id, &rec.seq, None);
    }
    Ok(pool)
}

/// Writes finished paired contigs as FASTA.
///
/// Header: `>pctg_<id> master=<names> slave=<names>`, names in ID order;
/// sequence wrapped at [`LINE_WIDTH`].
pub struct FastaWriter<W: Write> {
    out: W,
}

impl<W: Write> FastaWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_pctg(&mut self, pctg: &PairedContig, master_refs: &RefVector, slave_refs: &RefVector) -> Result<()> {
        let names = |refs: &RefVector, ids: Vec<u32>| -> String {
            let v: Vec<String> = ids
                .into_iter()
                .map(|id| refs.name(id).map_or_else(|| id.to_string(), str::to_string))
                .collect();
            if v.is_empty() {
                "-".to_string()
            } else {
                v.join(",")
            }
        };
        let masters = names(master_refs, pctg.master_infos().map(|i| i.id).collect());
        let slaves = names(slave_refs, pctg.slave_infos().map(|i| i.id).collect());
        writeln!(self.out, ">pctg_{} master={} slave={}", pctg.id(), masters, slaves)?;
        for line in pctg.seq().chunks(LINE_WIDTH) {
            self.out.write_all(line)?;
            self.out.write_all(b"\n")?;
        }
        Ok(())
    }

    pub fn write_all<'p, I>(&mut self, pctgs: I, master_refs: &RefVector, slave_refs: &RefVector) -> Result<usize>
    where
        I: IntoIterator<Item = &'p PairedContig>,
    {
        let mut n = 0;
        for p in pctgs {
            self.write_pctg(p, master_refs, slave_refs)
                .with_context(|| format!("cannot write paired contig {}", p.id()))?;
            n += 1;
        }
        self.out.flush()?;
        Ok(n)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
