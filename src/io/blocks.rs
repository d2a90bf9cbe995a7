use anyhow::{anyhow, bail, Context, Result};
use std::io::BufRead;

use crate::assembly::{Block, Strand};
use crate::pool::RefVector;

/// Block 表读取器。
///
/// 每行 7 列（制表符或空白分隔）：
/// `master_name master_start master_end slave_name slave_start slave_end strand`，
/// 坐标 0-based 左闭右开，strand 为 `+` 或 `-`；`#` 开头的行与空行被忽略。
pub struct BlockReader<'r, R: BufRead> {
    reader: R,
    master_refs: &'r RefVector,
    slave_refs: &'r RefVector,
    buf: String,
    line_no: usize,
}

impl<'r, R: BufRead> BlockReader<'r, R> {
    pub fn new(reader: R, master_refs: &'r RefVector, slave_refs: &'r RefVector) -> Self {
        Self { reader, master_refs, slave_refs, buf: String::new(), line_no: 0 }
    }

    pub fn next_block(&mut self) -> Result<Option<Block>> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let line = self.buf.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line_no = self.line_no;
            return self
                .parse_line(line)
                .with_context(|| format!("block file line {}", line_no))
                .map(Some);
        }
    }

    fn parse_line(&self, line: &str) -> Result<Block> {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() != 7 {
            bail!("expected 7 columns, found {}", cols.len());
        }
        let master = self
            .master_refs
            .id_of(cols[0])
            .ok_or_else(|| anyhow!("unknown master contig '{}'", cols[0]))?;
        let slave = self
            .slave_refs
            .id_of(cols[3])
            .ok_or_else(|| anyhow!("unknown slave contig '{}'", cols[3]))?;
        let strand = match cols[6] {
            "+" => Strand::Forward,
            "-" => Strand::Reverse,
            other => bail!("invalid strand '{}'", other),
        };
        let coord = |s: &str| s.parse::<usize>().with_context(|| format!("invalid coordinate '{}'", s));
        let m = (coord(cols[1])?, coord(cols[2])?);
        let s = (coord(cols[4])?, coord(cols[5])?);

        for (name, (start, end), refs, id) in [
            (cols[0], m, self.master_refs, master),
            (cols[3], s, self.slave_refs, slave),
        ] {
            let len = refs.get(id).map_or(0, |r| r.len);
            if start > end || end > len {
                bail!("range {}..{} out of bounds for '{}' (length {})", start, end, name, len);
            }
        }

        Ok(Block::from_coords(master, m, slave, s, strand)?)
    }

    pub fn read_all(mut self) -> Result<Vec<Block>> {
        let mut blocks = Vec::new();
        while let Some(b) = self.next_block()? {
            blocks.push(b);
        }
        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn refs() -> (RefVector, RefVector) {
        let mut m = RefVector::new();
        m.push("m0", 500);
        m.push("m1", 300);
        let mut s = RefVector::new();
        s.push("s0", 520);
        (m, s)
    }

    #[test]
    fn reads_blocks_and_skips_comments() {
        let (m, s) = refs();
        let data = b"# header\n\nm0\t100\t400\ts0\t90\t390\t+\nm1 0 50 s0 0 50 -\n";
        let blocks = BlockReader::new(Cursor::new(&data[..]), &m, &s).read_all().unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].master_id(), 0);
        assert_eq!((blocks[0].slave.start, blocks[0].slave.end), (90, 390));
        assert_eq!(blocks[1].master_id(), 1);
        assert_eq!(blocks[1].strand(), Strand::Reverse);
    }

    #[test]
    fn unknown_names_and_bad_ranges_fail() {
        let (m, s) = refs();
        for line in [
            "mX 0 10 s0 0 10 +\n",
            "m0 0 10 s9 0 10 +\n",
            "m0 0 10 s0 0 10 x\n",
            "m0 0 600 s0 0 10 +\n",
            "m0 10 10 s0 0 10 +\n",
            "m0 0 10 s0 0\n",
        ] {
            let r = BlockReader::new(Cursor::new(line.as_bytes()), &m, &s).read_all();
            assert!(r.is_err(), "accepted: {}", line.trim());
        }
    }

    #[test]
    fn errors_carry_line_numbers() {
        let (m, s) = refs();
        let data = b"m0 0 10 s0 0 10 +\nbroken\n";
        let err = BlockReader::new(Cursor::new(&data[..]), &m, &s).read_all().unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }
}
