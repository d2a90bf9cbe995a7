use std::collections::HashMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::assembly::{Contig, IdType};
use crate::pctg::{Assembly, PctgError};

/// 参考名表中的一项（对应 BAM header 的 @SQ）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefData {
    pub name: String,
    pub len: usize,
}

/// contig ID -> 名称 的查找表，ID 即下标
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefVector {
    refs: Vec<RefData>,
}

impl RefVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, len: usize) -> IdType {
        let id = self.refs.len() as IdType;
        self.refs.push(RefData { name: name.into(), len });
        id
    }

    pub fn get(&self, id: IdType) -> Option<&RefData> {
        self.refs.get(id as usize)
    }

    pub fn name(&self, id: IdType) -> Option<&str> {
        self.get(id).map(|r| r.name.as_str())
    }

    /// Linear lookup; only used when resolving names from input files.
    pub fn id_of(&self, name: &str) -> Option<IdType> {
        self.refs.iter().position(|r| r.name == name).map(|i| i as IdType)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IdType, &RefData)> {
        self.refs.iter().enumerate().map(|(i, r)| (i as IdType, r))
    }
}

/// 构建信息，随 pool 一同保存
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolMeta {
    pub source_file: Option<String>,
    pub build_args: Option<String>,
    pub build_timestamp: Option<String>,
}

/// 内存中的 contig 池（按 ID 查找）
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ContigPool {
    contigs: HashMap<IdType, Contig>,
    pub refs: RefVector,
    pub meta: PoolMeta,
}

impl ContigPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a pool from named contigs, assigning IDs in input order.
    pub fn from_named<I, S>(contigs: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<u8>, Option<Vec<u8>>)>,
        S: Into<String>,
    {
        let mut pool = Self::new();
        for (name, seq, qual) in contigs {
            pool.add(name, &seq, qual.as_deref());
        }
        pool
    }

    /// 追加一条 contig，返回分配的 ID
    pub fn add(&mut self, name: impl Into<String>, seq: &[u8], qual: Option<&[u8]>) -> IdType {
        let id = self.refs.push(name, seq.len());
        let ctg = match qual {
            Some(q) => Contig::with_qual(id, seq, q),
            None => Contig::new(id, seq),
        };
        self.contigs.insert(id, ctg);
        id
    }

    pub fn lookup(&self, id: IdType) -> Option<&Contig> {
        self.contigs.get(&id)
    }

    /// Lookup that reports which assembly was missing the contig.
    pub fn fetch(&self, assembly: Assembly, id: IdType) -> Result<&Contig, PctgError> {
        self.lookup(id).ok_or(PctgError::NotFound { assembly, id })
    }

    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }

    /// IDs in ascending order.
    pub fn ids(&self) -> Vec<IdType> {
        let mut ids: Vec<IdType> = self.contigs.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn total_len(&self) -> usize {
        self.contigs.values().map(Contig::len).sum()
    }

    pub fn set_meta(&mut self, meta: PoolMeta) {
        self.meta = meta;
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let f = std::fs::File::create(path)?;
        let mut w = std::io::BufWriter::new(f);
        bincode::serialize_into(&mut w, self)?;
        Ok(())
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        let f = std::fs::File::open(path)?;
        let pool: Self = bincode::deserialize_from(std::io::BufReader::new(f))?;
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_input_order() {
        let pool = ContigPool::from_named(vec![
            ("ctgA", b"ACGT".to_vec(), None),
            ("ctgB", b"GGCC".to_vec(), Some(vec![40, 40, 40, 40])),
        ]);
        assert_eq!(pool.ids(), vec![0, 1]);
        assert_eq!(pool.refs.name(1), Some("ctgB"));
        assert_eq!(pool.refs.id_of("ctgA"), Some(0));
        assert_eq!(pool.lookup(1).map(|c| c.qual[0]), Some(40));
        assert_eq!(pool.total_len(), 8);
    }

    #[test]
    fn fetch_reports_missing_assembly() {
        let pool = ContigPool::new();
        assert_eq!(
            pool.fetch(Assembly::Slave, 9).unwrap_err(),
            PctgError::NotFound { assembly: Assembly::Slave, id: 9 }
        );
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut pool = ContigPool::from_named(vec![("c", b"ACGTAC".to_vec(), None)]);
        pool.set_meta(PoolMeta { source_file: Some("x.fa".into()), ..PoolMeta::default() });
        let path = std::env::temp_dir().join(format!("gam_rust_pool_{}.pool", std::process::id()));
        let path = path.to_string_lossy().to_string();
        pool.save_to_file(&path).unwrap();
        let loaded = ContigPool::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.lookup(0), pool.lookup(0));
        assert_eq!(loaded.meta.source_file.as_deref(), Some("x.fa"));
    }
}
