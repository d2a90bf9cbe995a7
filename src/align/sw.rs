use std::fmt::Write as _;

use crate::util::dna;

const NEG_INF: i32 = i32::MIN / 4;

// 回溯矩阵的位编码
const TB_STOP: u8 = 0;
const TB_DIAG: u8 = 1;
const TB_UP: u8 = 2;
const TB_LEFT: u8 = 3;
const TB_SRC_MASK: u8 = 0b11;
const TB_E_EXT: u8 = 0b100;
const TB_F_EXT: u8 = 0b1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwParams {
    pub match_score: i32,
    pub mismatch_penalty: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
    pub band_width: usize,
}

impl Default for SwParams {
    fn default() -> Self {
        Self {
            match_score: 2,
            mismatch_penalty: 3,
            gap_open: 5,
            gap_extend: 2,
            band_width: 32,
        }
    }
}

/// 比对操作：M 为对齐列（匹配或错配），I 为仅 query 有碱基，D 为仅 reference 有碱基
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AlnOp {
    M,
    I,
    D,
}

impl AlnOp {
    pub fn as_char(self) -> char {
        match self {
            AlnOp::M => 'M',
            AlnOp::I => 'I',
            AlnOp::D => 'D',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SwResult {
    pub score: i32,
    pub query_start: usize,
    pub query_end: usize,
    pub ref_start: usize,
    pub ref_end: usize,
    /// 游程编码的比对操作
    pub cigar: Vec<(AlnOp, usize)>,
    pub matches: usize,
    pub mismatches: usize,
    pub indels: usize,
}

impl SwResult {
    /// 比对列数（匹配 + 错配 + indel）
    pub fn columns(&self) -> usize {
        self.matches + self.mismatches + self.indels
    }

    /// 同源度：匹配列占比，取值 [0, 1]
    pub fn homology(&self) -> f64 {
        let cols = self.columns();
        if cols == 0 {
            0.0
        } else {
            self.matches as f64 / cols as f64
        }
    }

    pub fn nm(&self) -> usize {
        self.mismatches + self.indels
    }

    pub fn cigar_string(&self) -> String {
        let mut s = String::new();
        for &(op, len) in &self.cigar {
            let _ = write!(&mut s, "{}{}", len, op.as_char());
        }
        s
    }

    /// 逐列展开：(reference 位置, query 位置, 操作)，位置相对输入窗口
    pub fn columns_iter(&self) -> impl Iterator<Item = (usize, usize, AlnOp)> + '_ {
        let mut r = self.ref_start;
        let mut q = self.query_start;
        self.cigar
            .iter()
            .flat_map(|&(op, len)| std::iter::repeat(op).take(len))
            .map(move |op| {
                let col = (r, q, op);
                match op {
                    AlnOp::M => {
                        r += 1;
                        q += 1;
                    }
                    AlnOp::I => q += 1,
                    AlnOp::D => r += 1,
                }
                col
            })
    }
}

/// 带状仿射间隙 Smith-Waterman 局部对齐
pub fn banded_sw(query: &[u8], reference: &[u8], p: SwParams) -> SwResult {
    banded_sw_with_buf(query, reference, p, &mut SwBuffer::new())
}

/// DP 工作缓冲区，可跨调用复用。
/// 只保存带内的单元：滚动的 H/E 行 + 每行 `2 * band + 1` 字节的回溯。
#[derive(Default)]
pub struct SwBuffer {
    h_prev: Vec<i32>,
    e_prev: Vec<i32>,
    h_cur: Vec<i32>,
    e_cur: Vec<i32>,
    tb: Vec<u8>,
}

impl SwBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset_row(h: &mut Vec<i32>, e: &mut Vec<i32>, width: usize) {
        h.clear();
        h.resize(width, 0);
        e.clear();
        e.resize(width, NEG_INF);
    }
}

#[inline]
fn subst(a: u8, b: u8, p: &SwParams) -> i32 {
    if a == b && dna::is_called(a) {
        p.match_score
    } else {
        -p.mismatch_penalty
    }
}

pub fn banded_sw_with_buf(query: &[u8], reference: &[u8], p: SwParams, buf: &mut SwBuffer) -> SwResult {
    let m = query.len();
    let n = reference.len();
    if m == 0 || n == 0 {
        return SwResult::default();
    }

    let band = p.band_width.max(1);
    let width = 2 * band + 1;

    SwBuffer::reset_row(&mut buf.h_prev, &mut buf.e_prev, width);
    buf.tb.clear();
    buf.tb.resize((m + 1) * width, TB_STOP);

    let open = p.gap_open + p.gap_extend;
    let mut best_score = 0i32;
    let mut best_i = 0usize;
    let mut best_j = 0usize;

    for i in 1..=m {
        SwBuffer::reset_row(&mut buf.h_cur, &mut buf.e_cur, width);

        // 第 i 行的带内列：j = i - band + k
        let j_lo = i.saturating_sub(band).max(1);
        let j_hi = (i + band).min(n);
        if j_lo > j_hi {
            std::mem::swap(&mut buf.h_prev, &mut buf.h_cur);
            std::mem::swap(&mut buf.e_prev, &mut buf.e_cur);
            continue;
        }

        let row_tb = &mut buf.tb[i * width..(i + 1) * width];
        let mut f = NEG_INF;
        for j in j_lo..=j_hi {
            let k = j + band - i;
            let mut flags = 0u8;

            // E：来自上方 (i-1, j)，消耗 query
            let (h_up, e_up) = if k + 1 < width { (buf.h_prev[k + 1], buf.e_prev[k + 1]) } else { (0, NEG_INF) };
            let e_open = h_up - open;
            let e_ext = e_up - p.gap_extend;
            let e = if e_ext > e_open {
                flags |= TB_E_EXT;
                e_ext
            } else {
                e_open
            };

            // F：来自左侧 (i, j-1)，消耗 reference
            let h_left = if k > 0 && j > j_lo { buf.h_cur[k - 1] } else { 0 };
            let f_open = h_left - open;
            let f_ext = f - p.gap_extend;
            f = if f_ext > f_open {
                flags |= TB_F_EXT;
                f_ext
            } else {
                f_open
            };

            let diag = buf.h_prev[k] + subst(query[i - 1], reference[j - 1], &p);

            let mut val = 0;
            let mut src = TB_STOP;
            if diag > val {
                val = diag;
                src = TB_DIAG;
            }
            if e > val {
                val = e;
                src = TB_UP;
            }
            if f > val {
                val = f;
                src = TB_LEFT;
            }

            buf.h_cur[k] = val;
            buf.e_cur[k] = e;
            row_tb[k] = src | flags;

            if val > best_score {
                best_score = val;
                best_i = i;
                best_j = j;
            }
        }

        std::mem::swap(&mut buf.h_prev, &mut buf.h_cur);
        std::mem::swap(&mut buf.e_prev, &mut buf.e_cur);
    }

    if best_score <= 0 {
        return SwResult::default();
    }

    // 从最优单元回溯
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        H,
        E,
        F,
    }

    let mut ops: Vec<AlnOp> = Vec::new();
    let mut i = best_i;
    let mut j = best_j;
    let mut state = State::H;

    while i > 0 && j > 0 {
        let k = match (j + band).checked_sub(i) {
            Some(k) if k < width => k,
            _ => break,
        };
        let cell = buf.tb[i * width + k];
        match state {
            State::H => match cell & TB_SRC_MASK {
                TB_DIAG => {
                    ops.push(AlnOp::M);
                    i -= 1;
                    j -= 1;
                }
                TB_UP => state = State::E,
                TB_LEFT => state = State::F,
                _ => break,
            },
            State::E => {
                ops.push(AlnOp::I);
                if cell & TB_E_EXT == 0 {
                    state = State::H;
                }
                i -= 1;
            }
            State::F => {
                ops.push(AlnOp::D);
                if cell & TB_F_EXT == 0 {
                    state = State::H;
                }
                j -= 1;
            }
        }
    }

    ops.reverse();
    let query_start = i;
    let ref_start = j;

    let mut result = SwResult {
        score: best_score,
        query_start,
        query_end: best_i,
        ref_start,
        ref_end: best_j,
        cigar: run_length(&ops),
        ..SwResult::default()
    };

    let mut qi = query_start;
    let mut rj = ref_start;
    for &op in &ops {
        match op {
            AlnOp::M => {
                if query[qi] == reference[rj] && dna::is_called(query[qi]) {
                    result.matches += 1;
                } else {
                    result.mismatches += 1;
                }
                qi += 1;
                rj += 1;
            }
            AlnOp::I => {
                result.indels += 1;
                qi += 1;
            }
            AlnOp::D => {
                result.indels += 1;
                rj += 1;
            }
        }
    }

    result
}

pub fn run_length(ops: &[AlnOp]) -> Vec<(AlnOp, usize)> {
    let mut out: Vec<(AlnOp, usize)> = Vec::new();
    for &op in ops {
        match out.last_mut() {
            Some((last, len)) if *last == op => *len += 1,
            _ => out.push((op, 1)),
        }
    }
    out
}
