use std::collections::HashMap;
use std::f64::consts::TAU;
use std::fmt;

use crate::graph::CollatzGraph;

/// ノード座標 (x, y)
pub type Pos = (f64, f64);

/// レイアウト計算の失敗
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// 数値レイアウトに 0 以下のノードが渡された（log2 が定義できない）。
    /// ビルダーは 1 以上のノードしか生成しないので、外部から組まれた
    /// グラフでのみ起きる。
    NonPositiveNode(u64),
    /// 階層レイアウトの前提（無向として木）が破れている
    NotATree(&'static str),
    /// 明示指定された根がグラフに存在しない
    UnknownRoot(u64),
    /// 空グラフには根が取れない
    EmptyGraph,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::NonPositiveNode(n) => {
                write!(f, "numeric layout requires nodes >= 1, found {}", n)
            }
            LayoutError::NotATree(reason) => {
                write!(f, "hierarchy layout requires a tree: {}", reason)
            }
            LayoutError::UnknownRoot(n) => write!(f, "root {} is not a node", n),
            LayoutError::EmptyGraph => write!(f, "cannot lay out an empty graph"),
        }
    }
}

impl std::error::Error for LayoutError {}

/// n の 2冪バケット内オフセットを角度に写す: θ = ((n − 2^⌊log2 n⌋) / 2^⌊log2 n⌋)·2π
///
/// θ ∈ [0, 2π)。n ≥ 1 前提（呼び出し側で検査済み）。
#[inline]
fn bucket_theta(n: u64) -> f64 {
    let bucket = 1u64 << n.ilog2();
    (n - bucket) as f64 / bucket as f64 * TAU
}

fn check_positive(g: &CollatzGraph) -> Result<(), LayoutError> {
    match g.nodes().find(|&n| n == 0) {
        Some(n) => Err(LayoutError::NonPositiveNode(n)),
        None => Ok(()),
    }
}

/// 対数半径レイアウト: r = ⌊log2 n⌋。
///
/// 2冪バケットごとに整数半径の同心円へ並ぶ。
pub fn log_radius_layout(g: &CollatzGraph) -> Result<HashMap<u64, Pos>, LayoutError> {
    check_positive(g)?;
    let mut pos = HashMap::with_capacity(g.node_count());
    for n in g.nodes() {
        let r = n.ilog2() as f64;
        let theta = bucket_theta(n);
        pos.insert(n, (r * theta.cos(), r * theta.sin()));
    }
    Ok(pos)
}

/// 倍加半径レイアウト: r = 2^⌊log2 n⌋。
///
/// バケットごとに半径が 2 倍になり、外側のリングが幾何級数的に開く。
pub fn doubling_radius_layout(g: &CollatzGraph) -> Result<HashMap<u64, Pos>, LayoutError> {
    check_positive(g)?;
    let mut pos = HashMap::with_capacity(g.node_count());
    for n in g.nodes() {
        let r = (1u64 << n.ilog2()) as f64;
        let theta = bucket_theta(n);
        pos.insert(n, (r * theta.cos(), r * theta.sin()));
    }
    Ok(pos)
}

/// 螺旋レイアウト: r = n（離散リングではなく真の螺旋になる）。
pub fn spiral_layout(g: &CollatzGraph) -> Result<HashMap<u64, Pos>, LayoutError> {
    check_positive(g)?;
    let mut pos = HashMap::with_capacity(g.node_count());
    for n in g.nodes() {
        let r = n as f64;
        let theta = bucket_theta(n);
        pos.insert(n, (r * theta.cos(), r * theta.sin()));
    }
    Ok(pos)
}

/// 数直線レイアウト: ノード n を (n, 0) に置く。
pub fn number_line_layout(g: &CollatzGraph) -> Result<HashMap<u64, Pos>, LayoutError> {
    check_positive(g)?;
    Ok(g.nodes().map(|n| (n, (n as f64, 0.0))).collect())
}
