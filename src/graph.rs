use std::collections::HashSet;
use std::fmt;

use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;

use crate::step::collatz_step_checked;

/// 1ウォークあたりの既定ステップ上限。
///
/// コラッツ予想を信頼すれば全軌道は 1 に到達するが、アルゴリズムは
/// それを証明しない。上限なしでは非収束入力でハングするため、
/// 上限超過は [`BuildError::StepLimit`] として呼び出し側に返す。
pub const DEFAULT_MAX_STEPS: u64 = 100_000;

/// グラフ構築の失敗
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// 開始値 start の軌道が max_steps 以内に 1 へ到達しなかった
    StepLimit { start: u64, max_steps: u64 },
    /// 軌道の途中値 3n+1 が u64 を超えた（開始値 start）
    Overflow { start: u64 },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::StepLimit { start, max_steps } => write!(
                f,
                "trajectory of {} did not reach 1 within {} steps",
                start, max_steps
            ),
            BuildError::Overflow { start } => {
                write!(f, "trajectory of {} overflowed u64", start)
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// ハイルストーン軌道の合併からなる有向グラフ。
///
/// ノードは軌道上に現れた正整数そのもの。辺 (h, h') は1コラッツステップ。
/// 構築後は不変で、1 以外の全ノードは出次数ちょうど 1、1 が唯一の終端。
#[derive(Debug, Clone)]
pub struct CollatzGraph {
    pub graph: DiGraphMap<u64, ()>,
    /// 構築時に走査した開始値の上限 N（1..=N）
    pub range_max: u64,
}

impl CollatzGraph {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, n: u64) -> bool {
        self.graph.contains_node(n)
    }

    /// 全ノードの列挙（挿入順）
    pub fn nodes(&self) -> impl Iterator<Item = u64> + '_ {
        self.graph.nodes()
    }

    /// 全辺 (from, to) の列挙。表示側のフィルタ（偶数-偶数辺の除去など）は
    /// この列挙に対して行い、グラフを再構築しない。
    pub fn edges(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.graph.all_edges().map(|(a, b, _)| (a, b))
    }

    /// n の唯一の後続ノード。n=1 または未登録ノードは None。
    pub fn successor(&self, n: u64) -> Option<u64> {
        self.graph.neighbors_directed(n, Direction::Outgoing).next()
    }

    /// n から 1 までの辺数（停止時間）。n が未登録なら None。
    ///
    /// stopping_time(1) = 0。グラフの出次数 1 不変量により経路は一意。
    pub fn stopping_time(&self, n: u64) -> Option<u64> {
        if !self.contains(n) {
            return None;
        }
        let mut current = n;
        let mut steps = 0u64;
        // 不変量が破れた外部グラフでの無限ループ防止にノード数で打ち切る
        let bound = self.node_count() as u64;
        while current != 1 {
            current = self.successor(current)?;
            steps += 1;
            if steps > bound {
                return None;
            }
        }
        Some(steps)
    }

    /// 全辺を反転したコピー。1 を根とする木表示（階層レイアウト）用。
    pub fn reversed(&self) -> CollatzGraph {
        let mut graph = DiGraphMap::new();
        for n in self.graph.nodes() {
            graph.add_node(n);
        }
        for (a, b, _) in self.graph.all_edges() {
            graph.add_edge(b, a, ());
        }
        CollatzGraph {
            graph,
            range_max: self.range_max,
        }
    }
}

/// 開始値 1..=range_max の全軌道を合併したグラフを構築する。
///
/// 既訪問の開始値はスキップする（その軌道は以前のウォークの接尾辞として
/// 記録済み）。range_max = 0 は空グラフ（エラーではない）。
/// range_max = 1 も空グラフ: ウォークは 1 で即停止し、辺を持たない
/// ノードは登録されない。
///
/// 訪問済み判定はグラフのノード存在照会とは別の明示的な集合で行う。
/// 両者は常に一致する（辺が載った値だけが訪問済みになる）が、
/// 走査の簿記とグラフ照会の意味を分けて個別に検証できるようにしてある。
pub fn build_graph(range_max: u64, max_steps: u64) -> Result<CollatzGraph, BuildError> {
    let mut graph: DiGraphMap<u64, ()> = DiGraphMap::new();
    let mut visited: HashSet<u64> = HashSet::new();

    for start in 1..=range_max {
        if visited.contains(&start) {
            continue;
        }
        let mut hailstone = start;
        let mut steps = 0u64;
        while hailstone != 1 {
            if steps >= max_steps {
                return Err(BuildError::StepLimit { start, max_steps });
            }
            let next = collatz_step_checked(hailstone)
                .ok_or(BuildError::Overflow { start })?;
            graph.add_edge(hailstone, next, ());
            visited.insert(hailstone);
            visited.insert(next);
            hailstone = next;
            steps += 1;
        }
    }

    Ok(CollatzGraph { graph, range_max })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_ranges() {
        let g0 = build_graph(0, DEFAULT_MAX_STEPS).unwrap();
        assert_eq!(g0.node_count(), 0);
        assert_eq!(g0.edge_count(), 0);
        // 1 からのウォークは即停止するのでノード 1 は登録されない
        let g1 = build_graph(1, DEFAULT_MAX_STEPS).unwrap();
        assert_eq!(g1.node_count(), 0);
    }

    #[test]
    fn test_step_limit() {
        let err = build_graph(27, 10).unwrap_err();
        assert!(matches!(err, BuildError::StepLimit { .. }));
    }

    #[test]
    fn test_visited_matches_graph_membership() {
        // 簿記集合とグラフ照会が同じ判定を返すことの検証
        let g = build_graph(20, DEFAULT_MAX_STEPS).unwrap();
        for n in g.nodes() {
            assert!(g.contains(n));
        }
    }
}
