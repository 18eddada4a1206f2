use std::collections::{HashMap, HashSet};

use petgraph::Direction;

use crate::graph::CollatzGraph;
use crate::layout::{LayoutError, Pos};

/// 階層レイアウトのパラメータ
#[derive(Debug, Clone, Copy)]
pub struct HierarchyOptions {
    /// この枝に割り当てる水平スパン
    pub width: f64,
    /// 階層1段ごとの垂直ギャップ
    pub vert_gap: f64,
    /// 根の垂直位置
    pub vert_loc: f64,
    /// 根の水平位置
    pub x_center: f64,
}

impl Default for HierarchyOptions {
    fn default() -> Self {
        HierarchyOptions {
            width: 1.0,
            vert_gap: 0.2,
            vert_loc: 0.0,
            x_center: 0.5,
        }
    }
}

/// 木の階層レイアウト。深さが垂直位置に写り、兄弟部分木の水平スパンは
/// 重ならない。
///
/// 前提: g は辺の向きを無視して木であること（連結・|E| = |V|−1）。
/// 破れていれば [`LayoutError::NotATree`] を返し、部分結果は返さない。
///
/// root が None のときは「入次数 0 のノードのうち最小値」を根に取る
/// （決定的なフォールバック）。コラッツグラフを木として描くときは
/// [`CollatzGraph::reversed`] に root = 1 を渡す。
///
/// 子の列挙順はグラフの隣接列挙順（挿入順）。左右の並びだけに影響する
/// 実装定義の性質であり、同じ構築結果に対しては決定的。
pub fn hierarchy_layout(
    g: &CollatzGraph,
    root: Option<u64>,
    opts: &HierarchyOptions,
) -> Result<HashMap<u64, Pos>, LayoutError> {
    ensure_tree(g)?;

    let root = match root {
        Some(r) => {
            if !g.contains(r) {
                return Err(LayoutError::UnknownRoot(r));
            }
            r
        }
        None => g
            .nodes()
            .filter(|&n| {
                g.graph
                    .neighbors_directed(n, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .min()
            .ok_or(LayoutError::NotATree("graph has no source node"))?,
    };

    Ok(subtree_positions(
        g,
        root,
        None,
        opts.width,
        opts.vert_gap,
        opts.vert_loc,
        opts.x_center,
    ))
}

/// node を根とする部分木の座標を純粋関数として計算し、呼び出し側が併合する。
fn subtree_positions(
    g: &CollatzGraph,
    node: u64,
    parent: Option<u64>,
    width: f64,
    vert_gap: f64,
    vert_loc: f64,
    x_center: f64,
) -> HashMap<u64, Pos> {
    let mut pos = HashMap::new();
    pos.insert(node, (x_center, vert_loc));

    let children: Vec<u64> = undirected_neighbors(g, node)
        .filter(|&c| Some(c) != parent)
        .collect();

    if !children.is_empty() {
        let dx = width / children.len() as f64;
        let mut child_x = x_center - width / 2.0 + dx / 2.0;
        for child in children {
            pos.extend(subtree_positions(
                g,
                child,
                Some(node),
                dx,
                vert_gap,
                vert_loc - vert_gap,
                child_x,
            ));
            child_x += dx;
        }
    }
    pos
}

/// 向きを無視した隣接ノード。出辺側を先に、次いで入辺側を列挙する。
fn undirected_neighbors(g: &CollatzGraph, n: u64) -> impl Iterator<Item = u64> + '_ {
    g.graph
        .neighbors_directed(n, Direction::Outgoing)
        .chain(g.graph.neighbors_directed(n, Direction::Incoming))
}

/// 無向として木か: 非空・連結・|E| = |V|−1。
fn ensure_tree(g: &CollatzGraph) -> Result<(), LayoutError> {
    let node_count = g.node_count();
    if node_count == 0 {
        return Err(LayoutError::EmptyGraph);
    }
    if g.edge_count() != node_count - 1 {
        return Err(LayoutError::NotATree("edge count is not node count - 1"));
    }

    // 連結性: 任意のノードから無向 BFS
    let start = match g.nodes().next() {
        Some(n) => n,
        None => return Err(LayoutError::EmptyGraph),
    };
    let mut seen: HashSet<u64> = HashSet::with_capacity(node_count);
    let mut queue = vec![start];
    seen.insert(start);
    while let Some(n) = queue.pop() {
        for m in undirected_neighbors(g, n) {
            if seen.insert(m) {
                queue.push(m);
            }
        }
    }
    if seen.len() != node_count {
        return Err(LayoutError::NotATree("graph is not connected"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::graphmap::DiGraphMap;

    fn graph_of(edges: &[(u64, u64)]) -> CollatzGraph {
        let mut graph = DiGraphMap::new();
        for &(a, b) in edges {
            graph.add_edge(a, b, ());
        }
        CollatzGraph {
            graph,
            range_max: 0,
        }
    }

    #[test]
    fn test_ensure_tree_rejects_cycle() {
        let g = graph_of(&[(1, 2), (2, 3), (3, 1)]);
        assert!(matches!(ensure_tree(&g), Err(LayoutError::NotATree(_))));
    }

    #[test]
    fn test_ensure_tree_rejects_disconnected() {
        // 2成分だが |E| = |V|−1 を満たす偽木
        let g = graph_of(&[(1, 2), (2, 3), (3, 1), (4, 5)]);
        assert!(matches!(ensure_tree(&g), Err(LayoutError::NotATree(_))));
    }

    #[test]
    fn test_ensure_tree_accepts_chain() {
        let g = graph_of(&[(1, 2), (2, 3)]);
        assert!(ensure_tree(&g).is_ok());
    }
}
