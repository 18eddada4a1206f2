use collatz_hailstone_net::*;
use std::collections::HashSet;

fn edge_set(g: &CollatzGraph) -> HashSet<(u64, u64)> {
    g.edges().collect()
}

fn node_set(g: &CollatzGraph) -> HashSet<u64> {
    g.nodes().collect()
}

// ===== 構築の基本性質 =====

#[test]
fn test_build_zero_and_one_are_empty() {
    // N=0: 外側ループが一度も回らない。エラーではなく空グラフ。
    let g0 = build_graph(0, DEFAULT_MAX_STEPS).unwrap();
    assert_eq!(g0.node_count(), 0);
    assert_eq!(g0.edge_count(), 0);

    // N=1: 1 からのウォークは即停止し辺を生まないので、やはり空。
    let g1 = build_graph(1, DEFAULT_MAX_STEPS).unwrap();
    assert_eq!(g1.node_count(), 0);
    assert_eq!(g1.edge_count(), 0);
}

#[test]
fn test_build_two() {
    let g = build_graph(2, DEFAULT_MAX_STEPS).unwrap();
    assert_eq!(edge_set(&g), HashSet::from([(2, 1)]));
}

#[test]
fn test_build_10_contains_full_trajectory() {
    // 10 の軌道 10→5→16→8→4→2→1 が全て辺として存在する
    let g = build_graph(10, DEFAULT_MAX_STEPS).unwrap();
    let edges = edge_set(&g);
    for pair in [(10, 5), (5, 16), (16, 8), (8, 4), (4, 2), (2, 1)] {
        assert!(edges.contains(&pair), "missing edge {:?}", pair);
    }
    // 1 には 2 からの入辺がある
    assert!(edges.contains(&(2, 1)));
}

#[test]
fn test_build_15_golden_edge_set() {
    // i=1..15 の軌道の合併を手で展開したゴールデンケース
    let g = build_graph(15, DEFAULT_MAX_STEPS).unwrap();
    let expected: HashSet<(u64, u64)> = HashSet::from([
        (2, 1),
        (3, 10), (10, 5), (5, 16), (16, 8), (8, 4), (4, 2),
        (6, 3),
        (7, 22), (22, 11), (11, 34), (34, 17), (17, 52), (52, 26),
        (26, 13), (13, 40), (40, 20), (20, 10),
        (9, 28), (28, 14), (14, 7),
        (12, 6),
        (15, 46), (46, 23), (23, 70), (70, 35), (35, 106), (106, 53),
        (53, 160), (160, 80), (80, 40),
    ]);
    assert_eq!(edge_set(&g), expected);
    assert_eq!(g.node_count(), 32);
    assert_eq!(g.edge_count(), 31);
}

#[test]
fn test_build_idempotent() {
    let g1 = build_graph(100, DEFAULT_MAX_STEPS).unwrap();
    let g2 = build_graph(100, DEFAULT_MAX_STEPS).unwrap();
    assert_eq!(node_set(&g1), node_set(&g2));
    assert_eq!(edge_set(&g1), edge_set(&g2));
}

// ===== グラフ不変量 =====

#[test]
fn test_out_degree_invariant() {
    // 1 以外の全ノードは出次数ちょうど 1、1 は出次数 0
    let g = build_graph(50, DEFAULT_MAX_STEPS).unwrap();
    for n in g.nodes() {
        let successor = g.successor(n);
        if n == 1 {
            assert_eq!(successor, None, "node 1 must be the sink");
        } else {
            assert_eq!(
                successor,
                Some(collatz_step(n)),
                "node {} must step to its hailstone successor",
                n
            );
        }
    }
}

#[test]
fn test_graph_is_tree_toward_one() {
    // 辺数 = ノード数 − 1（1 に向いた木）
    for n in [2u64, 10, 15, 100, 500] {
        let g = build_graph(n, DEFAULT_MAX_STEPS).unwrap();
        assert_eq!(
            g.edge_count(),
            g.node_count() - 1,
            "not a tree for range 1..={}",
            n
        );
    }
}

// ===== 停止時間（グラフ経路長） =====

#[test]
fn test_stopping_time_from_graph() {
    let g = build_graph(10, DEFAULT_MAX_STEPS).unwrap();
    assert_eq!(g.stopping_time(1), Some(0));
    assert_eq!(g.stopping_time(2), Some(1));
    assert_eq!(g.stopping_time(8), Some(3));
    assert_eq!(g.stopping_time(10), Some(6));
    // 未登録ノード
    assert_eq!(g.stopping_time(1000), None);
}

// ===== 反転グラフ =====

#[test]
fn test_reversed_graph() {
    let g = build_graph(10, DEFAULT_MAX_STEPS).unwrap();
    let r = g.reversed();
    assert_eq!(r.node_count(), g.node_count());
    assert_eq!(r.edge_count(), g.edge_count());
    // 全辺が反転している
    let forward = edge_set(&g);
    for (a, b) in r.edges() {
        assert!(forward.contains(&(b, a)), "edge ({}, {}) not a reversal", a, b);
    }
    // 反転後は 1 が唯一の源（入次数 0）
    assert_eq!(r.successor(1), Some(2));
}

// ===== 上限とエラー =====

#[test]
fn test_step_limit_error() {
    // 27 の軌道は 111 ステップ必要なので上限 10 では失敗する
    let err = build_graph(27, 10).unwrap_err();
    match err {
        BuildError::StepLimit { start, max_steps } => {
            assert_eq!(max_steps, 10);
            assert!(start <= 27);
        }
        other => panic!("expected StepLimit, got {:?}", other),
    }
}

#[test]
fn test_error_display() {
    let err = BuildError::StepLimit { start: 27, max_steps: 10 };
    assert!(err.to_string().contains("27"));
    let err = BuildError::Overflow { start: 42 };
    assert!(err.to_string().contains("overflow"));
}
