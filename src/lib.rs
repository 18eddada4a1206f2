//! コラッツ・ハイルストーン軌道ネットワーク
//!
//! 開始値 1..=N の各ハイルストーン軌道（3n+1 反復）を合併して一つの
//! 有向グラフを作り、各ノードに決定的な 2D 座標を与える 5 種の
//! レイアウト（対数半径・倍加半径・螺旋・数直線・階層木）を計算する。
//!
//! グラフ → レイアウト → 表示（CLI / GUI）の一方向データフローで、
//! レイアウト関数は全て状態なしの純粋関数。

pub mod graph;
pub mod hierarchy;
pub mod layout;
pub mod step;
pub mod trajectory;
pub mod verify;

pub use graph::{build_graph, BuildError, CollatzGraph, DEFAULT_MAX_STEPS};
pub use hierarchy::{hierarchy_layout, HierarchyOptions};
pub use layout::{
    doubling_radius_layout, log_radius_layout, number_line_layout, spiral_layout, LayoutError,
    Pos,
};
pub use step::{collatz_step, collatz_step_big, collatz_step_checked};
pub use trajectory::{trace_trajectory, trace_trajectory_cancellable, stopping_time_value, TrajectoryResult};
pub use verify::{verify_range, verify_range_parallel, verify_range_parallel_cancellable, ConvergenceResult};
