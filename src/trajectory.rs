use num_bigint::BigUint;
use num_traits::One;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use crate::step::collatz_step_big;

/// 軌道追跡の結果
#[derive(Debug, Clone)]
pub struct TrajectoryResult {
    /// 開始値
    pub start: BigUint,
    /// 開始値の次から 1 までの各値
    pub steps: Vec<BigUint>,
    /// 総ステップ数
    pub total_steps: u64,
    /// 軌道上の最大値
    pub max_value: BigUint,
    /// 1 に到達したか（max_steps 打ち切りなら false）
    pub reached_one: bool,
}

/// start から 1 に到達するまで（または max_steps に達するまで）反復する。
///
/// グラフ構築と違いノードを u64 でキーしないので、u64 を超える
/// 開始値・途中値も扱える。
pub fn trace_trajectory(start: &BigUint, max_steps: u64) -> TrajectoryResult {
    static NO_CANCEL: AtomicBool = AtomicBool::new(false);
    trace_trajectory_cancellable(start, max_steps, &NO_CANCEL, |_, _| {})
}

/// 進捗コールバックとキャンセル対応付きの軌道追跡。
/// callback(step, 現在値のビット長) を各ステップで呼ぶ。
/// cancel が true になると途中結果を返す。
pub fn trace_trajectory_cancellable(
    start: &BigUint,
    max_steps: u64,
    cancel: &AtomicBool,
    callback: impl Fn(u64, usize),
) -> TrajectoryResult {
    let one = BigUint::one();
    let mut current = start.clone();
    let mut steps: Vec<BigUint> = Vec::new();
    let mut total_steps = 0u64;
    let mut max_value = start.clone();
    let mut reached_one = current == one;

    while !reached_one && total_steps < max_steps {
        if cancel.load(AtomicOrdering::Relaxed) {
            break;
        }

        current = collatz_step_big(&current);
        total_steps += 1;

        if current > max_value {
            max_value = current.clone();
        }

        callback(total_steps, current.bits() as usize);
        steps.push(current.clone());

        if current == one {
            reached_one = true;
        }
    }

    TrajectoryResult {
        start: start.clone(),
        steps,
        total_steps,
        max_value,
        reached_one,
    }
}

/// 直接反復による停止時間: 1 に到達するまでのステップ数。
/// max_steps 以内に到達しなければ None。
pub fn stopping_time_value(n: &BigUint, max_steps: u64) -> Option<u64> {
    let one = BigUint::one();
    if *n == one {
        return Some(0);
    }
    let mut current = n.clone();
    let mut steps = 0u64;
    while steps < max_steps {
        current = collatz_step_big(&current);
        steps += 1;
        if current == one {
            return Some(steps);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_27() {
        // 27 の標準軌道: 111 ステップ、最大値 9232
        let result = trace_trajectory(&BigUint::from(27u64), 1000);
        assert!(result.reached_one);
        assert_eq!(result.total_steps, 111);
        assert_eq!(result.max_value, BigUint::from(9232u64));
    }

    #[test]
    fn test_trace_start_at_one() {
        let result = trace_trajectory(&BigUint::one(), 1000);
        assert!(result.reached_one);
        assert_eq!(result.total_steps, 0);
        assert!(result.steps.is_empty());
    }

    #[test]
    fn test_stopping_time_value() {
        assert_eq!(stopping_time_value(&BigUint::one(), 100), Some(0));
        assert_eq!(stopping_time_value(&BigUint::from(8u64), 100), Some(3));
        assert_eq!(stopping_time_value(&BigUint::from(27u64), 10), None);
    }
}
