use num_bigint::BigUint;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use crate::trajectory;

/// 範囲検証の結果
#[derive(Debug, Clone)]
pub struct ConvergenceResult {
    /// 検証した整数の総数
    pub total_checked: u64,
    /// 全て収束したか
    pub all_converged: bool,
    /// 最大停止時間
    pub max_stopping_time: u64,
    /// 最大停止時間を持つ数
    pub max_stopping_time_number: u64,
    /// max_steps 以内に 1 へ到達しなかった数
    pub failures: Vec<u64>,
}

/// u64 の停止時間。内部は u128 で回し、3n+1 が u128 の上限に近づいたら
/// BigUint 版にフォールバックする。
fn stopping_time_u64(n: u64, max_steps: u64) -> Option<u64> {
    if n == 1 {
        return Some(0);
    }
    let overflow_limit = (u128::MAX - 1) / 3;
    let mut current = n as u128;
    let mut steps = 0u64;

    while steps < max_steps {
        if current % 2 == 0 {
            current /= 2;
        } else {
            if current > overflow_limit {
                // u128 でも溢れる領域は BigUint で続行
                return trajectory::stopping_time_value(
                    &BigUint::from(current),
                    max_steps - steps,
                )
                .map(|rest| steps + rest);
            }
            current = 3 * current + 1;
        }
        steps += 1;
        if current == 1 {
            return Some(steps);
        }
    }
    None
}

/// [start, end] の全整数の収束を検証する（シングルスレッド版）。
///
/// グラフ構築は両偶奇の値を歩くので、奇数だけでなく全整数を検証する。
/// progress_callback: (完了数, 総数) を定期的に呼ぶ。
pub fn verify_range(
    start: u64,
    end: u64,
    max_steps: u64,
    progress_callback: impl Fn(u64, u64),
) -> ConvergenceResult {
    let start = start.max(1);
    if start > end {
        return ConvergenceResult {
            total_checked: 0,
            all_converged: true,
            max_stopping_time: 0,
            max_stopping_time_number: 0,
            failures: Vec::new(),
        };
    }

    let total = end - start + 1;
    let mut total_checked = 0u64;
    let mut max_stopping_time = 0u64;
    let mut max_stopping_time_number = start;
    let mut failures: Vec<u64> = Vec::new();

    for n in start..=end {
        match stopping_time_u64(n, max_steps) {
            Some(st) => {
                if st > max_stopping_time {
                    max_stopping_time = st;
                    max_stopping_time_number = n;
                }
            }
            None => failures.push(n),
        }

        total_checked += 1;
        if total_checked % 1000 == 0 {
            progress_callback(total_checked, total);
        }
    }

    progress_callback(total_checked, total);

    ConvergenceResult {
        total_checked,
        all_converged: failures.is_empty(),
        max_stopping_time,
        max_stopping_time_number,
        failures,
    }
}

/// [start, end] の全整数の収束を検証する（並列版）。
/// Rayon でチャンク分割して並列処理。
/// progress_callback: (完了数, 総数) を定期的に呼ぶ（スレッドセーフ）。
pub fn verify_range_parallel(
    start: u64,
    end: u64,
    max_steps: u64,
    progress_callback: impl Fn(u64, u64) + Sync,
) -> ConvergenceResult {
    static NO_CANCEL: AtomicBool = AtomicBool::new(false);
    verify_range_parallel_cancellable(start, end, max_steps, &NO_CANCEL, progress_callback)
}

/// キャンセル可能な並列検証。cancel が true になると途中結果を返す。
pub fn verify_range_parallel_cancellable(
    start: u64,
    end: u64,
    max_steps: u64,
    cancel: &AtomicBool,
    progress_callback: impl Fn(u64, u64) + Sync,
) -> ConvergenceResult {
    let start = start.max(1);
    if start > end {
        return ConvergenceResult {
            total_checked: 0,
            all_converged: true,
            max_stopping_time: 0,
            max_stopping_time_number: 0,
            failures: Vec::new(),
        };
    }

    let total = end - start + 1;

    // チャンク分割: 各チャンク10000個
    let chunk_size: u64 = 10000;
    let num_chunks = total.div_ceil(chunk_size);

    let global_done = AtomicU64::new(0);
    let global_max_st = AtomicU64::new(0);
    let global_max_st_n = Mutex::new(start);
    let global_failures: Mutex<Vec<u64>> = Mutex::new(Vec::new());

    (0..num_chunks).into_par_iter().for_each(|chunk_idx| {
        if cancel.load(Ordering::Relaxed) {
            return;
        }

        let chunk_start = start + chunk_idx * chunk_size;
        let chunk_end = std::cmp::min(chunk_start + chunk_size - 1, end);

        let mut local_max_st = 0u64;
        let mut local_max_st_n = chunk_start;
        let mut local_failures: Vec<u64> = Vec::new();
        let mut unreported = 0u64;

        for n in chunk_start..=chunk_end {
            if cancel.load(Ordering::Relaxed) {
                break;
            }
            match stopping_time_u64(n, max_steps) {
                Some(st) => {
                    if st > local_max_st {
                        local_max_st = st;
                        local_max_st_n = n;
                    }
                }
                None => local_failures.push(n),
            }
            unreported += 1;

            // チャンク内でも定期的に進捗報告
            if unreported >= 1000 {
                let done = global_done.fetch_add(unreported, Ordering::Relaxed) + unreported;
                progress_callback(done, total);
                unreported = 0;
            }
        }

        // 残りをグローバルに反映
        if unreported > 0 {
            let done = global_done.fetch_add(unreported, Ordering::Relaxed) + unreported;
            progress_callback(done, total);
        }

        // 最大停止時間を更新
        let prev_max = global_max_st.load(Ordering::Relaxed);
        if local_max_st > prev_max {
            global_max_st.fetch_max(local_max_st, Ordering::Relaxed);
            let mut guard = global_max_st_n.lock().unwrap();
            if local_max_st >= global_max_st.load(Ordering::Relaxed) {
                *guard = local_max_st_n;
            }
        }

        if !local_failures.is_empty() {
            global_failures.lock().unwrap().extend(local_failures);
        }
    });

    let total_checked = global_done.load(Ordering::Relaxed);
    let max_stopping_time = global_max_st.load(Ordering::Relaxed);
    let max_stopping_time_number = *global_max_st_n.lock().unwrap();
    let mut failures = global_failures.into_inner().unwrap();
    failures.sort_unstable();

    ConvergenceResult {
        total_checked,
        all_converged: failures.is_empty(),
        max_stopping_time,
        max_stopping_time_number,
        failures,
    }
}
