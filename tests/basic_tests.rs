use collatz_hailstone_net::*;
use num_bigint::BigUint;

/// u64 版ステップと BigUint 算術の一致を検証するヘルパー
fn verify_step_arithmetic(n: u64) {
    let big_n = BigUint::from(n);

    // 算術計算: 偶数なら n/2、奇数なら 3n+1
    let expected = if n % 2 == 0 {
        &big_n >> 1u32
    } else {
        &big_n * BigUint::from(3u64) + BigUint::from(1u64)
    };

    assert_eq!(
        BigUint::from(collatz_step(n)),
        expected,
        "step mismatch for n={}",
        n
    );
    assert_eq!(
        collatz_step_big(&big_n),
        expected,
        "big step mismatch for n={}",
        n
    );
    assert_eq!(
        collatz_step_checked(n),
        Some(collatz_step(n)),
        "checked step mismatch for n={}",
        n
    );
}

// ===== 分岐テスト =====

#[test]
fn test_step_specific_cases() {
    assert_eq!(collatz_step(4), 2); // 偶数分岐
    assert_eq!(collatz_step(7), 22); // 奇数分岐
    assert_eq!(collatz_step(2), 1);
    assert_eq!(collatz_step(6), 3);
    assert_eq!(collatz_step(27), 82);
}

#[test]
fn test_step_all_1_to_999() {
    for n in 1u64..=999 {
        verify_step_arithmetic(n);
    }
}

// ===== オーバーフロー境界 =====

#[test]
fn test_checked_step_overflow_boundary() {
    // 偶数は常に成功
    assert_eq!(collatz_step_checked(u64::MAX - 1), Some((u64::MAX - 1) / 2));
    // 3n+1 が収まらない奇数
    assert_eq!(collatz_step_checked(u64::MAX), None);
}

// ===== 収束性（有界サンプル） =====

#[test]
fn test_bounded_convergence_1_to_10000() {
    // 予想の証明ではなく回帰検出。上限内に全て 1 へ到達すること。
    let result = verify_range_parallel(1, 10_000, 100_000, |_, _| {});
    assert_eq!(result.total_checked, 10_000);
    assert!(result.all_converged, "failures: {:?}", result.failures);
}

#[test]
fn test_known_stopping_times() {
    // よく知られた値: 27 は 111 ステップ、最大値 9232
    let result = trace_trajectory(&BigUint::from(27u64), 1000);
    assert!(result.reached_one);
    assert_eq!(result.total_steps, 111);
    assert_eq!(result.max_value, BigUint::from(9232u64));

    assert_eq!(stopping_time_value(&BigUint::from(1u64), 100), Some(0));
    assert_eq!(stopping_time_value(&BigUint::from(2u64), 100), Some(1));
    assert_eq!(stopping_time_value(&BigUint::from(16u64), 100), Some(4));
}
