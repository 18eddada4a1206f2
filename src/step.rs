use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;

/// コラッツ写像の1ステップ: n が偶数なら n/2、奇数なら 3n+1。
///
/// 正の整数に対して全域。n=0 は定義域外（呼び出し側が保証する）。
#[inline]
pub fn collatz_step(n: u64) -> u64 {
    if n % 2 == 0 {
        n / 2
    } else {
        3 * n + 1
    }
}

/// オーバーフロー検査付きの1ステップ。3n+1 が u64 を超えたら None。
///
/// グラフ構築はノードを u64 でキーするため、u64 を超える値は
/// ここで検出して呼び出し側に返す（BigUint 版は [`collatz_step_big`]）。
#[inline]
pub fn collatz_step_checked(n: u64) -> Option<u64> {
    if n % 2 == 0 {
        Some(n / 2)
    } else {
        n.checked_mul(3)?.checked_add(1)
    }
}

/// BigUint 版の1ステップ。任意桁の軌道追跡用。
pub fn collatz_step_big(n: &BigUint) -> BigUint {
    if n.is_even() {
        n >> 1u32
    } else {
        n * 3u64 + BigUint::one()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_even_odd() {
        assert_eq!(collatz_step(4), 2);
        assert_eq!(collatz_step(7), 22);
        assert_eq!(collatz_step(2), 1);
        assert_eq!(collatz_step(1), 4); // ループは 1 で止めるので通常は呼ばれない
    }

    #[test]
    fn test_step_checked_overflow() {
        // 3n+1 が u64 に収まる最大の奇数
        let max_ok = (u64::MAX - 1) / 3;
        let max_ok = if max_ok % 2 == 0 { max_ok - 1 } else { max_ok };
        assert!(collatz_step_checked(max_ok).is_some());
        assert_eq!(collatz_step_checked(u64::MAX), None);
    }

    #[test]
    fn test_step_big_matches_u64() {
        for n in 1u64..=100 {
            let big = collatz_step_big(&BigUint::from(n));
            assert_eq!(big, BigUint::from(collatz_step(n)), "mismatch for n={}", n);
        }
    }
}
