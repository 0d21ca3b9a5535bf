//! Pollard-rho (Brent variant) integer factorization — used for the PQ step.

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

fn modpow(mut n: u128, mut e: u128, m: u128) -> u128 {
    if m == 1 {
        return 0;
    }
    let mut result = 1;
    n %= m;
    while e > 0 {
        if e & 1 == 1 {
            result = result * n % m;
        }
        e >>= 1;
        n = n * n % m;
    }
    result
}

fn abs_sub(a: u128, b: u128) -> u128 {
    a.max(b) - a.min(b)
}

fn factorize_with(pq: u128, c: u128) -> (u64, u64) {
    if pq % 2 == 0 {
        return (2, (pq / 2) as u64);
    }

    let mut y = 3 * (pq / 7);
    let m = 7 * (pq / 13);
    let mut g = 1u128;
    let mut r = 1u128;
    let mut q = 1u128;
    let mut x = 0u128;
    let mut ys = 0u128;

    while g == 1 {
        x = y;
        for _ in 0..r {
            y = (modpow(y, 2, pq) + c) % pq;
        }
        let mut k = 0;
        while k < r && g == 1 {
            ys = y;
            for _ in 0..m.min(r - k) {
                y = (modpow(y, 2, pq) + c) % pq;
                q = q * abs_sub(x, y) % pq;
            }
            g = gcd(q, pq);
            k += m;
        }
        r *= 2;
    }

    if g == pq {
        loop {
            ys = (modpow(ys, 2, pq) + c) % pq;
            g = gcd(abs_sub(x, ys), pq);
            if g > 1 {
                break;
            }
        }
    }

    let p = g as u64;
    let q = (pq / g) as u64;
    (p.min(q), p.max(q))
}

/// Factorize `pq` into `(p, q)` with `p ≤ q`.
///
/// Runs a bounded schedule of attempts: a fixed set of polynomial offsets
/// first, then a few randomized ones. Returns `None` if every attempt
/// fails to split `pq` — the caller decides whether that aborts the
/// handshake.
pub fn factorize(pq: u64) -> Option<(u64, u64)> {
    let n = pq as u128;
    if n < 2 {
        return None;
    }

    for attempt in [43u128, 47, 53, 59, 61] {
        let c = attempt * (n / 103);
        let (p, q) = factorize_with(n, c);
        if p != 1 {
            return Some((p, q));
        }
    }

    for _ in 0..3 {
        let mut rnd = [0u8; 8];
        getrandom::getrandom(&mut rnd).ok()?;
        let c = (u64::from_le_bytes(rnd) as u128) % (n - 1) + 1;
        let (p, q) = factorize_with(n, c);
        if p != 1 {
            return Some((p, q));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factorizes_known_semiprimes() {
        assert_eq!(factorize(1470626929934143021), Some((1206429347, 1218991343)));
        assert_eq!(factorize(2363612107535801713), Some((1518968219, 1556064227)));
    }

    #[test]
    fn even_input_splits_immediately() {
        assert_eq!(factorize(20), Some((2, 10)));
    }

    #[test]
    fn degenerate_input_is_none() {
        assert_eq!(factorize(0), None);
        assert_eq!(factorize(1), None);
    }

    #[test]
    fn factors_are_ordered() {
        let (p, q) = factorize(0x17ed48941a08f981).unwrap();
        assert!(p <= q);
        assert_eq!(p as u128 * q as u128, 0x17ed48941a08f981u128);
    }
}
