use std::cmp::Ordering;

pub fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let rem = a % b;
        a = b;
        b = rem;
    }
    a
}

pub fn lcm(a: u32, b: u32) -> u32 {
    if a == 0 || b == 0 {
        return 0;
    }
    a / gcd(a, b) * b
}

/// Reduces `numerator/denominator` to lowest terms.
pub fn reduce(numerator: u32, denominator: u32) -> (u32, u32) {
    let divisor = gcd(numerator, denominator);
    if divisor == 0 {
        return (numerator, denominator);
    }
    (numerator / divisor, denominator / divisor)
}

/// Exact comparison of `n1/d1` against `n2/d2` by bringing both to the
/// least common denominator.
pub fn compare(n1: u32, d1: u32, n2: u32, d2: u32) -> Ordering {
    let common = u64::from(lcm(d1, d2));
    let left = u64::from(n1) * (common / u64::from(d1));
    let right = u64::from(n2) * (common / u64::from(d2));
    left.cmp(&right)
}

pub fn ordering_symbol(ordering: Ordering) -> &'static str {
    match ordering {
        Ordering::Greater => ">",
        Ordering::Less => "<",
        Ordering::Equal => "=",
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn gcd_and_lcm() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(7, 13), 1);
        assert_eq!(gcd(0, 5), 5);
        assert_eq!(lcm(3, 4), 12);
        assert_eq!(lcm(6, 8), 24);
    }

    #[test]
    fn reduce_to_lowest_terms() {
        assert_eq!(reduce(24, 36), (2, 3));
        assert_eq!(reduce(5, 7), (5, 7));
    }

    #[test]
    fn compare_is_exact() {
        assert_eq!(compare(2, 3, 3, 4), Ordering::Less);
        assert_eq!(compare(1, 3, 2, 6), Ordering::Equal);
        // 1/3 vs 33/100 would be ambiguous after rounding to two digits
        assert_eq!(compare(1, 3, 33, 100), Ordering::Greater);
        assert_eq!(ordering_symbol(compare(5, 8, 3, 5)), ">");
    }
}
