use rand::Rng;

use crate::quiz::{
    Exercise,
    fraction::{self, compare, ordering_symbol},
};

const REDUCE_FACTORS: [u32; 5] = [2, 3, 4, 5, 6];
const REDUCE_HARD_FACTORS: [u32; 5] = [6, 8, 9, 12, 15];
const COMPARE_DENOMINATORS: [u32; 8] = [2, 3, 4, 5, 6, 8, 10, 12];

/// Which fixed set of exercises a lesson hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curriculum {
    /// 3 classify + 3 mixed→improper + 4 improper→mixed
    MixedFractions,
    /// 3 reduce + 3 same-denominator + 3 different-denominator + 1 hard reduce
    Comparison,
}

impl From<&str> for Curriculum {
    fn from(value: &str) -> Self {
        match value {
            "comparison" => Self::Comparison,
            _ => Self::MixedFractions,
        }
    }
}

impl std::fmt::Display for Curriculum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MixedFractions => write!(f, "mixed_fractions"),
            Self::Comparison => write!(f, "comparison"),
        }
    }
}

impl Curriculum {
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Exercise> {
        match self {
            Self::MixedFractions => {
                let mut tasks = Vec::with_capacity(10);
                tasks.extend((0..3).map(|_| classify(rng)));
                tasks.extend((0..3).map(|_| mixed_to_improper(rng)));
                tasks.extend((0..4).map(|_| improper_to_mixed(rng)));
                tasks
            }
            Self::Comparison => {
                let mut tasks = Vec::with_capacity(10);
                tasks.extend((0..3).map(|_| reduce(rng)));
                tasks.extend((0..3).map(|_| compare_same_denom(rng)));
                tasks.extend((0..3).map(|_| compare_diff_denom(rng)));
                tasks.push(reduce_hard(rng));
                tasks
            }
        }
    }
}

/// Generates a fresh task set for the given lesson selector using the
/// thread-local RNG.
pub fn generate_tasks(selector: &str) -> Vec<Exercise> {
    Curriculum::from(selector).generate(&mut rand::rng())
}

fn pick<R: Rng + ?Sized>(rng: &mut R, values: &[u32]) -> u32 {
    values[rng.random_range(0..values.len())]
}

fn classify<R: Rng + ?Sized>(rng: &mut R) -> Exercise {
    let numerator = rng.random_range(1..=20);
    let denominator = rng.random_range(2..=15);
    let answer = if numerator < denominator {
        "proper"
    } else {
        "improper"
    };

    Exercise::Classify {
        numerator,
        denominator,
        answer: answer.to_string(),
    }
}

fn mixed_to_improper<R: Rng + ?Sized>(rng: &mut R) -> Exercise {
    let whole = rng.random_range(1..=10);
    let numerator = rng.random_range(1..=8);
    let denominator = rng.random_range(2..=9);

    Exercise::MixedToImproper {
        whole,
        numerator,
        denominator,
        answer: format!("{}/{}", whole * denominator + numerator, denominator),
    }
}

// Built backwards from a known mixed number so the question is always a
// well-formed improper fraction.
fn improper_to_mixed<R: Rng + ?Sized>(rng: &mut R) -> Exercise {
    let denominator = rng.random_range(2..=9);
    let whole = rng.random_range(1..=8);
    let remainder = rng.random_range(1..denominator);

    Exercise::ImproperToMixed {
        numerator: whole * denominator + remainder,
        denominator,
        whole,
        remainder,
        answer: format!("{} {}/{}", whole, remainder, denominator),
    }
}

/// Scales a proper target fraction by `factor`. The target is brought to
/// lowest terms first so that the stored key is the fully reduced form.
fn scaled(base_num: u32, base_den: u32, factor: u32) -> (u32, u32, u32, u32) {
    let (answer_num, answer_den) = fraction::reduce(base_num, base_den);
    (
        answer_num * factor,
        answer_den * factor,
        answer_num,
        answer_den,
    )
}

fn reduce<R: Rng + ?Sized>(rng: &mut R) -> Exercise {
    let factor = pick(rng, &REDUCE_FACTORS);
    let base_num = rng.random_range(1..=8);
    let base_den = rng.random_range(base_num + 1..=12);
    let (numerator, denominator, answer_num, answer_den) = scaled(base_num, base_den, factor);

    Exercise::Reduce {
        numerator,
        denominator,
        answer_num,
        answer_den,
        answer: format!("{}/{}", answer_num, answer_den),
    }
}

fn reduce_hard<R: Rng + ?Sized>(rng: &mut R) -> Exercise {
    let factor = pick(rng, &REDUCE_HARD_FACTORS);
    let base_num = rng.random_range(3..=10);
    let base_den = rng.random_range(base_num + 2..=15);
    let (numerator, denominator, answer_num, answer_den) = scaled(base_num, base_den, factor);

    Exercise::ReduceHard {
        numerator,
        denominator,
        answer_num,
        answer_den,
        answer: format!("{}/{}", answer_num, answer_den),
    }
}

fn compare_same_denom<R: Rng + ?Sized>(rng: &mut R) -> Exercise {
    let denom = rng.random_range(5..=15);
    let num1 = rng.random_range(1..denom);
    let mut num2 = rng.random_range(1..denom);
    while num2 == num1 {
        num2 = rng.random_range(1..denom);
    }

    Exercise::CompareSameDenom {
        num1,
        num2,
        denom,
        answer: ordering_symbol(num1.cmp(&num2)).to_string(),
    }
}

fn compare_diff_denom<R: Rng + ?Sized>(rng: &mut R) -> Exercise {
    let denom1 = pick(rng, &COMPARE_DENOMINATORS);
    let mut denom2 = pick(rng, &COMPARE_DENOMINATORS);
    while denom2 == denom1 {
        denom2 = pick(rng, &COMPARE_DENOMINATORS);
    }
    let num1 = rng.random_range(1..denom1);
    let num2 = rng.random_range(1..denom2);

    Exercise::CompareDiffDenom {
        num1,
        denom1,
        num2,
        denom2,
        answer: ordering_symbol(compare(num1, denom1, num2, denom2)).to_string(),
    }
}

#[cfg(test)]
mod test {
    use std::cmp::Ordering;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::quiz::fraction::gcd;

    fn sample(curriculum: Curriculum, rounds: u64) -> Vec<Exercise> {
        (0..rounds)
            .flat_map(|seed| curriculum.generate(&mut StdRng::seed_from_u64(seed)))
            .collect()
    }

    fn kinds(tasks: &[Exercise]) -> Vec<&'static str> {
        tasks.iter().map(Exercise::kind).collect()
    }

    #[test]
    fn unknown_selector_falls_back_to_mixed_fractions() {
        assert_eq!(Curriculum::from("comparison"), Curriculum::Comparison);
        assert_eq!(Curriculum::from("mixed_fractions"), Curriculum::MixedFractions);
        assert_eq!(Curriculum::from("whatever"), Curriculum::MixedFractions);
        assert_eq!(Curriculum::from(""), Curriculum::MixedFractions);
    }

    #[test]
    fn mixed_fractions_shape() {
        let tasks = Curriculum::MixedFractions.generate(&mut StdRng::seed_from_u64(7));
        assert_eq!(
            kinds(&tasks),
            vec![
                "classify",
                "classify",
                "classify",
                "mixed_to_improper",
                "mixed_to_improper",
                "mixed_to_improper",
                "improper_to_mixed",
                "improper_to_mixed",
                "improper_to_mixed",
                "improper_to_mixed",
            ]
        );
    }

    #[test]
    fn comparison_shape() {
        let tasks = Curriculum::Comparison.generate(&mut StdRng::seed_from_u64(7));
        assert_eq!(tasks.len(), 10);
        assert_eq!(&kinds(&tasks)[..3], &["reduce"; 3]);
        assert_eq!(&kinds(&tasks)[3..6], &["compare_same_denom"; 3]);
        assert_eq!(&kinds(&tasks)[6..9], &["compare_diff_denom"; 3]);
        assert_eq!(tasks[9].kind(), "reduce_hard");
        assert_eq!(tasks.iter().map(Exercise::points).sum::<u32>(), 11);
    }

    #[test]
    fn classify_ranges_and_rule() {
        for task in sample(Curriculum::MixedFractions, 200) {
            if let Exercise::Classify {
                numerator,
                denominator,
                answer,
            } = task
            {
                assert!((1..=20).contains(&numerator));
                assert!((2..=15).contains(&denominator));
                let expected = if numerator < denominator { "proper" } else { "improper" };
                assert_eq!(answer, expected);
            }
        }
    }

    #[test]
    fn mixed_to_improper_answer() {
        for task in sample(Curriculum::MixedFractions, 200) {
            if let Exercise::MixedToImproper {
                whole,
                numerator,
                denominator,
                answer,
            } = task
            {
                assert!((1..=10).contains(&whole));
                assert!((1..=8).contains(&numerator));
                assert!((2..=9).contains(&denominator));
                assert_eq!(answer, format!("{}/{}", whole * denominator + numerator, denominator));
            }
        }
    }

    #[test]
    fn improper_to_mixed_round_trip() {
        for task in sample(Curriculum::MixedFractions, 200) {
            if let Exercise::ImproperToMixed {
                numerator,
                denominator,
                whole,
                remainder,
                answer,
            } = task
            {
                assert!((2..=9).contains(&denominator));
                assert!((1..=8).contains(&whole));
                assert!(remainder >= 1 && remainder < denominator);
                assert!(numerator > denominator);
                assert_eq!(numerator / denominator, whole);
                assert_eq!(numerator % denominator, remainder);
                assert_eq!(answer, format!("{} {}/{}", whole, remainder, denominator));
            }
        }
    }

    #[test]
    fn reduce_answers_are_lowest_terms() {
        let mut seen = 0;
        for task in sample(Curriculum::Comparison, 300) {
            let (numerator, denominator, answer_num, answer_den, answer) = match task {
                Exercise::Reduce {
                    numerator,
                    denominator,
                    answer_num,
                    answer_den,
                    answer,
                }
                | Exercise::ReduceHard {
                    numerator,
                    denominator,
                    answer_num,
                    answer_den,
                    answer,
                } => (numerator, denominator, answer_num, answer_den, answer),
                _ => continue,
            };
            seen += 1;

            let divisor = gcd(numerator, denominator);
            assert_eq!(numerator / divisor, answer_num);
            assert_eq!(denominator / divisor, answer_den);
            assert_eq!(gcd(answer_num, answer_den), 1);
            assert!(answer_num < answer_den);
            assert_eq!(answer, format!("{}/{}", answer_num, answer_den));
        }
        assert_eq!(seen, 300 * 4);
    }

    #[test]
    fn hard_reduce_uses_large_factors() {
        for task in sample(Curriculum::Comparison, 200) {
            if let Exercise::ReduceHard {
                numerator,
                answer_num,
                ..
            } = task
            {
                let factor = numerator / answer_num;
                assert!(REDUCE_HARD_FACTORS.contains(&factor));
            }
        }
    }

    #[test]
    fn comparison_answers_are_exact() {
        for task in sample(Curriculum::Comparison, 300) {
            match task {
                Exercise::CompareSameDenom {
                    num1,
                    num2,
                    denom,
                    answer,
                } => {
                    assert_ne!(num1, num2);
                    assert!(num1 < denom && num2 < denom);
                    assert_ne!(answer, "=");
                    assert_eq!(answer, ordering_symbol(num1.cmp(&num2)));
                }
                Exercise::CompareDiffDenom {
                    num1,
                    denom1,
                    num2,
                    denom2,
                    answer,
                } => {
                    assert_ne!(denom1, denom2);
                    assert!(COMPARE_DENOMINATORS.contains(&denom1));
                    assert!(COMPARE_DENOMINATORS.contains(&denom2));
                    assert!(num1 >= 1 && num1 < denom1);
                    assert!(num2 >= 1 && num2 < denom2);

                    let cross = (num1 * denom2).cmp(&(num2 * denom1));
                    assert_eq!(answer, ordering_symbol(cross));
                    if cross == Ordering::Equal {
                        assert_eq!(answer, "=");
                    }
                }
                _ => {}
            }
        }
    }
}
