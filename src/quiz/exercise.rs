use serde::{Deserialize, Serialize};

/// One generated practice exercise together with its answer key.
///
/// Serialized with an inner `type` tag, this is the exact shape stored in
/// `lesson_tasks.tasks_data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Exercise {
    Classify {
        numerator: u32,
        denominator: u32,
        answer: String,
    },
    MixedToImproper {
        whole: u32,
        numerator: u32,
        denominator: u32,
        answer: String,
    },
    ImproperToMixed {
        numerator: u32,
        denominator: u32,
        whole: u32,
        remainder: u32,
        answer: String,
    },
    Reduce {
        numerator: u32,
        denominator: u32,
        answer_num: u32,
        answer_den: u32,
        answer: String,
    },
    CompareSameDenom {
        num1: u32,
        num2: u32,
        denom: u32,
        answer: String,
    },
    CompareDiffDenom {
        num1: u32,
        denom1: u32,
        num2: u32,
        denom2: u32,
        answer: String,
    },
    ReduceHard {
        numerator: u32,
        denominator: u32,
        answer_num: u32,
        answer_den: u32,
        answer: String,
    },
}

impl Exercise {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Classify { .. } => "classify",
            Self::MixedToImproper { .. } => "mixed_to_improper",
            Self::ImproperToMixed { .. } => "improper_to_mixed",
            Self::Reduce { .. } => "reduce",
            Self::CompareSameDenom { .. } => "compare_same_denom",
            Self::CompareDiffDenom { .. } => "compare_diff_denom",
            Self::ReduceHard { .. } => "reduce_hard",
        }
    }

    /// Canonical answer string.
    pub fn answer(&self) -> &str {
        match self {
            Self::Classify { answer, .. }
            | Self::MixedToImproper { answer, .. }
            | Self::ImproperToMixed { answer, .. }
            | Self::Reduce { answer, .. }
            | Self::CompareSameDenom { answer, .. }
            | Self::CompareDiffDenom { answer, .. }
            | Self::ReduceHard { answer, .. } => answer,
        }
    }

    pub fn points(&self) -> u32 {
        match self {
            Self::ReduceHard { .. } => 2,
            _ => 1,
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::CompareSameDenom { .. } | Self::CompareDiffDenom { .. }
        )
    }

    /// Checks a user answer against the key. Comparison kinds ignore all
    /// whitespace, so `" > "` matches `">"`.
    pub fn check(&self, user_answer: &str) -> bool {
        let expected = self.answer().to_lowercase();
        let given = user_answer.trim().to_lowercase();

        if self.is_comparison() {
            strip_whitespace(&given) == strip_whitespace(&expected)
        } else {
            given == expected
        }
    }
}

/// An exercise as shown to a student before submission: the prompt without
/// any part of the answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExerciseQuestion {
    Classify { numerator: u32, denominator: u32 },
    MixedToImproper { whole: u32, numerator: u32, denominator: u32 },
    ImproperToMixed { numerator: u32, denominator: u32 },
    Reduce { numerator: u32, denominator: u32 },
    CompareSameDenom { num1: u32, num2: u32, denom: u32 },
    CompareDiffDenom { num1: u32, denom1: u32, num2: u32, denom2: u32 },
    ReduceHard { numerator: u32, denominator: u32 },
}

impl From<&Exercise> for ExerciseQuestion {
    fn from(exercise: &Exercise) -> Self {
        match *exercise {
            Exercise::Classify {
                numerator,
                denominator,
                ..
            } => Self::Classify {
                numerator,
                denominator,
            },
            Exercise::MixedToImproper {
                whole,
                numerator,
                denominator,
                ..
            } => Self::MixedToImproper {
                whole,
                numerator,
                denominator,
            },
            Exercise::ImproperToMixed {
                numerator,
                denominator,
                ..
            } => Self::ImproperToMixed {
                numerator,
                denominator,
            },
            Exercise::Reduce {
                numerator,
                denominator,
                ..
            } => Self::Reduce {
                numerator,
                denominator,
            },
            Exercise::CompareSameDenom {
                num1, num2, denom, ..
            } => Self::CompareSameDenom { num1, num2, denom },
            Exercise::CompareDiffDenom {
                num1,
                denom1,
                num2,
                denom2,
                ..
            } => Self::CompareDiffDenom {
                num1,
                denom1,
                num2,
                denom2,
            },
            Exercise::ReduceHard {
                numerator,
                denominator,
                ..
            } => Self::ReduceHard {
                numerator,
                denominator,
            },
        }
    }
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn serialized_with_type_tag() {
        let ex = Exercise::Classify {
            numerator: 3,
            denominator: 7,
            answer: "proper".into(),
        };
        let json = serde_json::to_value(&ex).unwrap();
        assert_eq!(json["type"], "classify");
        assert_eq!(json["numerator"], 3);
        assert_eq!(json["answer"], "proper");

        let back: Exercise = serde_json::from_value(json).unwrap();
        assert_eq!(back, ex);
    }

    #[test]
    fn check_is_case_insensitive() {
        let ex = Exercise::Classify {
            numerator: 9,
            denominator: 4,
            answer: "improper".into(),
        };
        assert!(ex.check("Improper"));
        assert!(ex.check("  IMPROPER "));
        assert!(!ex.check("proper"));
        assert!(!ex.check(""));
    }

    #[test]
    fn check_comparison_ignores_inner_whitespace() {
        let ex = Exercise::CompareSameDenom {
            num1: 5,
            num2: 3,
            denom: 9,
            answer: ">".into(),
        };
        assert!(ex.check(" > "));
        assert!(ex.check(">"));
        assert!(!ex.check("<"));

        let mixed = Exercise::ImproperToMixed {
            numerator: 11,
            denominator: 4,
            whole: 2,
            remainder: 3,
            answer: "2 3/4".into(),
        };
        // only comparison kinds drop inner whitespace
        assert!(!mixed.check("23/4"));
        assert!(mixed.check("2 3/4"));
    }

    #[test]
    fn hard_reduce_is_worth_two_points() {
        let ex = Exercise::ReduceHard {
            numerator: 36,
            denominator: 60,
            answer_num: 3,
            answer_den: 5,
            answer: "3/5".into(),
        };
        assert_eq!(ex.points(), 2);
        assert_eq!(ex.kind(), "reduce_hard");
    }

    #[test]
    fn question_hides_answer_key() {
        let ex = Exercise::ImproperToMixed {
            numerator: 17,
            denominator: 5,
            whole: 3,
            remainder: 2,
            answer: "3 2/5".into(),
        };
        let json = serde_json::to_value(ExerciseQuestion::from(&ex)).unwrap();
        assert_eq!(json["type"], "improper_to_mixed");
        assert_eq!(json["numerator"], 17);
        assert!(json.get("answer").is_none());
        assert!(json.get("whole").is_none());
        assert!(json.get("remainder").is_none());
    }
}
