use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::quiz::Exercise;

/// Descending `(min percent, grade)` pairs.
const GRADE_THRESHOLDS: [(u64, i32); 6] = [(95, 7), (85, 6), (75, 5), (65, 4), (50, 3), (35, 2)];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GradeReport {
    /// Unweighted number of correct exercises.
    pub correct_count: i32,
    pub total_count: i32,
    pub earned_points: u32,
    pub total_points: u32,
    pub percentage: f64,
    /// 1..=7
    pub grade: i32,
    /// Per exercise, in exercise order.
    pub correct: Vec<bool>,
}

/// Scores `answers` (exercise index as string → user answer) against the
/// stored exercises. Missing answers count as empty, i.e. incorrect.
pub fn grade(exercises: &[Exercise], answers: &HashMap<String, String>) -> GradeReport {
    let mut correct_count = 0;
    let mut earned_points = 0;
    let mut total_points = 0;
    let mut correct = Vec::with_capacity(exercises.len());

    for (idx, exercise) in exercises.iter().enumerate() {
        let points = exercise.points();
        total_points += points;

        let given = answers
            .get(&idx.to_string())
            .map(String::as_str)
            .unwrap_or("");
        let ok = exercise.check(given);
        if ok {
            correct_count += 1;
            earned_points += points;
        }
        correct.push(ok);
    }

    let percentage = if total_points == 0 {
        0.0
    } else {
        f64::from(earned_points) * 100.0 / f64::from(total_points)
    };

    GradeReport {
        correct_count,
        total_count: exercises.len() as i32,
        earned_points,
        total_points,
        percentage,
        grade: grade_for_points(earned_points, total_points),
        correct,
    }
}

/// Maps earned/total to the 1..=7 scale. Thresholds are compared in integer
/// arithmetic so 95% exactly is a 7 and anything below is not.
pub fn grade_for_points(earned: u32, total: u32) -> i32 {
    if total == 0 {
        return 1;
    }
    let scaled = u64::from(earned) * 100;
    let total = u64::from(total);

    GRADE_THRESHOLDS
        .iter()
        .find(|(min, _)| scaled >= min * total)
        .map(|(_, grade)| *grade)
        .unwrap_or(1)
}
