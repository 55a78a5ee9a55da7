//! Fraction practice: task generation and grading.

pub mod fraction;

mod exercise;
pub use exercise::{Exercise, ExerciseQuestion};

mod generator;
pub use generator::{Curriculum, generate_tasks};

mod grader;
pub use grader::{GradeReport, grade, grade_for_points};
