//! Grading Aggregator — maps letter grades to points and sums them into a
//! bounded total. Pure functions throughout: same records, same score.

use serde::{Deserialize, Serialize};

/// Points awarded per metric grade: 5 metrics × 20 points = 100 max.
pub const POINTS_PER_METRIC: u32 = 20;

/// One evaluated metric from the grading flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingRecord {
    pub metric: String,
    pub grade: String,
    pub feedback: String,
}

/// Aggregated grading result: the ordered records plus the bounded total.
#[derive(Debug, Clone, Serialize)]
pub struct GradeReport {
    pub records: Vec<GradingRecord>,
    pub total: u32,
    pub max_possible: u32,
}

impl GradeReport {
    pub fn from_records(records: Vec<GradingRecord>) -> Self {
        let total = records.iter().map(|r| grade_points(&r.grade)).sum();
        let max_possible = records.len() as u32 * POINTS_PER_METRIC;
        Self {
            records,
            total,
            max_possible,
        }
    }
}

/// Fixed grade-to-points table. Unknown or malformed grades score 0 rather
/// than failing the aggregation — one bad record must not block the rest.
pub fn grade_points(grade: &str) -> u32 {
    match grade.trim().to_ascii_uppercase().as_str() {
        "A" => 20,
        "B" => 16,
        "C" => 12,
        "D" => 8,
        "F" => 4,
        _ => 0,
    }
}
