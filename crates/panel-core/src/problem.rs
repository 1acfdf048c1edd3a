//! Coding challenge catalog.

use crate::config::Difficulty;
use serde::{Deserialize, Serialize};

/// CPU time budget per test case, in seconds.
pub const CPU_TIME_LIMIT_SECS: u32 = 5;
/// Memory budget per test case, in kilobytes (256 MB).
pub const MEMORY_LIMIT_KB: u32 = 256_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub expected: String,
}

/// A coding problem presented during the coding phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodingProblem {
    pub title: String,
    pub description: String,
    pub example: String,
    pub test_cases: Vec<TestCase>,
}

fn case(input: &str, expected: &str) -> TestCase {
    TestCase {
        input: input.to_string(),
        expected: expected.to_string(),
    }
}

impl CodingProblem {
    /// The problem used for a given difficulty tier.
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                title: "Two Sum".into(),
                description: "Given an array of integers nums and an integer target, return indices of the two numbers such that they add up to target.".into(),
                example: "Input: nums = [2,7,11,15], target = 9\nOutput: [0,1]".into(),
                test_cases: vec![
                    case("[2,7,11,15], 9", "[0,1]"),
                    case("[3,2,4], 6", "[1,2]"),
                    case("[3,3], 6", "[0,1]"),
                ],
            },
            Difficulty::Medium => Self {
                title: "Merge Intervals".into(),
                description: "Given an array of intervals where intervals[i] = [starti, endi], merge all overlapping intervals.".into(),
                example: "Input: intervals = [[1,3],[2,6],[8,10],[15,18]]\nOutput: [[1,6],[8,10],[15,18]]".into(),
                test_cases: vec![
                    case("[[1,3],[2,6],[8,10],[15,18]]", "[[1,6],[8,10],[15,18]]"),
                    case("[[1,4],[4,5]]", "[[1,5]]"),
                    case("[[1,4],[0,4]]", "[[0,4]]"),
                ],
            },
            Difficulty::Hard => Self {
                title: "Serialize and Deserialize Binary Tree".into(),
                description: "Design an algorithm to serialize and deserialize a binary tree.".into(),
                example: "Input: root = [1,2,3,null,null,4,5]\nOutput: [1,2,3,null,null,4,5]".into(),
                test_cases: vec![
                    case("[1,2,3,null,null,4,5]", "[1,2,3,null,null,4,5]"),
                    case("[]", "[]"),
                    case("[1]", "[1]"),
                ],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_difficulty_selects_problem() {
        assert_eq!(
            CodingProblem::for_difficulty(Difficulty::Hard).title,
            "Serialize and Deserialize Binary Tree"
        );
        assert_eq!(CodingProblem::for_difficulty(Difficulty::Easy).title, "Two Sum");
        assert_eq!(
            CodingProblem::for_difficulty(Difficulty::Medium).title,
            "Merge Intervals"
        );
    }

    #[test]
    fn test_every_problem_has_three_cases() {
        for difficulty in Difficulty::iter() {
            let problem = CodingProblem::for_difficulty(difficulty);
            assert_eq!(problem.test_cases.len(), 3, "{}", problem.title);
        }
    }
}
