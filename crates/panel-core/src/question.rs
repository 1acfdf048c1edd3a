//! Behavioral question bank (STAR method).

use serde::{Deserialize, Serialize};

/// Questions asked per session.
pub const QUESTIONS_PER_SESSION: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehavioralQuestion {
    pub id: u32,
    pub prompt: String,
    pub category: String,
    pub competencies: Vec<String>,
    pub follow_up: String,
}

fn question(
    id: u32,
    prompt: &str,
    category: &str,
    competencies: &[&str],
    follow_up: &str,
) -> BehavioralQuestion {
    BehavioralQuestion {
        id,
        prompt: prompt.to_string(),
        category: category.to_string(),
        competencies: competencies.iter().map(|c| c.to_string()).collect(),
        follow_up: follow_up.to_string(),
    }
}

/// The full question bank, in asking order.
pub fn question_bank() -> Vec<BehavioralQuestion> {
    vec![
        question(
            1,
            "Tell me about a time when you had to work with a difficult team member. How did you handle the situation?",
            "Teamwork",
            &["collaboration", "conflict_resolution", "communication"],
            "What would you do differently if faced with a similar situation?",
        ),
        question(
            2,
            "Describe a situation where you had to learn a new technology quickly to complete a project. What was your approach?",
            "Learning Agility",
            &["adaptability", "learning", "problem_solving"],
            "How do you typically stay updated with new technologies?",
        ),
        question(
            3,
            "Give me an example of a time when you had to make a decision with incomplete information. What was the outcome?",
            "Decision Making",
            &["decision_making", "risk_assessment", "leadership"],
            "How do you typically handle uncertainty in your work?",
        ),
        question(
            4,
            "Tell me about a project where you had to meet a tight deadline. How did you manage your time and resources?",
            "Time Management",
            &["time_management", "prioritization", "stress_management"],
            "What tools or techniques do you use for project management?",
        ),
        question(
            5,
            "Describe a situation where you had to give constructive feedback to a colleague. How did you approach it?",
            "Leadership",
            &["leadership", "communication", "empathy"],
            "How do you handle receiving feedback yourself?",
        ),
    ]
}

/// The questions a single session asks.
pub fn session_questions() -> Vec<BehavioralQuestion> {
    let mut bank = question_bank();
    bank.truncate(QUESTIONS_PER_SESSION);
    bank
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_asks_first_three() {
        let questions = session_questions();
        assert_eq!(questions.len(), QUESTIONS_PER_SESSION);
        let ids: Vec<u32> = questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(questions[1].category, "Learning Agility");
    }
}
