use colored::Colorize;
use panel_core::config::Difficulty;
use panel_core::problem::CodingProblem;

pub fn list() {
    for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
        let problem = CodingProblem::for_difficulty(difficulty);
        println!(
            "{} {}",
            format!("[{difficulty}]").bright_black(),
            problem.title.bold()
        );
        println!("  {}", problem.description);
        for case in &problem.test_cases {
            println!("  {} {} -> {}", "•".bright_black(), case.input, case.expected);
        }
        println!();
    }
}
