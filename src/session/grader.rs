use serde::{Deserialize, Serialize};

use crate::store::Question;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Verdict {
    pub is_correct: bool,
    pub message: String,
}

/// Grades a submitted selection against the stored answer.
///
/// Equality is string-based: the trimmed selection must match the answer
/// rendered in decimal ("3" matches answer 3, "03" does not). Pure function;
/// the session writes the verdict into its own state.
pub fn grade(question: &Question, selected: &str) -> Verdict {
    let is_correct = selected.trim() == question.answer.to_string();

    let message = if is_correct {
        "✅ 정답입니다!".to_string()
    } else {
        format!("❌ 틀렸습니다. (정답: {}번)", question.answer)
    };

    Verdict {
        is_correct,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question_with_answer(answer: u8) -> Question {
        Question {
            round: "60".to_string(),
            number: 1,
            options: [
                "갑".to_string(),
                "을".to_string(),
                "병".to_string(),
                "정".to_string(),
                "무".to_string(),
            ],
            answer,
        }
    }

    #[test]
    fn test_exact_match_is_correct() {
        let verdict = grade(&question_with_answer(3), "3");
        assert!(verdict.is_correct);
        assert_eq!(verdict.message, "✅ 정답입니다!");
    }

    #[test]
    fn test_selection_is_trimmed_before_comparison() {
        assert!(grade(&question_with_answer(3), " 3 ").is_correct);
    }

    #[test]
    fn test_no_numeric_coercion() {
        assert!(!grade(&question_with_answer(1), "01").is_correct);
        assert!(!grade(&question_with_answer(1), "1.0").is_correct);
    }

    #[test]
    fn test_wrong_selection_message_names_the_answer() {
        let verdict = grade(&question_with_answer(4), "2");
        assert!(!verdict.is_correct);
        assert!(verdict.message.contains('4'));
    }
}
