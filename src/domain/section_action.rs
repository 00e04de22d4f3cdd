//! Income tax ordinance reader actions
//!
//! The ordinance reader lets a student pick a section and ask for one of four
//! kinds of help. Each kind is a fixed Hebrew question wrapped around the
//! quoted section text.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionAction {
    /// Detailed explanation
    Explain,
    /// Practical examples
    Examples,
    /// Eligibility conditions
    Conditions,
    /// Well-known rulings
    Rulings,
}

impl SectionAction {
    /// Panel title shown for this action
    pub fn title(&self) -> &'static str {
        match self {
            SectionAction::Explain => "הסבר מפורט של הסעיף",
            SectionAction::Examples => "דוגמאות מעשיות ויישום",
            SectionAction::Conditions => "תנאים וקריטריונים למימוש",
            SectionAction::Rulings => "פסקי דין מפורסמים ופרשנות משפטית",
        }
    }

    /// Build the question sent to the tutor for `section`
    pub fn question(&self, section: &str) -> String {
        match self {
            SectionAction::Explain => {
                format!("הסבר לי בצורה מפורטת את הסעיף הבא מפקודת מס הכנסה:\n\n{}", section)
            }
            SectionAction::Examples => format!(
                "הבא לי דוגמאות מעשיות ויישומיות של הסעיף הבא מפקודת מס הכנסה:\n\n{}",
                section
            ),
            SectionAction::Conditions => format!(
                "מה התנאים והקריטריונים למימוש הסעיף הבא מפקודת מס הכנסה?\n\n{}",
                section
            ),
            SectionAction::Rulings => format!(
                "מצא פסקי דין מפורסמים ופרשנות משפטית רלוונטית לסעיף הבא מפקודת מס הכנסה:\n\n{}",
                section
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lowercase_names() {
        let action: SectionAction = serde_json::from_str("\"rulings\"").unwrap();
        assert_eq!(action, SectionAction::Rulings);
        assert!(serde_json::from_str::<SectionAction>("\"summarize\"").is_err());
    }

    #[test]
    fn test_question_quotes_section() {
        let question = SectionAction::Conditions.question("סעיף 9(5)");
        assert!(question.contains("מה התנאים"));
        assert!(question.ends_with("\n\nסעיף 9(5)"));
    }

    #[test]
    fn test_titles_are_distinct() {
        let titles = [
            SectionAction::Explain.title(),
            SectionAction::Examples.title(),
            SectionAction::Conditions.title(),
            SectionAction::Rulings.title(),
        ];
        for (i, a) in titles.iter().enumerate() {
            assert!(titles[i + 1..].iter().all(|b| a != b));
        }
    }
}
