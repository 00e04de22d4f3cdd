//! 追问建议解析测试

use student_portal::core::{split_suggestions, SUGGESTIONS_MARKER};

fn reply_with(questions: &[&str]) -> String {
    format!(
        "פחת הוא הקצאה שיטתית של עלות הנכס לאורך חייו השימושיים.\n\n{}\n{}",
        SUGGESTIONS_MARKER,
        questions.join("\n")
    )
}

#[test]
fn test_six_questions_are_parsed() {
    let text = reply_with(&[
        "1. מה ההבדל בין פחת קו ישר לפחת מואץ?",
        "2. איך מחשבים ערך גרט?",
        "3.  מתי מכירים בירידת ערך?  ",
        "4) מה זה הפחתה?",
        "5. האם קרקע מופחתת?",
        "6. איך מציגים פחת נצבר במאזן?",
    ]);

    let reply = split_suggestions(&text);
    assert_eq!(
        reply.answer,
        "פחת הוא הקצאה שיטתית של עלות הנכס לאורך חייו השימושיים."
    );

    let questions = reply.suggestions.expect("six questions");
    assert_eq!(questions.len(), 6);
    assert_eq!(questions[0], "מה ההבדל בין פחת קו ישר לפחת מואץ?");
    assert_eq!(questions[2], "מתי מכירים בירידת ערך?");
    assert_eq!(questions[3], "מה זה הפחתה?");
    assert!(questions.iter().all(|q| q.trim() == q && !q.is_empty()));
}

#[test]
fn test_blank_lines_between_questions_are_ignored() {
    let text = reply_with(&["1. a", "", "2. b", "3. c", "   ", "4. d", "5. e", "6. f", ""]);
    assert_eq!(split_suggestions(&text).suggestions.unwrap().len(), 6);
}

#[test]
fn test_five_questions_are_dropped() {
    let text = reply_with(&["1. a", "2. b", "3. c", "4. d", "5. e"]);
    assert!(split_suggestions(&text).suggestions.is_none());
}

#[test]
fn test_seven_questions_are_dropped() {
    let text = reply_with(&["1. a", "2. b", "3. c", "4. d", "5. e", "6. f", "7. g"]);
    let reply = split_suggestions(&text);
    assert!(reply.suggestions.is_none());
    assert!(!reply.answer.contains(SUGGESTIONS_MARKER));
}
