//! 追问建议解析
//!
//! 辅导模型在回答末尾输出哨兵标记，随后逐行列出推荐的追问。

use std::sync::OnceLock;

use regex::Regex;

/// 答案与追问之间的哨兵标记
pub const SUGGESTIONS_MARKER: &str = "[SUGGESTED_QUESTIONS]";

/// 追问数量必须恰好为该值，否则丢弃
pub const SUGGESTION_COUNT: usize = 6;

fn list_prefix() -> &'static Regex {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    PREFIX.get_or_init(|| {
        Regex::new(r"^(?:\d+\s*[.)\-:]|[-*•])\s*").expect("list prefix pattern is valid")
    })
}

/// 拆分结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitReply {
    pub answer: String,
    pub suggestions: Option<Vec<String>>,
}

/// 按哨兵标记拆分模型回复
///
/// 模型常把标记写成 `**[SUGGESTED_QUESTIONS]**`，标记所在行两侧的 markdown 符号一并去掉。
pub fn split_suggestions(text: &str) -> SplitReply {
    let Some((answer, tail)) = text.split_once(SUGGESTIONS_MARKER) else {
        return SplitReply {
            answer: text.trim().to_string(),
            suggestions: None,
        };
    };

    let answer = match answer.rsplit_once('\n') {
        Some((head, marker_line)) if is_markup_only(marker_line) => head,
        None if is_markup_only(answer) => "",
        _ => answer,
    };

    let questions: Vec<String> = tail
        .lines()
        .map(|line| {
            let line = strip_emphasis(line);
            strip_emphasis(&list_prefix().replace(line, "")).to_string()
        })
        .filter(|line| !is_markup_only(line))
        .collect();

    SplitReply {
        answer: answer.trim().to_string(),
        suggestions: (questions.len() == SUGGESTION_COUNT).then_some(questions),
    }
}

fn strip_emphasis(line: &str) -> &str {
    line.trim().trim_matches(|c| c == '*' || c == '_').trim()
}

/// 空行或只有 markdown 符号的行
fn is_markup_only(line: &str) -> bool {
    line.chars()
        .all(|c| c.is_whitespace() || matches!(c, '*' | '_' | '#' | '-' | '>' | '`'))
}
