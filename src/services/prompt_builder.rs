//! 提示词构建 - 业务能力层
//!
//! 一组题目合成一条提示词，条目用组内位置 `[0]`、`[1]`… 标记。

use crate::models::QuestionRecord;

/// 选项字母（A、B、C…，超过 26 个时退化为数字）
fn option_label(index: usize) -> String {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map(|i| char::from(b'A' + i).to_string())
        .unwrap_or_else(|| (index + 1).to_string())
}

fn format_item(local_index: usize, record: &QuestionRecord) -> String {
    let options: Vec<String> = record
        .options
        .iter()
        .enumerate()
        .map(|(j, o)| format!("  {}) {}", option_label(j), o.text))
        .collect();

    let code_block = if record.code().trim().is_empty() {
        String::new()
    } else {
        format!("\n代码:\n{}", record.code())
    };

    let correct = match record.correct_option() {
        Some(option) => format!("{}) {}", option_label(record.correct_index), option.text),
        None => "未知".to_string(),
    };

    format!(
        "[{}]\n题目: {}{}\n选项:\n{}\n正确答案: {}",
        local_index,
        record.question,
        code_block,
        options.join("\n"),
        correct
    )
}

/// 构建一组题目的提示词
pub fn build_prompt<'a>(group: impl IntoIterator<Item = &'a QuestionRecord>) -> String {
    let items: Vec<String> = group
        .into_iter()
        .enumerate()
        .map(|(i, record)| format_item(i, record))
        .collect();

    format!(
        r#"你是一名经验丰富的大学助教。对下面每一道选择题，你需要填写两个字段：

- "explanation": 解释为什么标注的答案是正确的，要结合背后的理论概念，对复习有帮助。不要只说"答案 X 是正确的"。最多 2-3 句。
- "hint": 一句简短的提示，帮助学生思考，但不要直接透露答案。最多 1 句。

【重要规则】
- 使用与题目相同的语言书写。
- 如果不确定解释，对应字段填空字符串 ""。
- 不要编造错误信息。
- 只返回合法的 JSON 数组，不要 markdown，不要任何额外文字。

【输出格式】（每道题一个对象，按收到的顺序，index 为题目前方括号中的编号）
[
  {{"index": 0, "explanation": "...", "hint": "..."}},
  {{"index": 1, "explanation": "...", "hint": "..."}}
]

【题目】

{}

只返回 JSON 数组："#,
        items.join("\n\n")
    )
}
