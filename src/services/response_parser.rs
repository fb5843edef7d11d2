//! 模型响应解析 - 业务能力层
//!
//! 从模型的自由文本中尽量取出一个 JSON 数组。取不到是正常情况，返回 `None`。

use crate::models::EnrichmentItem;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

fn fence_regex() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    // 第一对 ``` 之间的内容，允许带语言标记
    FENCE
        .get_or_init(|| Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)```").ok())
        .as_ref()
}

/// 解析模型响应
///
/// 有代码块时只看第一对围栏之间的内容；再在其中找第一个 `[` 到最后一个 `]`。
/// 解码失败或结果不是数组时返回 `None`。数组内无法识别的元素会被丢弃。
pub fn parse_response(raw: &str) -> Option<Vec<EnrichmentItem>> {
    let text = fence_regex()
        .and_then(|re| re.captures(raw))
        .and_then(|c| c.get(1))
        .map_or(raw, |m| m.as_str())
        .trim();

    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }

    let value: Value = match serde_json::from_str(&text[start..=end]) {
        Ok(value) => value,
        Err(e) => {
            debug!("响应 JSON 解析失败: {}", e);
            return None;
        }
    };

    let Value::Array(elements) = value else {
        return None;
    };

    Some(
        elements
            .into_iter()
            .filter_map(|element| serde_json::from_value(element).ok())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_array() {
        let items = parse_response(r#"[{"index": 0, "explanation": "E", "hint": "H"}]"#).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].index, Some(0));
        assert_eq!(items[0].explanation, "E");
    }

    #[test]
    fn test_parse_json_fence_with_prose() {
        let raw = "Ecco il risultato:\n```json\n[{\"index\": 1, \"hint\": \"pensa alla CPU\"}]\n```\nSpero aiuti [davvero].";
        let items = parse_response(raw).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].index, Some(1));
        assert_eq!(items[0].explanation, "");
        assert_eq!(items[0].hint, "pensa alla CPU");
    }

    #[test]
    fn test_parse_plain_fence() {
        let raw = "```\n[{\"index\": 0, \"explanation\": \"x\"}]\n```";
        assert_eq!(parse_response(raw).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_array_inside_prose() {
        let raw = "Certo! [{\"index\": 0, \"explanation\": \"a\", \"hint\": \"b\"}] Fine.";
        assert_eq!(parse_response(raw).unwrap()[0].hint, "b");
    }

    #[test]
    fn test_prose_without_array_is_none() {
        assert!(parse_response("Mi dispiace, non posso aiutarti.").is_none());
        assert!(parse_response("] reversed [").is_none());
    }

    #[test]
    fn test_invalid_json_is_none() {
        assert!(parse_response("[{\"index\": 0,]").is_none());
    }

    #[test]
    fn test_non_array_is_none() {
        assert!(parse_response("{\"index\": 0}").is_none());
    }

    #[test]
    fn test_non_object_elements_are_dropped() {
        let items = parse_response(r#"[1, "x", {"index": 0, "hint": "h"}]"#).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].hint, "h");
    }
}
