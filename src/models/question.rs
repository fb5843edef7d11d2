use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// 选项
///
/// `image` 等字段对本程序不透明，连同 `null` 值一起原样保留在 `extra` 中。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizOption {
    pub text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QuizOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// 题目记录
///
/// 读取时保留整条原始对象；写回时只就地更新 `explanation` 和 `hint`，
/// 其余字段（键顺序、`null` 值、未识别的字段）原样输出。
/// 类型化字段是只读视图，只有在代码中新建的记录才会从它们生成对象。
#[derive(Debug, Clone, Default)]
pub struct QuestionRecord {
    pub question: String,
    pub options: Vec<QuizOption>,
    pub correct_index: usize,
    pub code: Option<String>,
    pub explanation: String,
    pub hint: String,
    pub(crate) source: Map<String, Value>,
}

#[derive(Deserialize)]
struct RecordView {
    question: String,
    options: Vec<QuizOption>,
    #[serde(rename = "correctIndex")]
    correct_index: usize,
    #[serde(default)]
    code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    explanation: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    hint: String,
}

impl<'de> Deserialize<'de> for QuestionRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = Map::<String, Value>::deserialize(deserializer)?;
        let view: RecordView =
            serde_json::from_value(Value::Object(source.clone())).map_err(D::Error::custom)?;
        Ok(Self {
            question: view.question,
            options: view.options,
            correct_index: view.correct_index,
            code: view.code,
            explanation: view.explanation,
            hint: view.hint,
            source,
        })
    }
}

impl Serialize for QuestionRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = if self.source.is_empty() {
            self.typed_object().map_err(serde::ser::Error::custom)?
        } else {
            self.source.clone()
        };
        set_text(&mut map, "explanation", &self.explanation);
        set_text(&mut map, "hint", &self.hint);
        map.serialize(serializer)
    }
}

impl PartialEq for QuestionRecord {
    fn eq(&self, other: &Self) -> bool {
        self.question == other.question
            && self.options == other.options
            && self.correct_index == other.correct_index
            && self.code == other.code
            && self.explanation == other.explanation
            && self.hint == other.hint
    }
}

impl QuestionRecord {
    /// 代码片段（缺省为空串）
    pub fn code(&self) -> &str {
        self.code.as_deref().unwrap_or_default()
    }

    pub fn has_explanation(&self) -> bool {
        !self.explanation.trim().is_empty()
    }

    pub fn has_hint(&self) -> bool {
        !self.hint.trim().is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.has_explanation() && self.has_hint()
    }

    /// 是否需要补全 explanation / hint
    pub fn needs_enrichment(&self, force_all: bool) -> bool {
        force_all || !self.is_complete()
    }

    /// 正确选项，`correctIndex` 越界时返回 `None`
    pub fn correct_option(&self) -> Option<&QuizOption> {
        self.options.get(self.correct_index)
    }

    fn typed_object(&self) -> serde_json::Result<Map<String, Value>> {
        let mut map = Map::new();
        map.insert("question".to_string(), Value::String(self.question.clone()));
        map.insert("options".to_string(), serde_json::to_value(&self.options)?);
        map.insert("correctIndex".to_string(), Value::from(self.correct_index));
        if let Some(code) = &self.code {
            map.insert("code".to_string(), Value::String(code.clone()));
        }
        Ok(map)
    }
}

// 文本没变时保留原值（例如 `null`），否则就地替换，缺失时追加到末尾
fn set_text(map: &mut Map<String, Value>, key: &str, text: &str) {
    if map.get(key).map(value_text).as_deref() == Some(text) {
        return;
    }
    map.insert(key.to_string(), Value::String(text.to_string()));
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 模型返回的单条补全结果
///
/// `index` 是题目在本组内的位置（从 0 开始）。缺失的字段视为模型放弃回答。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EnrichmentItem {
    #[serde(default, deserialize_with = "deserialize_local_index")]
    pub index: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub explanation: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub hint: String,
}

impl EnrichmentItem {
    /// 校验组内索引，越界或缺失时返回 `None`
    pub fn local_index(&self, group_size: usize) -> Option<usize> {
        let index = usize::try_from(self.index?).ok()?;
        (index < group_size).then_some(index)
    }
}

// 模型偶尔会把索引写成字符串或浮点数
fn deserialize_local_index<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

// 非字符串的值按文本处理，null 视为空
fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(value_text).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_defaults_for_missing_fields() {
        let record: QuestionRecord = serde_json::from_value(json!({
            "question": "Che cos'è un semaforo?",
            "options": [{"text": "A", "image": ""}, {"text": "B"}],
            "correctIndex": 1
        }))
        .unwrap();

        assert_eq!(record.code(), "");
        assert_eq!(record.explanation, "");
        assert_eq!(record.hint, "");
        assert!(record.needs_enrichment(false));
        assert_eq!(record.correct_option().unwrap().text, "B");
    }

    #[test]
    fn test_record_keeps_unknown_fields() {
        let input = json!({
            "question": "Q",
            "options": [{"text": "A", "image": "a.png", "weight": 2}],
            "correctIndex": 0,
            "explanation": "E",
            "hint": "H",
            "topic": "os"
        });
        let record: QuestionRecord = serde_json::from_value(input.clone()).unwrap();
        let output = serde_json::to_value(&record).unwrap();

        assert_eq!(output, input);
    }

    #[test]
    fn test_null_values_survive_rewrite() {
        let input = json!({
            "question": "Q",
            "options": [{"text": "A", "image": null}],
            "correctIndex": 0,
            "code": null,
            "explanation": null,
            "hint": ""
        });
        let mut record: QuestionRecord = serde_json::from_value(input).unwrap();
        assert_eq!(record.explanation, "");
        record.hint = "H".to_string();

        let output = serde_json::to_value(&record).unwrap();
        assert_eq!(output["options"][0]["image"], Value::Null);
        assert_eq!(output["code"], Value::Null);
        assert_eq!(output["explanation"], Value::Null);
        assert_eq!(output["hint"], "H");
        assert!(output.as_object().unwrap().contains_key("code"));
        assert!(output["options"][0].as_object().unwrap().contains_key("image"));
    }

    #[test]
    fn test_rewrite_keeps_key_order() {
        let raw = r#"{"question":"Q","code":"x = 1","options":[{"image":"a.png","text":"A"}],"hint":"","explanation":"","correctIndex":0}"#;
        let mut record: QuestionRecord = serde_json::from_str(raw).unwrap();
        record.explanation = "E".to_string();
        record.hint = "H".to_string();

        let output = serde_json::to_string(&record).unwrap();
        assert_eq!(
            output,
            r#"{"question":"Q","code":"x = 1","options":[{"image":"a.png","text":"A"}],"hint":"H","explanation":"E","correctIndex":0}"#
        );
    }

    #[test]
    fn test_missing_fields_appended_on_write() {
        let mut record: QuestionRecord = serde_json::from_value(json!({
            "question": "Q",
            "options": [{"text": "A"}],
            "correctIndex": 0
        }))
        .unwrap();
        record.explanation = "E".to_string();

        let output = serde_json::to_string(&record).unwrap();
        assert!(output.ends_with(r#""correctIndex":0,"explanation":"E","hint":""}"#));
    }

    #[test]
    fn test_whitespace_only_counts_as_missing() {
        let record = QuestionRecord {
            explanation: "   ".to_string(),
            hint: "ok".to_string(),
            ..Default::default()
        };
        assert!(!record.has_explanation());
        assert!(record.has_hint());
        assert!(record.needs_enrichment(false));
    }

    #[test]
    fn test_force_marks_complete_record() {
        let record = QuestionRecord {
            explanation: "E".to_string(),
            hint: "H".to_string(),
            ..Default::default()
        };
        assert!(!record.needs_enrichment(false));
        assert!(record.needs_enrichment(true));
    }

    #[test]
    fn test_item_local_index_bounds() {
        let item: EnrichmentItem = serde_json::from_value(json!({"index": 2})).unwrap();
        assert_eq!(item.local_index(3), Some(2));
        assert_eq!(item.local_index(2), None);

        let negative: EnrichmentItem = serde_json::from_value(json!({"index": -1})).unwrap();
        assert_eq!(negative.local_index(3), None);

        let missing: EnrichmentItem = serde_json::from_value(json!({"hint": "h"})).unwrap();
        assert_eq!(missing.local_index(3), None);

        let text: EnrichmentItem = serde_json::from_value(json!({"index": "1"})).unwrap();
        assert_eq!(text.local_index(3), Some(1));
    }

    #[test]
    fn test_item_missing_fields_default_to_empty() {
        let item: EnrichmentItem =
            serde_json::from_value(json!({"index": 0, "explanation": null})).unwrap();
        assert_eq!(item.explanation, "");
        assert_eq!(item.hint, "");
    }
}
