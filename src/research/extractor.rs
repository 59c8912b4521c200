//! 从模型自由文本中提取 JSON 对象

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::error::ExtractionError;

pub type JsonObject = Map<String, Value>;

/// 贪婪匹配：从第一个 `{` 到最后一个 `}`，可跨行
static JSON_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("json span pattern is valid"));

/// 结构化输出提取策略
pub trait StructuredOutputExtractor: Send + Sync {
    fn extract(&self, text: &str, required_keys: &[&str]) -> Result<JsonObject, ExtractionError>;
}

/// 默认策略：贪婪匹配第一个 `{...}` 片段，解析为 JSON 并校验必需字段
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyJsonExtractor;

impl StructuredOutputExtractor for GreedyJsonExtractor {
    fn extract(&self, text: &str, required_keys: &[&str]) -> Result<JsonObject, ExtractionError> {
        extract_json_object(text, required_keys)
    }
}

pub fn extract_json_object(
    text: &str,
    required_keys: &[&str],
) -> Result<JsonObject, ExtractionError> {
    let span = JSON_SPAN.find(text).ok_or(ExtractionError::NoJsonFound)?;

    let value: Value = serde_json::from_str(span.as_str())
        .map_err(|e| ExtractionError::ParseError(e.to_string()))?;
    let Value::Object(object) = value else {
        return Err(ExtractionError::ParseError(
            "expected a JSON object".to_string(),
        ));
    };

    if let Some(missing) = required_keys
        .iter()
        .find(|key| !has_usable_value(&object, key))
    {
        return Err(ExtractionError::MissingKey(missing.to_string()));
    }

    Ok(object)
}

/// `null` 与空白字符串视同缺失
fn has_usable_value(object: &JsonObject, key: &str) -> bool {
    match object.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

/// 读取字段文本，非字符串值按 JSON 文本输出
pub fn field_text(object: &JsonObject, key: &str) -> Option<String> {
    object.get(key).map(|value| match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
