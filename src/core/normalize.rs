//! 將後端各種形狀的列表回應轉成固定的紀錄型別。
//!
//! 判斷順序：根節點本身是陣列 → 依優先序檢查包裝欄位（如 `teachers`、`data`）
//! → 都不符合時回傳空序列。正規化本身永遠不會失敗。

use crate::domain::model::{Allotment, Course, CourseSummary, Teacher};
use serde_json::{Map, Value};

/// 回應的外層形狀
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload<'a> {
    Bare(&'a [Value]),
    Wrapped {
        key: &'static str,
        items: &'a [Value],
    },
    Unrecognized,
}

impl<'a> Payload<'a> {
    pub fn classify(raw: &'a Value, wrapper_keys: &[&'static str]) -> Self {
        match raw {
            Value::Array(items) => Payload::Bare(items),
            Value::Object(obj) => wrapper_keys
                .iter()
                .find_map(|key| match obj.get(*key) {
                    Some(Value::Array(items)) => Some(Payload::Wrapped { key: *key, items }),
                    _ => None,
                })
                .unwrap_or(Payload::Unrecognized),
            _ => Payload::Unrecognized,
        }
    }

    pub fn entries(&self) -> &'a [Value] {
        match *self {
            Payload::Bare(items) | Payload::Wrapped { items, .. } => items,
            Payload::Unrecognized => &[],
        }
    }
}

pub trait Normalize: Sized {
    const ENTITY: &'static str;
    const WRAPPER_KEYS: &'static [&'static str];

    /// `index` 是原始陣列中的位置，用於合成缺少的識別值
    fn from_entry(index: usize, entry: &Map<String, Value>) -> Option<Self>;
}

pub fn normalize<T: Normalize>(raw: &Value) -> Vec<T> {
    let payload = Payload::classify(raw, T::WRAPPER_KEYS);
    match payload {
        Payload::Bare(items) => {
            tracing::debug!("📥 {}: bare array with {} entries", T::ENTITY, items.len())
        }
        Payload::Wrapped { key, items } => {
            tracing::debug!("📥 {}: '{}' wrapper with {} entries", T::ENTITY, key, items.len())
        }
        Payload::Unrecognized => {
            tracing::warn!("📥 {}: unrecognized payload shape, using empty list", T::ENTITY)
        }
    }

    let entries = payload.entries();
    let records: Vec<T> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| entry.as_object().and_then(|obj| T::from_entry(index, obj)))
        .collect();

    if records.len() < entries.len() {
        tracing::debug!(
            "📥 {}: dropped {} entries without a usable identifier",
            T::ENTITY,
            entries.len() - records.len()
        );
    }
    records
}

impl Normalize for Teacher {
    const ENTITY: &'static str = "teachers";
    const WRAPPER_KEYS: &'static [&'static str] = &["teachers", "users", "data"];

    fn from_entry(index: usize, entry: &Map<String, Value>) -> Option<Self> {
        let email = first_string(entry, &["email", "user_email"])
            .unwrap_or_else(|| format!("teacher{}@example.com", index));

        let name = first_string(entry, &["name", "full_name"])
            .or_else(|| {
                let first = first_string(entry, &["first_name"]).unwrap_or_default();
                let last = first_string(entry, &["last_name"]).unwrap_or_default();
                let joined = format!("{} {}", first, last).trim().to_string();
                (!joined.is_empty()).then_some(joined)
            })
            .unwrap_or_else(|| email.clone());

        let department = first_string(entry, &["department", "dept"]).unwrap_or_default();

        Some(Teacher {
            email,
            name,
            department,
        })
    }
}

impl Normalize for Course {
    const ENTITY: &'static str = "courses";
    const WRAPPER_KEYS: &'static [&'static str] = &["courses", "data"];

    fn from_entry(_index: usize, entry: &Map<String, Value>) -> Option<Self> {
        let id = first_id(entry, &["id", "course_id", "_id"])?;
        Some(Course {
            id,
            name: first_string(entry, &["course_name", "name"]).unwrap_or_default(),
            code: first_string(entry, &["course_code", "code"]).unwrap_or_default(),
            hours: hours(entry),
        })
    }
}

impl Normalize for Allotment {
    const ENTITY: &'static str = "allotments";
    const WRAPPER_KEYS: &'static [&'static str] = &["allotments", "data"];

    fn from_entry(_index: usize, entry: &Map<String, Value>) -> Option<Self> {
        let teacher_email = first_string(entry, &["teacher_email", "email"])?;
        let teacher_name =
            first_string(entry, &["teacher_name", "name"]).unwrap_or_else(|| "Unknown".to_string());

        let courses = match entry.get("courses") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_object)
                .map(course_summary)
                .collect(),
            _ => Vec::new(),
        };

        Some(Allotment {
            teacher_name,
            teacher_email,
            courses,
        })
    }
}

fn course_summary(entry: &Map<String, Value>) -> CourseSummary {
    CourseSummary {
        name: first_string(entry, &["course_name", "name"]).unwrap_or_default(),
        code: first_string(entry, &["course_code", "code"]).unwrap_or_default(),
        hours: hours(entry),
    }
}

/// 第一個非空的字串欄位；數字也接受（例如數字型的課程代碼）
fn first_string(entry: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match entry.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn first_id(entry: &Map<String, Value>, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| match entry.get(*key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn hours(entry: &Map<String, Value>) -> u32 {
    let raw = match entry.get("hours") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(h) if h.is_finite() && h > 0.0 => h.min(u32::MAX as f64) as u32,
        _ => 0,
    }
}
