//! Résumé document model: `meta` descriptors plus the `data` content tree.
//!
//! Every field below the top level is optional. Section builders decide what a
//! missing field means (usually: drop the section), so a hand-edited document with
//! a gap still renders everything else.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Top-level loaded document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub meta: Meta,
    pub data: CvData,
}

/// Document-level descriptors. Not rendered directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, deserialize_with = "text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub locale: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub lang: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub language: Option<String>,
    /// Any JSON value; interpreted with JavaScript truthiness.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<Value>,
}

impl Meta {
    /// First non-empty of `locale`, `lang`, `language`.
    pub fn declared_locale(&self) -> Option<&str> {
        [&self.locale, &self.lang, &self.language]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.trim().is_empty())
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.as_ref().is_some_and(is_truthy)
    }
}

/// The person-describing content tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvData {
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub bio: Option<String>,
    /// Summary paragraph shown under the header.
    #[serde(default, deserialize_with = "text")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub profile_picture: Option<String>,
    pub links: Option<Vec<IconLink>>,
    pub contact: Option<Vec<IconLink>>,
    pub education: Option<Vec<Education>>,
    pub experience: Option<Vec<Experience>>,
    pub skills: Option<Vec<SkillGroup>>,
    pub projects: Option<Vec<Project>>,
    pub awards: Option<Vec<Award>>,
    pub languages: Option<Vec<SpokenLanguage>>,
    pub footer: Option<Footer>,
    /// Number (`0.9`) or percentage string (`"90%"`).
    pub zoom: Option<Value>,
    #[serde(default, deserialize_with = "text")]
    pub grid_template_columns: Option<String>,
}

impl CvData {
    /// Effective zoom factor, or `None` when absent, unparseable, zero or exactly 1.
    pub fn zoom_factor(&self) -> Option<f64> {
        let factor = match self.zoom.as_ref()? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) if s.contains('%') => parse_float_prefix(s)? / 100.0,
            Value::String(s) => parse_float_prefix(s)?,
            _ => return None,
        };
        (factor.is_finite() && factor != 0.0 && factor != 1.0).then_some(factor)
    }
}

/// Entry of the `links` or `contact` lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IconLink {
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default, deserialize_with = "text")]
    pub institution: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub years: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub degree: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub mention: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub specialization: Option<String>,
    #[serde(default, deserialize_with = "text_list")]
    pub skills: Option<Vec<String>>,
    #[serde(default, deserialize_with = "text")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default, deserialize_with = "text")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "text_list")]
    pub tasks: Option<Vec<String>>,
    #[serde(default, deserialize_with = "text")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillGroup {
    #[serde(default, deserialize_with = "text")]
    pub title: Option<String>,
    pub skill_list: Option<Vec<Skill>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Award {
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub achievement: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpokenLanguage {
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub proficiency: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub certificate: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Footer {
    #[serde(default, deserialize_with = "text")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub text: Option<String>,
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text leaves accept any JSON scalar and keep its display form (`2020` → `"2020"`).
/// Arrays and objects count as absent.
fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(scalar_text))
}

/// Lists of text leaves; non-scalar items are dropped.
fn text_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Some(items.into_iter().filter_map(scalar_text).collect()),
        Some(other) => scalar_text(other).map(|s| vec![s]),
        None => None,
    })
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Parses the longest leading decimal number, ignoring leading whitespace
/// (`"90%"` → 90.0, `" 1.5x"` → 1.5).
fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    s[..end].parse().ok()
}
