//! Front-matter parsing

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};

use super::document::{Difficulty, DocId};
use crate::error::{Error, Result};
use crate::helpers::parse_date_string;

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect())
        }

        fn visit_seq<S>(self, mut seq: S) -> std::result::Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Metadata block of a content file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<DocId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// LeetCode solutions historically used the short `diff` key
    #[serde(alias = "diff", skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(
        deserialize_with = "string_or_vec",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Additional custom fields, in file order
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Delimiter line that opens and closes a metadata block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fence {
    Yaml,
    Toml,
}

impl Fence {
    fn marker(self) -> &'static str {
        match self {
            Fence::Yaml => "---",
            Fence::Toml => "+++",
        }
    }

    fn detect(line: &str) -> Option<Self> {
        match line.trim_end() {
            "---" => Some(Fence::Yaml),
            "+++" => Some(Fence::Toml),
            _ => None,
        }
    }
}

impl FrontMatter {
    /// Split a content file into front-matter and body.
    ///
    /// The metadata block must start on the first line. A file without one
    /// yields empty front-matter and the whole text as body.
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let first_line_end = content.find('\n').map(|i| i + 1).unwrap_or(content.len());
        let Some(fence) = Fence::detect(&content[..first_line_end]) else {
            return Ok((FrontMatter::default(), content));
        };

        let rest = &content[first_line_end..];
        let mut offset = 0;
        for line in rest.split_inclusive('\n') {
            if Fence::detect(line) == Some(fence) {
                let block = &rest[..offset];
                let body = rest[offset + line.len()..].trim_start_matches(['\n', '\r']);
                let fm = Self::from_block(block, fence)?;
                return Ok((fm, body));
            }
            offset += line.len();
        }

        Err(Error::malformed(format!(
            "block opened with `{}` is never closed",
            fence.marker()
        )))
    }

    fn from_block(block: &str, fence: Fence) -> Result<Self> {
        let mapping = match fence {
            Fence::Yaml => parse_yaml_mapping(block)?,
            Fence::Toml => parse_toml_mapping(block)?,
        };

        serde_yaml::from_value(Value::Mapping(mapping)).map_err(|e| Error::malformed(e.to_string()))
    }

    /// Serialize back into a `---` delimited YAML block, including the
    /// trailing newline after the closing fence.
    pub fn to_block(&self) -> Result<String> {
        if *self == FrontMatter::default() {
            return Ok("---\n---\n".to_string());
        }
        let yaml = serde_yaml::to_string(self).map_err(|e| Error::malformed(e.to_string()))?;
        Ok(format!("---\n{}---\n", yaml))
    }

    /// Parse the date string into a DateTime
    pub fn parse_date(&self) -> Option<chrono::DateTime<chrono::Local>> {
        self.date.as_deref().and_then(parse_date_string)
    }

    /// Get a custom field as a string
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

fn parse_yaml_mapping(block: &str) -> Result<Mapping> {
    if block.trim().is_empty() {
        return Ok(Mapping::new());
    }

    match serde_yaml::from_str::<Value>(block) {
        Ok(Value::Mapping(map)) => Ok(map),
        // A block with only comments
        Ok(Value::Null) => Ok(Mapping::new()),
        Ok(other) => Err(Error::malformed(format!(
            "expected a mapping of keys to values, found {}",
            value_kind(&other)
        ))),
        Err(e) => Err(Error::malformed(e.to_string())),
    }
}

fn parse_toml_mapping(block: &str) -> Result<Mapping> {
    let table: toml::Table = block
        .parse()
        .map_err(|e: toml::de::Error| Error::malformed(e.message().to_string()))?;

    Ok(table
        .into_iter()
        .map(|(k, v)| (Value::String(k), toml_to_yaml(v)))
        .collect())
}

/// Convert TOML values into the YAML value model; datetimes become strings
fn toml_to_yaml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => Value::Number(f.into()),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Sequence(items.into_iter().map(toml_to_yaml).collect()),
        toml::Value::Table(table) => Value::Mapping(
            table
                .into_iter()
                .map(|(k, v)| (Value::String(k), toml_to_yaml(v)))
                .collect(),
        ),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
