//! Request validation from declared field rules.

use crate::error::ConfigError;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// One check applied to a single field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    Required,
    String,
    Max(usize),
    Min(usize),
}

impl Rule {
    /// Rule name as written in the pipe syntax (`max`, not `max:255`).
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::String => "string",
            Rule::Max(_) => "max",
            Rule::Min(_) => "min",
        }
    }

    /// Parse `"required|string|max:255"` into rules, in order.
    pub fn parse_list(s: &str) -> Result<Vec<Rule>, ConfigError> {
        s.split('|')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(Rule::from_str)
            .collect()
    }
}

impl FromStr for Rule {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match s.split_once(':') {
            Some((n, a)) => (n, Some(a)),
            None => (s, None),
        };
        let bound = |arg: Option<&str>| -> Result<usize, ConfigError> {
            arg.and_then(|a| a.trim().parse().ok())
                .ok_or_else(|| ConfigError::Invalid {
                    key: "rule",
                    message: format!("'{}' needs a numeric argument", s),
                })
        };
        match name.trim().to_ascii_lowercase().as_str() {
            "required" => Ok(Rule::Required),
            "string" => Ok(Rule::String),
            "max" => Ok(Rule::Max(bound(arg)?)),
            "min" => Ok(Rule::Min(bound(arg)?)),
            other => Err(ConfigError::Invalid {
                key: "rule",
                message: format!("unknown rule '{}'", other),
            }),
        }
    }
}

/// Field name to rule list, checked in declaration order.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    fields: Vec<(String, Vec<Rule>)>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.fields.push((name.into(), rules.into_iter().collect()));
        self
    }

    /// Build from `(field, "required|max:255")` pairs.
    pub fn parse<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self, ConfigError> {
        let mut set = RuleSet::new();
        for (field, rules) in pairs {
            set = set.field(field, Rule::parse_list(rules)?);
        }
        Ok(set)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub rule: &'static str,
    pub message: String,
}

/// Every failed rule, keyed by field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<Violation>>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn add(&mut self, field: &str, rule: &Rule, message: String) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(Violation { rule: rule.name(), message });
    }

    pub fn get(&self, field: &str) -> Option<&[Violation]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Names of the rules a field violated.
    pub fn rules_for(&self, field: &str) -> Vec<&'static str> {
        self.get(field)
            .map(|v| v.iter().map(|x| x.rule).collect())
            .unwrap_or_default()
    }

    /// Field to messages, the shape the form templates expect.
    pub fn messages(&self) -> BTreeMap<&str, Vec<&str>> {
        self.fields
            .iter()
            .map(|(f, v)| (f.as_str(), v.iter().map(|x| x.message.as_str()).collect()))
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for violations in self.fields.values() {
            for v in violations {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(&v.message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Trim strings and turn blank strings into null, so `"  "` counts as missing.
pub fn normalize_input(body: HashMap<String, Value>) -> HashMap<String, Value> {
    body.into_iter()
        .map(|(k, v)| {
            let v = match v {
                Value::String(s) => {
                    let t = s.trim();
                    if t.is_empty() {
                        Value::Null
                    } else if t.len() == s.len() {
                        Value::String(s)
                    } else {
                        Value::String(t.to_string())
                    }
                }
                other => other,
            };
            (k, v)
        })
        .collect()
}

pub struct RequestValidator;

impl RequestValidator {
    /// Validate body against every field rule. Collects all violations.
    pub fn validate(body: &HashMap<String, Value>, rules: &RuleSet) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        for (field, field_rules) in &rules.fields {
            let Some(v) = body.get(field).filter(|v| !v.is_null()) else {
                if let Some(rule) = field_rules.iter().find(|r| **r == Rule::Required) {
                    errors.add(field, rule, format!("The {} field is required.", label(field)));
                }
                continue;
            };
            for rule in field_rules {
                if let Some(message) = check(field, v, rule) {
                    errors.add(field, rule, message);
                }
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn label(field: &str) -> String {
    field.replace('_', " ")
}

fn check(field: &str, v: &Value, rule: &Rule) -> Option<String> {
    match rule {
        Rule::Required => None,
        Rule::String => match v.as_str() {
            None => Some(format!("The {} field must be a string.", label(field))),
            // PostgreSQL TEXT cannot store U+0000
            Some(s) if s.contains('\0') => {
                Some(format!("The {} field must not contain null characters.", label(field)))
            }
            Some(_) => None,
        },
        Rule::Max(max) => {
            let len = v.as_str()?.chars().count();
            (len > *max).then(|| {
                format!("The {} field must not be greater than {} characters.", label(field), max)
            })
        }
        Rule::Min(min) => {
            let len = v.as_str()?.chars().count();
            (len < *min).then(|| format!("The {} field must be at least {} characters.", label(field), min))
        }
    }
}
