//! Locates the value of a named field within the text of a document.
//!
//! Each known field name maps to a [FieldRule]: a case-insensitive pattern
//! that is searched across the whole text, the capture group holding the
//! value, and how the raw value is tidied afterwards. Field names without a
//! rule use [FieldRule::generic], which expects the field name as a label,
//! followed by separators and the value up to the end of that line.

use std::{collections::HashMap, fmt::Display, sync::LazyLock};

use lazy_regex::{
    regex,
    regex::{Regex, RegexBuilder},
};
use serde::{Deserialize, Serialize};


/// Currency marker removed from matched values.
pub const CURRENCY_MARKER: &str = "R$";

/// Label that starts trailing text that is never part of a value.
pub const TERMINATOR: &str = "Base:";

const NOME: &str = "Nome";
const PIS: &str = "PIS/PASEP/NIT";
const VALOR_BASE_RESCISORIOS: &str = "Valor Base para Fins Rescisorios";

static BUILTIN_RULES: LazyLock<FieldRules> = LazyLock::new(FieldRules::builtin);

/// Outcome of looking up one field within one document.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldValue {
    /// The field was located. The value may legitimately be empty.
    Found(String),
    /// No occurrence of the field was located.
    NotFound,
}

impl FieldValue {
    /// Returns the located value, if any.
    pub fn as_found(&self) -> Option<&str> {
        match self {
            FieldValue::Found(value) => Some(value),
            FieldValue::NotFound => None,
        }
    }

    /// Returns the located value, or `placeholder` when not found.
    pub fn or_placeholder<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.as_found().unwrap_or(placeholder)
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Found(value) => write!(f, "{value:?}"),
            FieldValue::NotFound => f.write_str("<not found>"),
        }
    }
}

/// Tidying applied to the raw text captured by a [FieldRule].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PostProcess {
    /// Applies [clean_value].
    Clean,
    /// Only trims surrounding whitespace.
    Trim,
}

impl PostProcess {
    fn apply(self, raw: &str) -> String {
        match self {
            PostProcess::Clean => clean_value(raw),
            PostProcess::Trim => raw.trim().to_string(),
        }
    }
}

/// Error in a user supplied field rule.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("invalid pattern for field {field:?}")]
    InvalidPattern {
        field: String,
        #[source]
        source: lazy_regex::regex::Error,
    },
    #[error("pattern for field {field:?} has no capture group {group} (it has {available})")]
    GroupOutOfRange {
        field: String,
        group: usize,
        available: usize,
    },
}

/// How to locate a single field's value.
#[derive(Clone, Debug)]
pub struct FieldRule {
    pattern: Regex,
    value_group: usize,
    post_process: PostProcess,
}

impl FieldRule {
    /// Creates a rule, checking that `value_group` exists in `pattern`.
    pub fn new(
        field: &str,
        pattern: Regex,
        value_group: usize,
        post_process: PostProcess,
    ) -> Result<Self, RuleError> {
        // captures_len includes the implicit whole-match group 0.
        let available = pattern.captures_len() - 1;
        if value_group == 0 || value_group > available {
            return Err(RuleError::GroupOutOfRange {
                field: field.to_string(),
                group: value_group,
                available,
            });
        }
        Ok(Self {
            pattern,
            value_group,
            post_process,
        })
    }

    /// Rule for a field with no dedicated rule: the literal field name, any
    /// run of colons or whitespace, then the rest of the line.
    pub fn generic(field: &str) -> Result<Self, RuleError> {
        let source = format!(r"{}[:\s]*([^\n]+)", lazy_regex::regex::escape(field));
        Self::from_pattern(field, &source, 1, PostProcess::Clean)
    }

    /// Compiles a rule from a textual pattern, matched case-insensitively.
    pub fn from_pattern(
        field: &str,
        pattern: &str,
        value_group: usize,
        post_process: PostProcess,
    ) -> Result<Self, RuleError> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| RuleError::InvalidPattern {
                field: field.to_string(),
                source,
            })?;
        Self::new(field, pattern, value_group, post_process)
    }

    /// Searches the whole of `text` for the field's value.
    pub fn find(&self, text: &str) -> FieldValue {
        self.pattern
            .captures(text)
            .and_then(|captures| captures.get(self.value_group))
            .map(|value| FieldValue::Found(self.post_process.apply(value.as_str())))
            .unwrap_or(FieldValue::NotFound)
    }
}

/// Serialisable description of a [FieldRule], as written in configuration.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RuleSpec {
    /// Regular expression, matched case-insensitively.
    pub pattern: String,
    /// Capture group holding the value.
    #[serde(default = "RuleSpec::default_group")]
    pub group: usize,
    /// Whether [clean_value] applies to the value, rather than a trim.
    #[serde(default = "RuleSpec::default_clean")]
    pub clean: bool,
}

impl RuleSpec {
    fn default_group() -> usize {
        1
    }

    fn default_clean() -> bool {
        true
    }

    /// Compiles into a [FieldRule] for `field`.
    pub fn compile(&self, field: &str) -> Result<FieldRule, RuleError> {
        let post_process = if self.clean {
            PostProcess::Clean
        } else {
            PostProcess::Trim
        };
        FieldRule::from_pattern(field, &self.pattern, self.group, post_process)
    }
}

/// Table of dedicated rules keyed by exact field name.
#[derive(Clone, Debug, Default)]
pub struct FieldRules {
    rules: HashMap<String, FieldRule>,
}

impl FieldRules {
    /// Table holding the rules for the known payroll statement fields.
    pub fn builtin() -> Self {
        let mut rules = Self::default();
        rules.insert(
            NOME,
            FieldRule {
                pattern: Regex::clone(regex!(r"(?i)Nome[:\s]*([^\n]+)")),
                value_group: 1,
                post_process: PostProcess::Clean,
            },
        );
        // Group 1 is whichever of the two label variants appeared.
        rules.insert(
            PIS,
            FieldRule {
                pattern: Regex::clone(regex!(r"(?i)(PIS/PASEP/NIT|PIS)[:\s]*([\d\.\-/]+)")),
                value_group: 2,
                post_process: PostProcess::Clean,
            },
        );
        // The amount may be followed by qualifying text, up to a "Base:" label
        // or the end of the line. Only a "Base:" label may be on a later line.
        rules.insert(
            VALOR_BASE_RESCISORIOS,
            FieldRule {
                pattern: Regex::clone(regex!(
                    r"(?i)Valor Base para Fins :\s*(R\$\s*[\d\.,]+[^\S\n]*.*?)(?:\s*Base:|(?m:$))"
                )),
                value_group: 1,
                post_process: PostProcess::Clean,
            },
        );
        rules
    }

    /// Adds or replaces the rule for `field`.
    pub fn insert(&mut self, field: &str, rule: FieldRule) {
        self.rules.insert(field.to_string(), rule);
    }

    /// Builtin rules, extended or overridden by the given specs.
    pub fn with_specs<'a, I>(specs: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = (&'a String, &'a RuleSpec)>,
    {
        let mut rules = Self::builtin();
        for (field, spec) in specs {
            rules.insert(field, spec.compile(field)?);
        }
        Ok(rules)
    }

    /// Returns the rule to use for `field`.
    pub fn rule_for(&self, field: &str) -> Result<FieldRule, RuleError> {
        match self.rules.get(field) {
            Some(rule) => Ok(rule.clone()),
            None => FieldRule::generic(field),
        }
    }

    /// Looks up `field` within `text`. Fails only if `field` has no rule and
    /// the generic rule for it cannot be compiled.
    pub fn find(&self, text: &str, field: &str) -> Result<FieldValue, RuleError> {
        Ok(self.rule_for(field)?.find(text))
    }
}

/// Looks up `field` within `text` using the builtin rules.
pub fn match_field(text: &str, field: &str) -> FieldValue {
    // Only an escaped name over the regex size limit fails to compile.
    BUILTIN_RULES
        .find(text, field)
        .unwrap_or(FieldValue::NotFound)
}

/// Removes every currency marker, then truncates at the first terminator
/// label, trimming surrounding whitespace.
///
/// Applying this to its own output returns that output unchanged.
pub fn clean_value(value: &str) -> String {
    let mut value = value.to_string();
    // Removal can splice a new marker together (e.g. "RR$$").
    while value.contains(CURRENCY_MARKER) {
        value = value.replace(CURRENCY_MARKER, "");
    }
    let value = value.trim();
    match value.find(TERMINATOR) {
        Some(index) => value[..index].trim().to_string(),
        None => value.to_string(),
    }
}
