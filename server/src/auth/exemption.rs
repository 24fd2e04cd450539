use std::fmt;

use hyper::Method;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use shared::types::server_config::ExemptionConfig;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ExemptionError {
    #[error("exemption {index}: invalid HTTP method {method:?}")]
    InvalidMethod { index: usize, method: String },

    #[error("exemption {index}: set exactly one of path or regex")]
    AmbiguousPattern { index: usize },

    #[error("exemption {index}: method list is empty")]
    NoMethods { index: usize },

    #[error("exemption {index}: pattern {pattern:?} does not compile: {source}")]
    InvalidPattern {
        index: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

// ---------------------------------------------------------------------------
// MethodSet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodSet {
    Any,
    Only(Vec<Method>),
}

impl MethodSet {
    pub fn contains(&self, method: &Method) -> bool {
        match self {
            MethodSet::Any => true,
            MethodSet::Only(methods) => methods.contains(method),
        }
    }

    fn parse(index: usize, names: &[String]) -> Result<Self, ExemptionError> {
        if names.is_empty() {
            return Err(ExemptionError::NoMethods { index });
        }

        let mut methods = Vec::with_capacity(names.len());
        for name in names {
            let name = name.trim();
            if name == "*" {
                return Ok(MethodSet::Any);
            }
            let method = Method::from_bytes(name.to_ascii_uppercase().as_bytes()).map_err(|_| {
                ExemptionError::InvalidMethod {
                    index,
                    method: name.to_string(),
                }
            })?;
            methods.push(method);
        }

        Ok(MethodSet::Only(methods))
    }
}

// ---------------------------------------------------------------------------
// ExemptionRule
// ---------------------------------------------------------------------------

/// A compiled (pattern, method set) pair.
pub struct ExemptionRule {
    source: String,
    pattern: Regex,
    methods: MethodSet,
}

impl ExemptionRule {
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.methods.contains(method) && self.pattern.is_match(path)
    }

    /// The pattern as written in the config, after `{api}` expansion.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for ExemptionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExemptionRule")
            .field("source", &self.source)
            .field("regex", &self.pattern.as_str())
            .field("methods", &self.methods)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ExemptionTable
// ---------------------------------------------------------------------------

/// Every route the gate lets through without a credential.
///
/// Built once at startup and never mutated, so it is shared between
/// connections without any locking. Rule order does not matter: a request is
/// exempt as soon as any single rule matches.
#[derive(Debug, Default)]
pub struct ExemptionTable {
    rules: Vec<ExemptionRule>,
}

impl ExemptionTable {
    /// Compile config rows into matchers. `api_prefix` replaces every
    /// `{api}` placeholder in both pattern forms.
    pub fn compile(rows: &[ExemptionConfig], api_prefix: &str) -> Result<Self, ExemptionError> {
        let mut rules = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            let methods = MethodSet::parse(index, &row.methods)?;

            let (source, regex_src) = match (&row.path, &row.regex) {
                (Some(glob), None) => {
                    let expanded = glob.replace("{api}", api_prefix);
                    let regex_src = glob_to_regex(&expanded);
                    (expanded, regex_src)
                }
                (None, Some(raw)) => {
                    let expanded = raw.replace("{api}", api_prefix);
                    let regex_src =
                        format!("^(?:{})$", raw.replace("{api}", &regex::escape(api_prefix)));
                    (expanded, regex_src)
                }
                _ => return Err(ExemptionError::AmbiguousPattern { index }),
            };

            let pattern =
                Regex::new(&regex_src).map_err(|source| ExemptionError::InvalidPattern {
                    index,
                    pattern: source_pattern(&row.path, &row.regex),
                    source,
                })?;

            debug!("Exemption {}: {} -> {}", index, source, regex_src);

            rules.push(ExemptionRule {
                source,
                pattern,
                methods,
            });
        }

        Ok(Self { rules })
    }

    pub fn is_exempt(&self, method: &Method, path: &str) -> bool {
        self.matching_rule(method, path).is_some()
    }

    /// First rule admitting the request, if any. Only used for logging; the
    /// outcome does not depend on which rule matched.
    pub fn matching_rule(&self, method: &Method, path: &str) -> Option<&ExemptionRule> {
        self.rules.iter().find(|rule| rule.matches(method, path))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn source_pattern(path: &Option<String>, regex: &Option<String>) -> String {
    path.clone().or_else(|| regex.clone()).unwrap_or_default()
}

/// Translate the glob form into an anchored regex.
///
/// - literal text is escaped and must match in full;
/// - a trailing `*` (or `/*`) matches the path itself or anything below it,
///   but never a sibling that merely shares a prefix (`/users*` does not
///   match `/usersettings`);
/// - a `*` anywhere else matches exactly one non-empty segment.
pub fn glob_to_regex(glob: &str) -> String {
    let (body, subtree) = match glob.strip_suffix('*') {
        Some(rest) => (rest.strip_suffix('/').unwrap_or(rest), true),
        None => (glob, false),
    };

    let mut out = String::with_capacity(body.len() + 16);
    out.push('^');
    for (i, part) in body.split('*').enumerate() {
        if i > 0 {
            out.push_str("[^/]+");
        }
        out.push_str(&regex::escape(part));
    }
    if subtree {
        out.push_str("(?:/.*)?");
    }
    out.push('$');
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
