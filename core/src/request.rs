//! Validation and query assembly shared by both operations.
//!
//! # Design
//! `LookupRequest` can only be constructed through `validate` (loose string
//! input) or `new` (typed input); both enforce the same invariants, so a
//! value of this type is always safe to send. The operation decides the
//! module vocabulary, the path, and the name of the subject parameter.

use url::form_urlencoded;

use crate::config::{ClientConfig, SOURCE_TAG};
use crate::error::ValidationError;
use crate::types::{Language, Mode, Module, Operation};

/// A validated request for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    operation: Operation,
    subject: String,
    modules: Vec<Module>,
    language: Language,
    mode: Mode,
}

impl LookupRequest {
    /// Validate caller input in fail-fast order: subject, modules, language,
    /// mode. Empty module entries are skipped.
    pub fn validate<S: AsRef<str>>(
        operation: Operation,
        subject: &str,
        modules: &[S],
        language: &str,
        mode: &str,
    ) -> Result<Self, ValidationError> {
        require_subject(operation, subject)?;
        let modules = parse_modules(operation, modules)?;
        let language = language.parse()?;
        let mode = mode.parse()?;
        Ok(Self {
            operation,
            subject: subject.to_string(),
            modules,
            language,
            mode,
        })
    }

    /// Typed constructor. Still rejects an empty subject and modules from the
    /// other operation's vocabulary.
    pub fn new(
        operation: Operation,
        subject: &str,
        modules: Vec<Module>,
        language: Language,
        mode: Mode,
    ) -> Result<Self, ValidationError> {
        require_subject(operation, subject)?;
        if let Some(module) = modules.iter().find(|m| !operation.accepts(**m)) {
            return Err(ValidationError::InvalidModule(module.as_str().to_string()));
        }
        Ok(Self {
            operation,
            subject: subject.to_string(),
            modules,
            language,
            mode,
        })
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Modules joined with `,` in the order given. No sorting, no dedup.
    pub fn params_token(&self) -> String {
        self.modules
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Query parameters in the order the service clients send them.
    pub fn query_pairs(&self, api_key: &str) -> Vec<(&'static str, String)> {
        let subject = (self.operation.subject_param(), self.subject.clone());
        let lang = ("lang", self.language.as_str().to_string());
        let params = ("params", self.params_token());
        let (first, second) = match self.operation {
            Operation::IpLookup => (lang, params),
            Operation::Country => (params, lang),
        };
        vec![
            ("key", api_key.to_string()),
            subject,
            first,
            second,
            ("mode", self.mode.as_str().to_string()),
            ("source", SOURCE_TAG.to_string()),
        ]
    }

    /// Percent-encoded query string (`application/x-www-form-urlencoded`).
    pub fn query_string(&self, api_key: &str) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs(api_key))
            .finish()
    }

    /// Full GET URL against `config`'s endpoint, using its stored key.
    pub fn to_url(&self, config: &ClientConfig) -> String {
        format!(
            "{}?{}",
            config.url_for(self.operation.path()),
            self.query_string(config.api_key())
        )
    }
}

fn require_subject(operation: Operation, subject: &str) -> Result<(), ValidationError> {
    if subject.is_empty() {
        return Err(ValidationError::MissingSubject {
            field: operation.subject_name(),
        });
    }
    Ok(())
}

fn parse_modules<S: AsRef<str>>(
    operation: Operation,
    raw: &[S],
) -> Result<Vec<Module>, ValidationError> {
    let mut modules = Vec::with_capacity(raw.len());
    for entry in raw.iter().map(AsRef::as_ref).filter(|e| !e.is_empty()) {
        let module: Module = entry.parse()?;
        if !operation.accepts(module) {
            return Err(ValidationError::InvalidModule(entry.to_string()));
        }
        modules.push(module);
    }
    Ok(modules)
}
