//! Closed vocabularies accepted by the GeoIP service.
//!
//! # Design
//! Every value the service understands is an enum variant; parsing from a
//! caller's string is the only place a typo can surface, and it surfaces as a
//! `ValidationError` naming the offending value. Parsing is exact-case: `en`
//! is not a language and `Location` is not a module.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A feature module that can be requested alongside a lookup.
///
/// The IP lookup and country operations accept different subsets; see
/// `Operation::vocabulary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    Location,
    Security,
    Timezone,
    Currency,
    Device,
    Language,
    Flag,
}

impl Module {
    pub fn as_str(self) -> &'static str {
        match self {
            Module::Location => "location",
            Module::Security => "security",
            Module::Timezone => "timezone",
            Module::Currency => "currency",
            Module::Device => "device",
            Module::Language => "language",
            Module::Flag => "flag",
        }
    }
}

impl FromStr for Module {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "location" => Ok(Module::Location),
            "security" => Ok(Module::Security),
            "timezone" => Ok(Module::Timezone),
            "currency" => Ok(Module::Currency),
            "device" => Ok(Module::Device),
            "language" => Ok(Module::Language),
            "flag" => Ok(Module::Flag),
            other => Err(ValidationError::InvalidModule(other.to_string())),
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which remote operation a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    IpLookup,
    Country,
}

const IP_LOOKUP_MODULES: &[Module] = &[
    Module::Location,
    Module::Security,
    Module::Timezone,
    Module::Currency,
    Module::Device,
];

const COUNTRY_MODULES: &[Module] = &[
    Module::Language,
    Module::Flag,
    Module::Currency,
    Module::Timezone,
];

impl Operation {
    /// Path appended to the endpoint.
    pub fn path(self) -> &'static str {
        match self {
            Operation::IpLookup => "IPLookup",
            Operation::Country => "Country",
        }
    }

    /// Query parameter carrying the subject.
    pub fn subject_param(self) -> &'static str {
        match self {
            Operation::IpLookup => "ip",
            Operation::Country => "CountryCode",
        }
    }

    /// Name of the subject argument, used in error messages.
    pub fn subject_name(self) -> &'static str {
        match self {
            Operation::IpLookup => "ip",
            Operation::Country => "countryCode",
        }
    }

    pub fn vocabulary(self) -> &'static [Module] {
        match self {
            Operation::IpLookup => IP_LOOKUP_MODULES,
            Operation::Country => COUNTRY_MODULES,
        }
    }

    pub fn accepts(self, module: Module) -> bool {
        self.vocabulary().contains(&module)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Output language of the response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    #[default]
    En,
    Ar,
    De,
    Fr,
    Es,
    Ja,
    Zh,
    Ru,
}

impl Language {
    pub const ALL: [Language; 8] = [
        Language::En,
        Language::Ar,
        Language::De,
        Language::Fr,
        Language::Es,
        Language::Ja,
        Language::Zh,
        Language::Ru,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "EN",
            Language::Ar => "AR",
            Language::De => "DE",
            Language::Fr => "FR",
            Language::Es => "ES",
            Language::Ja => "JA",
            Language::Zh => "ZH",
            Language::Ru => "RU",
        }
    }
}

impl FromStr for Language {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidLanguage(s.to_string()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Test` asks the service for fake data that does not count against the plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Live,
    Test,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Live => "live",
            Mode::Test => "test",
        }
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "live" => Ok(Mode::Live),
            "test" => Ok(Mode::Test),
            other => Err(ValidationError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
