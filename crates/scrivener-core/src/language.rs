// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Supported OCR languages — a fixed mapping from human-readable names to the
// engine's traineddata codes.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, ScrivenerError};

/// A language offered to the user, with the code the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub name: &'static str,
    pub code: &'static str,
}

/// Every language the pipeline accepts, in presentation order.
pub const SUPPORTED_LANGUAGES: &[Language] = &[
    Language {
        name: "English",
        code: "eng",
    },
    Language {
        name: "Spanish",
        code: "spa",
    },
    Language {
        name: "French",
        code: "fra",
    },
    Language {
        name: "German",
        code: "deu",
    },
    Language {
        name: "Chinese (Simplified)",
        code: "chi_sim",
    },
    Language {
        name: "Chinese (Traditional)",
        code: "chi_tra",
    },
    Language {
        name: "Japanese",
        code: "jpn",
    },
    Language {
        name: "Korean",
        code: "kor",
    },
    Language {
        name: "Russian",
        code: "rus",
    },
    Language {
        name: "Arabic",
        code: "ara",
    },
    Language {
        name: "Hindi",
        code: "hin",
    },
    Language {
        name: "Italian",
        code: "ita",
    },
    Language {
        name: "Portuguese",
        code: "por",
    },
    Language {
        name: "Dutch",
        code: "nld",
    },
    Language {
        name: "Turkish",
        code: "tur",
    },
    Language {
        name: "Hebrew",
        code: "heb",
    },
    Language {
        name: "Polish",
        code: "pol",
    },
    Language {
        name: "Czech",
        code: "ces",
    },
    Language {
        name: "Greek",
        code: "ell",
    },
    Language {
        name: "Thai",
        code: "tha",
    },
];

/// A validated engine language code.
///
/// Can only be constructed for members of [`SUPPORTED_LANGUAGES`], so an
/// unmapped code is rejected before any recognition work starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct LanguageCode(&'static str);

impl LanguageCode {
    /// English, the default recognition language.
    pub const ENGLISH: LanguageCode = LanguageCode("eng");

    /// Validate an engine code such as `"eng"` or `"chi_sim"`.
    pub fn parse(code: &str) -> Result<Self> {
        let wanted = code.trim();
        SUPPORTED_LANGUAGES
            .iter()
            .find(|lang| lang.code == wanted)
            .map(|lang| Self(lang.code))
            .ok_or_else(|| {
                ScrivenerError::Configuration(format!("unsupported language code `{code}`"))
            })
    }

    /// Resolve a human-readable name (case-insensitive), e.g. `"Thai"`.
    pub fn from_name(name: &str) -> Result<Self> {
        let wanted = name.trim();
        SUPPORTED_LANGUAGES
            .iter()
            .find(|lang| lang.name.eq_ignore_ascii_case(wanted))
            .map(|lang| Self(lang.code))
            .ok_or_else(|| {
                ScrivenerError::Configuration(format!("unknown language name `{name}`"))
            })
    }

    /// Accept either an engine code or a display name.
    pub fn resolve(value: &str) -> Result<Self> {
        Self::parse(value).or_else(|_| Self::from_name(value))
    }

    /// The code passed to the recognition engine.
    pub fn code(&self) -> &'static str {
        self.0
    }

    /// Human-readable name for this code.
    pub fn name(&self) -> &'static str {
        SUPPORTED_LANGUAGES
            .iter()
            .find(|lang| lang.code == self.0)
            .map(|lang| lang.name)
            .unwrap_or(self.0)
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        Self::ENGLISH
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = ScrivenerError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

// Written by hand: a derived impl would borrow the `&'static str` field and
// tie the deserializer lifetime to `'static`.
impl<'de> Deserialize<'de> for LanguageCode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = String::deserialize(deserializer)?;
        Self::parse(&code).map_err(serde::de::Error::custom)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn table_covers_english_through_thai() {
        assert_eq!(SUPPORTED_LANGUAGES.len(), 20);
        assert_eq!(SUPPORTED_LANGUAGES.first().map(|l| l.code), Some("eng"));
        assert_eq!(SUPPORTED_LANGUAGES.last().map(|l| l.code), Some("tha"));
    }

    #[test]
    fn parse_accepts_known_codes() {
        assert_eq!(LanguageCode::parse("spa").unwrap().code(), "spa");
        assert_eq!(LanguageCode::parse(" chi_tra ").unwrap().name(), "Chinese (Traditional)");
    }

    #[test]
    fn parse_rejects_unmapped_codes_as_configuration_errors() {
        let err = LanguageCode::parse("klingon").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(LanguageCode::parse("").is_err());
        assert!(LanguageCode::parse("ENG").is_err());
    }

    #[test]
    fn names_resolve_case_insensitively() {
        assert_eq!(LanguageCode::from_name("thai").unwrap().code(), "tha");
        assert_eq!(LanguageCode::resolve("German").unwrap().code(), "deu");
        assert_eq!(LanguageCode::resolve("ell").unwrap().name(), "Greek");
    }

    #[test]
    fn serde_validates_codes() {
        let code: LanguageCode = serde_json::from_str("\"jpn\"").unwrap();
        assert_eq!(code.code(), "jpn");
        assert!(serde_json::from_str::<LanguageCode>("\"xx\"").is_err());
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"jpn\"");
    }

    #[test]
    fn deserializes_from_owned_input() {
        #[derive(Deserialize)]
        struct Holder {
            language: LanguageCode,
        }

        let json = String::from(r#"{"language": "heb"}"#);
        let holder: Holder = serde_json::from_reader(json.as_bytes()).unwrap();
        drop(json);
        assert_eq!(holder.language.name(), "Hebrew");

        let err = serde_json::from_str::<Holder>(r#"{"language": "zz"}"#).err().unwrap();
        assert!(err.to_string().contains("unsupported language code"));
    }
}
