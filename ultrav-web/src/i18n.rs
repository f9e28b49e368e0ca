//! Localization of the contact page

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Supported locales
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    It,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::It];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::It => "it",
        }
    }

    /// Match a language tag such as `it-IT` by its primary subtag
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next()?;
        Self::ALL
            .into_iter()
            .find(|lang| primary.eq_ignore_ascii_case(lang.code()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Keys of the translatable validation messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKey {
    NameMin,
    NameMax,
    EmailInvalid,
    MessageMin,
    MessageMax,
}

impl ErrorKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKey::NameMin => "z_name_min",
            ErrorKey::NameMax => "z_name_max",
            ErrorKey::EmailInvalid => "z_email_invalid",
            ErrorKey::MessageMin => "z_message_min",
            ErrorKey::MessageMax => "z_message_max",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "z_name_min" => Some(ErrorKey::NameMin),
            "z_name_max" => Some(ErrorKey::NameMax),
            "z_email_invalid" => Some(ErrorKey::EmailInvalid),
            "z_message_min" => Some(ErrorKey::MessageMin),
            "z_message_max" => Some(ErrorKey::MessageMax),
            _ => None,
        }
    }
}

/// Labels of the contact form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormLabels {
    pub title: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub submit: String,
    pub success_message: String,
}

/// Validation message templates; `%1`, `%2`, ... are replaced by parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorTemplates {
    pub z_name_min: String,
    pub z_name_max: String,
    pub z_email_invalid: String,
    pub z_message_min: String,
    pub z_message_max: String,
}

impl ErrorTemplates {
    pub fn template(&self, key: ErrorKey) -> &str {
        match key {
            ErrorKey::NameMin => &self.z_name_min,
            ErrorKey::NameMax => &self.z_name_max,
            ErrorKey::EmailInvalid => &self.z_email_invalid,
            ErrorKey::MessageMin => &self.z_message_min,
            ErrorKey::MessageMax => &self.z_message_max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub lang: Language,
    pub form: FormLabels,
    pub errors: ErrorTemplates,
}

impl Translation {
    pub fn english() -> Self {
        Self {
            lang: Language::En,
            form: FormLabels {
                title: "Contact Us".into(),
                name: "Name".into(),
                email: "Email".into(),
                message: "Message".into(),
                submit: "Send Message".into(),
                success_message: "Your message has been sent. Thank you for contacting us.".into(),
            },
            errors: ErrorTemplates {
                z_name_min: "Name must be at least %1 characters long.".into(),
                z_name_max: "Name must be at most %1 characters long.".into(),
                z_email_invalid: "Please enter a valid email address.".into(),
                z_message_min: "Message must be at least %1 characters long.".into(),
                z_message_max: "Message must be at most %1 characters long.".into(),
            },
        }
    }

    pub fn italian() -> Self {
        Self {
            lang: Language::It,
            form: FormLabels {
                title: "Contattaci".into(),
                name: "Nome".into(),
                email: "Email".into(),
                message: "Messaggio".into(),
                submit: "Invia messaggio".into(),
                success_message: "Il tuo messaggio è stato inviato. Grazie per averci contattato."
                    .into(),
            },
            errors: ErrorTemplates {
                z_name_min: "Il nome deve contenere almeno %1 caratteri.".into(),
                z_name_max: "Il nome può contenere al massimo %1 caratteri.".into(),
                z_email_invalid: "Inserisci un indirizzo email valido.".into(),
                z_message_min: "Il messaggio deve contenere almeno %1 caratteri.".into(),
                z_message_max: "Il messaggio può contenere al massimo %1 caratteri.".into(),
            },
        }
    }

    /// Translate a raw error code of the form `key|p1|p2...`.
    ///
    /// Unknown keys come back unchanged.
    pub fn translate_code(&self, code: &str) -> String {
        let mut parts = code.split('|');
        let Some(key) = parts.next().and_then(ErrorKey::parse) else {
            return code.to_string();
        };
        let params: Vec<&str> = parts.collect();

        let mut message = self.errors.template(key).to_string();
        // Highest index first so `%1` never eats the prefix of `%10`
        for (i, param) in params.iter().enumerate().rev() {
            message = message.replace(&format!("%{}", i + 1), param);
        }
        message
    }
}

/// Every translation, keyed by language
#[derive(Debug, Clone)]
pub struct Translations {
    tables: HashMap<Language, Translation>,
}

impl Translations {
    pub fn new(translations: impl IntoIterator<Item = Translation>) -> Self {
        Self {
            tables: translations.into_iter().map(|t| (t.lang, t)).collect(),
        }
    }

    /// The built-in English and Italian tables
    pub fn builtin() -> Self {
        Self::new([Translation::english(), Translation::italian()])
    }

    pub fn contains(&self, lang: Language) -> bool {
        self.tables.contains_key(&lang)
    }

    /// Table for `lang`, or the English one when `lang` has none
    pub fn get(&self, lang: Language) -> &Translation {
        self.tables
            .get(&lang)
            .or_else(|| self.tables.get(&Language::En))
            .unwrap_or_else(|| english_fallback())
    }

    /// Resolve a submitted `lang` form value; unknown or empty means English
    pub fn for_code(&self, code: &str) -> &Translation {
        self.get(Language::from_tag(code).unwrap_or_default())
    }

    /// Pick the table for an optional `Accept-Language` header.
    ///
    /// The first listed tag with a table wins; quality values are ignored.
    pub fn negotiate(&self, accept_language: Option<&str>) -> &Translation {
        let lang = accept_language
            .into_iter()
            .flat_map(|header| header.split(','))
            .filter_map(|entry| Language::from_tag(entry.split(';').next().unwrap_or_default()))
            .find(|lang| self.contains(*lang))
            .unwrap_or_default();
        self.get(lang)
    }
}

impl Default for Translations {
    fn default() -> Self {
        Self::builtin()
    }
}

fn english_fallback() -> &'static Translation {
    static ENGLISH: std::sync::OnceLock<Translation> = std::sync::OnceLock::new();
    ENGLISH.get_or_init(Translation::english)
}
