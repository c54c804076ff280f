//! Translation catalogs and localizers.
//!
//! A catalog is a JSON object mapping term ids to message templates for one
//! language; placeholders are written as `{name}`. The `en` and `de` catalogs
//! are compiled in, and a directory of `<tag>.json` files may add languages or
//! override single terms at start-up.
//!
//! Every [`Term`] carries English fallback text, so a message can always be
//! rendered even when no catalog knows the term.

use crate::errors::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

const EMBEDDED_CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("../../assets/translations/en.json")),
    ("de", include_str!("../../assets/translations/de.json")),
];

/// A translatable message: catalog id plus English fallback text
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Term {
    /// Catalog key
    pub id: &'static str,
    /// Text used when no catalog provides the term
    pub fallback: &'static str,
}

impl Term {
    /// Creates a term.
    #[must_use]
    pub const fn new(id: &'static str, fallback: &'static str) -> Self {
        Self { id, fallback }
    }
}

/// All loaded catalogs, keyed by normalized language tag
#[derive(Debug, Default)]
pub struct Translations {
    catalogs: BTreeMap<String, HashMap<String, String>>,
}

impl Translations {
    /// Catalogs compiled into the binary.
    pub fn embedded() -> Result<Self> {
        let mut translations = Self::default();
        for (tag, source) in EMBEDDED_CATALOGS {
            translations.add_catalog(tag, source)?;
        }
        Ok(translations)
    }

    /// Embedded catalogs, extended by the `<tag>.json` files in `custom_dir`.
    ///
    /// Files that are not JSON or whose name is not a language tag are
    /// skipped; a catalog that fails to parse is an error.
    pub fn load(custom_dir: Option<&Path>) -> Result<Self> {
        let mut translations = Self::embedded()?;
        let Some(dir) = custom_dir else {
            return Ok(translations);
        };

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                warn!(file = %path.display(), "Skipping non-translation file");
                continue;
            }
            let Some(tag) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(normalize_language_tag)
            else {
                warn!(file = %path.display(), "Translation file is not named after a language, skipping");
                continue;
            };

            let source = std::fs::read_to_string(&path)?;
            translations.add_catalog(&tag, &source).map_err(|e| Error::Config {
                message: format!("Failed to load translations from {}: {e}", path.display()),
            })?;
            debug!(language = %tag, file = %path.display(), "Loaded custom translations");
        }
        Ok(translations)
    }

    /// Parses a catalog and merges it into the one for `tag`; terms already
    /// present are overridden.
    pub fn add_catalog(&mut self, tag: &str, source: &str) -> Result<()> {
        let terms: HashMap<String, String> =
            serde_json::from_str(source).map_err(|e| Error::Config {
                message: format!("Invalid translation catalog for {tag}: {e}"),
            })?;
        self.catalogs
            .entry(tag.to_string())
            .or_default()
            .extend(terms.into_iter().filter(|(_, text)| !text.is_empty()));
        Ok(())
    }

    /// Languages with a catalog, sorted
    #[must_use]
    pub fn language_tags(&self) -> Vec<&str> {
        self.catalogs.keys().map(String::as_str).collect()
    }

    /// Whether a catalog exists for the normalized tag
    #[must_use]
    pub fn supports(&self, tag: &str) -> bool {
        self.catalogs.contains_key(tag)
    }

    fn lookup(&self, tag: &str, id: &str) -> Option<&str> {
        self.catalogs
            .get(tag)
            .and_then(|terms| terms.get(id))
            .map(String::as_str)
    }
}

/// Renders terms in one language.
#[derive(Clone, Debug)]
pub struct Localizer {
    target: Option<(Arc<Translations>, String)>,
}

impl Localizer {
    /// A localizer for `language`.
    #[must_use]
    pub fn new(translations: Arc<Translations>, language: impl Into<String>) -> Self {
        Self {
            target: Some((translations, language.into())),
        }
    }

    /// A localizer that always renders the fallback text.
    #[must_use]
    pub const fn fallback() -> Self {
        Self { target: None }
    }

    /// The language this localizer renders, `None` for the fallback localizer
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.target.as_ref().map(|(_, language)| language.as_str())
    }

    /// Renders a term without placeholders.
    #[must_use]
    pub fn localize(&self, term: &Term) -> String {
        self.localize_with(term, &[])
    }

    /// Renders a term, substituting `{name}` placeholders.
    #[must_use]
    pub fn localize_with(&self, term: &Term, placeholders: &[(&str, &str)]) -> String {
        let template = self
            .target
            .as_ref()
            .and_then(|(translations, language)| {
                translations.lookup(language, term.id).or_else(|| {
                    let base = language.split('-').next()?;
                    (base != language)
                        .then(|| translations.lookup(base, term.id))
                        .flatten()
                })
            })
            .unwrap_or(term.fallback);

        render(template, placeholders)
    }
}

fn render(template: &str, placeholders: &[(&str, &str)]) -> String {
    placeholders
        .iter()
        .fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
}

/// Normalizes a BCP 47 language tag (`EN_us` → `en-US`).
///
/// Accepts a 2–3 letter language, an optional 4 letter script and an optional
/// region (2 letters or 3 digits). Anything else yields `None`.
#[must_use]
pub fn normalize_language_tag(raw: &str) -> Option<String> {
    let mut subtags = raw.trim().split(['-', '_']);

    let language = subtags.next()?;
    if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let mut tag = language.to_ascii_lowercase();

    let mut next = subtags.next();
    if let Some(script) = next.filter(|s| s.len() == 4 && s.chars().all(|c| c.is_ascii_alphabetic())) {
        tag.push('-');
        tag.push_str(&script[..1].to_ascii_uppercase());
        tag.push_str(&script[1..].to_ascii_lowercase());
        next = subtags.next();
    }

    if let Some(region) = next {
        let alpha = region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic());
        let numeric = region.len() == 3 && region.chars().all(|c| c.is_ascii_digit());
        if !alpha && !numeric {
            return None;
        }
        tag.push('-');
        tag.push_str(&region.to_ascii_uppercase());
    }

    if subtags.next().is_some() {
        return None;
    }
    Some(tag)
}
