//! Per-procedure localization.
//!
//! A `LocaleBundle` maps `(locale, key)` to a user-visible string with
//! a fixed fallback chain: requested locale, then the bundle's
//! fallback locale, then the key itself. Lookups never fail. Messages
//! carry at most one interpolation slot, named `detail`, so every
//! translation stays symmetric.

use std::collections::HashMap;

use fluent::bundle::FluentBundle;
use fluent::{FluentArgs, FluentResource, FluentValue};
use fluent_langneg::{negotiate_languages, NegotiationStrategy};
use intl_memoizer::concurrent::IntlLangMemoizer;
use unic_langid::LanguageIdentifier;

use crate::error::Fault;

/// Locales every shipped descriptor provides.
pub const SUPPORTED_LOCALES: &[&str] = &["en-US", "zh-CN"];

/// Default fallback locale for every bundle.
pub const FALLBACK_LOCALE: &str = "en-US";

type Bundle = FluentBundle<FluentResource, IntlLangMemoizer>;

/// Immutable per-procedure dictionary of localized strings.
pub struct LocaleBundle {
    bundles: HashMap<String, Bundle>,
    fallback: String,
}

impl LocaleBundle {
    /// Builds a bundle from `(locale tag, FTL source)` pairs.
    pub fn from_sources(sources: &[(&str, &str)]) -> Result<Self, Fault> {
        let mut bundles = HashMap::new();
        for (locale, ftl) in sources {
            let resource = FluentResource::try_new(ftl.to_string()).map_err(|_| {
                Fault::InternalInvariant(format!("unparsable FTL for locale {locale}"))
            })?;
            let lang_id: LanguageIdentifier = locale
                .parse()
                .map_err(|_| Fault::InternalInvariant(format!("invalid locale tag {locale}")))?;
            let mut bundle = Bundle::new_concurrent(vec![lang_id]);
            // Keep placeable output free of Unicode isolation marks so
            // rendered cells compare byte-for-byte across runs.
            bundle.set_use_isolating(false);
            bundle.add_resource(resource).map_err(|_| {
                Fault::InternalInvariant(format!("duplicate FTL messages for locale {locale}"))
            })?;
            bundles.insert(locale.to_string(), bundle);
        }
        Ok(LocaleBundle { bundles, fallback: FALLBACK_LOCALE.to_string() })
    }

    /// Locale tags this bundle carries.
    pub fn locales(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.bundles.keys().map(|k| k.as_str()).collect();
        tags.sort();
        tags
    }

    /// True when `key` resolves in `locale` without falling back.
    pub fn has(&self, locale: &str, key: &str) -> bool {
        self.bundles
            .get(locale)
            .map(|b| b.get_message(key).is_some())
            .unwrap_or(false)
    }

    /// Resolves a key, trying `locale`, then the fallback locale, then
    /// echoing the key itself.
    pub fn lookup(&self, locale: &str, key: &str) -> String {
        self.lookup_with(locale, key, None)
    }

    /// Like `lookup`, interpolating `detail` into the single slot.
    pub fn lookup_with(&self, locale: &str, key: &str, detail: Option<&str>) -> String {
        for tag in [locale, self.fallback.as_str()] {
            if let Some(bundle) = self.bundles.get(tag) {
                if let Some(message) = bundle.get_message(key) {
                    if let Some(pattern) = message.value() {
                        let mut errors = vec![];
                        let formatted = match detail {
                            Some(d) => {
                                let mut args = FluentArgs::new();
                                args.set("detail", FluentValue::from(d));
                                bundle.format_pattern(pattern, Some(&args), &mut errors)
                            }
                            None => bundle.format_pattern(pattern, None, &mut errors),
                        };
                        return formatted.to_string();
                    }
                }
            }
        }
        key.to_string()
    }

    /// Negotiates the best supported locale for a requested tag.
    pub fn negotiate(&self, requested: &str) -> String {
        let available: Vec<LanguageIdentifier> =
            self.bundles.keys().filter_map(|k| k.parse().ok()).collect();
        let requested: Vec<LanguageIdentifier> =
            requested.parse().ok().into_iter().collect();
        let default: LanguageIdentifier = self
            .fallback
            .parse()
            .unwrap_or_else(|_| LanguageIdentifier::default());
        let negotiated = negotiate_languages(
            &requested,
            &available,
            Some(&default),
            NegotiationStrategy::Filtering,
        );
        negotiated
            .first()
            .map(|l| l.to_string())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// A bundle pinned to one default locale. This is the view threaded
/// through the builder and harness; `switch` changes the default for
/// subsequent lookups without touching the shared bundle.
pub struct Localizer<'a> {
    bundle: &'a LocaleBundle,
    locale: String,
}

impl<'a> Localizer<'a> {
    pub fn new(bundle: &'a LocaleBundle, locale: &str) -> Self {
        Localizer { bundle, locale: bundle.negotiate(locale) }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Changes the default locale for subsequent lookups.
    pub fn switch(&mut self, locale: &str) {
        self.locale = self.bundle.negotiate(locale);
    }

    pub fn text(&self, key: &str) -> String {
        self.bundle.lookup(&self.locale, key)
    }

    pub fn text_with(&self, key: &str, detail: &str) -> String {
        self.bundle.lookup_with(&self.locale, key, Some(detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LocaleBundle {
        LocaleBundle::from_sources(&[
            (
                "en-US",
                "title = Descriptive Statistics\nsaved = Saved to { $detail }\nplain = Plain text\n",
            ),
            ("zh-CN", "title = 描述性统计\n"),
        ])
        .unwrap()
    }

    #[test]
    fn lookup_prefers_requested_locale() {
        let b = sample();
        assert_eq!(b.lookup("zh-CN", "title"), "描述性统计");
        assert_eq!(b.lookup("en-US", "title"), "Descriptive Statistics");
    }

    #[test]
    fn lookup_falls_back_to_english_then_key() {
        let b = sample();
        assert_eq!(b.lookup("zh-CN", "plain"), "Plain text");
    }

    #[test]
    fn missing_key_echoes_the_key() {
        let b = sample();
        assert_eq!(b.lookup("en-US", "no-such-key"), "no-such-key");
    }

    #[test]
    fn interpolation_fills_the_detail_slot() {
        let b = sample();
        assert_eq!(
            b.lookup_with("en-US", "saved", Some("/tmp/report.md")),
            "Saved to /tmp/report.md"
        );
    }

    #[test]
    fn switch_changes_subsequent_lookups() {
        let b = sample();
        let mut loc = Localizer::new(&b, "en-US");
        assert_eq!(loc.text("title"), "Descriptive Statistics");
        loc.switch("zh-CN");
        assert_eq!(loc.text("title"), "描述性统计");
    }

    #[test]
    fn negotiate_prefers_exact_then_fallback() {
        let b = sample();
        assert_eq!(b.negotiate("zh-CN"), "zh-CN");
        assert_eq!(b.negotiate("fr-FR"), "en-US");
    }
}
