//! Human-readable, globally unique gallery slugs.
//!
//! A slug is `{handle}/{yyyy}/{mm}/{dd}/{title}`. Collisions with a
//! different gallery get `-2`, `-3`, ... appended to the title part.

use chrono::NaiveDate;
use tracing::warn;

use galleryhub_core::config::lifecycle::DEFAULT_SLUG_TITLE_MAX_LEN;
use galleryhub_core::types::GalleryId;
use galleryhub_database::SlugLookup;

/// Title part used when nothing alphanumeric survives normalisation.
const EMPTY_TITLE_FALLBACK: &str = "gallery";

/// Upper bound on suffix probing before giving up on the base slug.
const MAX_SUFFIX: u32 = 1_000;

/// Builds slugs and resolves collisions.
#[derive(Debug, Clone, Copy)]
pub struct SlugGenerator {
    max_title_len: usize,
}

impl Default for SlugGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SLUG_TITLE_MAX_LEN)
    }
}

impl SlugGenerator {
    /// Creates a generator that keeps at most `max_title_len` characters of
    /// the normalised title.
    pub fn new(max_title_len: usize) -> Self {
        Self {
            max_title_len: max_title_len.max(1),
        }
    }

    /// Fold accents, lowercase, spell `&` as `e`, collapse every run of
    /// other characters into one hyphen, then cut to length.
    pub fn normalize_title(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut pending_hyphen = false;

        for c in raw.chars().flat_map(char::to_lowercase) {
            let mut buf = [0u8; 4];
            match c {
                c if c.is_ascii_alphanumeric() => {
                    push_piece(&mut out, &mut pending_hyphen, c.encode_utf8(&mut buf));
                }
                '&' => {
                    pending_hyphen = true;
                    push_piece(&mut out, &mut pending_hyphen, "e");
                    pending_hyphen = true;
                }
                // Combining diacritics from decomposed input.
                '\u{0300}'..='\u{036f}' => {}
                c => match fold_latin(c) {
                    Some(folded) => push_piece(&mut out, &mut pending_hyphen, folded),
                    None => pending_hyphen = true,
                },
            }
        }

        let truncated: String = out.chars().take(self.max_title_len).collect();
        let trimmed = truncated.trim_matches('-');
        if trimmed.is_empty() {
            EMPTY_TITLE_FALLBACK.to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// The unsuffixed candidate for a title and date.
    pub fn base_slug(&self, owner_handle: &str, raw_title: &str, date: NaiveDate) -> String {
        format!(
            "{}/{}/{}",
            owner_handle.trim(),
            date.format("%Y/%m/%d"),
            self.normalize_title(raw_title)
        )
    }

    /// Produce a slug not held by any gallery other than `exclude`.
    ///
    /// If the uniqueness check fails the base candidate is returned as-is;
    /// the store's unique constraint rejects a real collision on write.
    pub async fn generate<L>(
        &self,
        lookup: &L,
        owner_handle: &str,
        raw_title: &str,
        date: NaiveDate,
        exclude: Option<GalleryId>,
    ) -> String
    where
        L: SlugLookup + ?Sized,
    {
        let base = self.base_slug(owner_handle, raw_title, date);
        let mut candidate = base.clone();
        let mut suffix = 1;

        loop {
            match lookup.slug_exists(&candidate, exclude).await {
                Ok(false) => return candidate,
                Ok(true) => {}
                Err(e) => {
                    warn!(slug = %base, error = %e, "Slug uniqueness check failed, using base slug");
                    return base;
                }
            }

            suffix += 1;
            if suffix > MAX_SUFFIX {
                warn!(slug = %base, attempts = MAX_SUFFIX, "No free slug suffix, using base slug");
                return base;
            }
            candidate = format!("{base}-{suffix}");
        }
    }
}

fn push_piece(out: &mut String, pending_hyphen: &mut bool, piece: &str) {
    if *pending_hyphen && !out.is_empty() {
        out.push('-');
    }
    *pending_hyphen = false;
    out.push_str(piece);
}

/// ASCII spelling of a lowercase Latin letter with diacritics.
fn fold_latin(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'ĥ' | 'ħ' => "h",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'ĵ' => "j",
        'ķ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'œ' => "oe",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ś' | 'ŝ' | 'ş' | 'š' | 'ș' => "s",
        'ß' => "ss",
        'ţ' | 'ť' | 'ŧ' | 'ț' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(folded)
}
