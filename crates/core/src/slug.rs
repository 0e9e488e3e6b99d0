use std::collections::HashMap;

/// Per-document anchor generator.
///
/// The first occurrence of a base slug is returned bare; every repeat gets
/// `-N` appended, where `N` counts the repeats of that base slug. Generated
/// ids are tracked too, so a later heading whose own slug equals an earlier
/// suffixed id still gets a fresh one.
///
/// # Examples
///
/// ```
/// use docmark_core::slug::Slugger;
///
/// let mut slugger = Slugger::new();
/// assert_eq!(slugger.next_slug("Setup"), "setup");
/// assert_eq!(slugger.next_slug("Setup"), "setup-1");
/// assert_eq!(slugger.next_slug("Setup"), "setup-2");
/// ```
#[derive(Debug, Default)]
pub struct Slugger {
    counts: HashMap<String, usize>,
}

impl Slugger {
    /// Creates a new slugger.
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }

    /// Generates the next unique slug for the given heading text.
    pub fn next_slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut candidate = base.clone();
        while self.counts.contains_key(&candidate) {
            let repeats = self.counts.entry(base.clone()).or_insert(0);
            *repeats += 1;
            candidate = format!("{}-{}", base, repeats);
        }
        self.counts.insert(candidate.clone(), 0);
        candidate
    }

    /// Reserves a slug so future generated slugs won't collide with it.
    pub fn reserve(&mut self, slug: &str) {
        self.counts.entry(slug.to_string()).or_insert(0);
    }
}

/// Converts heading text into an anchor slug (no de-duplication).
///
/// 1. Lowercase
/// 2. Drop everything except `a-z`, `0-9`, whitespace and `-`
/// 3. Whitespace runs become one hyphen, hyphen runs collapse to one
/// 4. Leading and trailing hyphens are trimmed
///
/// Text with nothing slug-safe in it yields an empty slug.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else if ch == '-' || ch.is_whitespace() {
            pending_hyphen = true;
        }
        // Everything else (punctuation, non-ASCII letters, symbols) is dropped
        // without breaking the current word.
    }

    slug
}
