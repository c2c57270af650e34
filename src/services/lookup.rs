use crate::domain::Page;
use chrono::NaiveDateTime;

/// Picks the page to show for `language` among every page stored at one path.
///
/// `candidates` must be in insertion order. An exact language match wins;
/// otherwise the first candidate by configured language order, then by
/// insertion. With `published_only`, drafts, rejected pages and pages whose
/// publish date lies after `now` are never returned.
pub fn select_page<'a, S: AsRef<str>>(
    candidates: &'a [Page],
    language: &str,
    published_only: bool,
    now: NaiveDateTime,
    language_order: &[S],
) -> Option<&'a Page> {
    let visible = move || {
        candidates
            .iter()
            .filter(move |page| !published_only || page.is_published_at(now))
    };

    if let Some(exact) = visible().find(|page| page.language == language) {
        return Some(exact);
    }

    visible()
        .enumerate()
        .min_by_key(|(index, page)| (language_rank(&page.language, language_order), *index))
        .map(|(_, page)| page)
}

fn language_rank<S: AsRef<str>>(language: &str, order: &[S]) -> usize {
    order
        .iter()
        .position(|code| code.as_ref() == language)
        .unwrap_or(usize::MAX)
}
