/// Maps a requested locale tag onto one of the configured languages.
///
/// An exact match wins, then the primary subtag (`en-us` -> `en`).
pub fn guess_language<S: AsRef<str>>(requested: &str, languages: &[S]) -> Option<String> {
    let known = |code: &str| languages.iter().any(|l| l.as_ref() == code);

    if known(requested) {
        return Some(requested.to_string());
    }

    match requested.find('-') {
        Some(pos) if pos > 0 => {
            let primary = &requested[..pos];
            known(primary).then(|| primary.to_string())
        }
        _ => None,
    }
}

/// First of the `requested` locales (most preferred first) that maps onto a
/// configured language, else the site default.
pub fn resolve_language<R, S>(requested: &[R], languages: &[S], default: &str) -> String
where
    R: AsRef<str>,
    S: AsRef<str>,
{
    requested
        .iter()
        .find_map(|locale| guess_language(locale.as_ref(), languages))
        .unwrap_or_else(|| default.to_string())
}
