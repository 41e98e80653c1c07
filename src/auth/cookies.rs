//! Session cookie aggregation.

use super::browser::BrowserCookie;

/// Join cookies into a `Cookie` header value.
///
/// Cookies are deduplicated by name: a later cookie replaces the value of
/// an earlier one but keeps its position. Pairs are joined with `; `.
pub fn join_cookies<I>(cookies: I) -> String
where
    I: IntoIterator<Item = BrowserCookie>,
{
    let mut pairs: Vec<(String, String)> = Vec::new();
    for cookie in cookies {
        match pairs.iter_mut().find(|(name, _)| *name == cookie.name) {
            Some(pair) => pair.1 = cookie.value,
            None => pairs.push((cookie.name, cookie.value)),
        }
    }
    pairs
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ")
}
