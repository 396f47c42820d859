use url::Url;

// * Leading tokens dropped from every normalized string
const ARTICLES: [&str; 3] = ["a", "an", "the"];

// * Canonicalizes text for tolerant keyword comparison.
// *
// * Steps:
// * 1. Lowercase.
// * 2. Drop apostrophes, turn every other non-alphanumeric char into a space.
// * 3. Split on whitespace (collapses runs).
// * 4. Reduce plural suffixes on each token.
// * 5. Drop leading articles.
// *
// * Pure and idempotent: normalize_text(normalize_text(s)) == normalize_text(s).
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();

    let mut spaced = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        if ch.is_alphanumeric() {
            spaced.push(ch);
        } else if ch == '\'' || ch == '\u{2019}' {
            // * "men's" -> "mens", not "men s"
            continue;
        } else {
            spaced.push(' ');
        }
    }

    let tokens: Vec<String> = spaced.split_whitespace().map(singularize).collect();

    // * Articles go last: singularizing can turn "thes" into "the"
    let start = tokens
        .iter()
        .position(|t| !ARTICLES.contains(&t.as_str()))
        .unwrap_or(tokens.len());

    tokens[start..].join(" ")
}

// * Heuristic plural reduction, no dictionary.
// ! Irregular plurals ("children") and words ending in s ("news") are
// ! handled wrongly. Accepted approximation.
pub fn singularize(token: &str) -> String {
    let mut current = token.to_string();
    // * Repeat until stable so normalization stays idempotent
    while let Some(next) = singularize_once(&current) {
        current = next;
    }
    current
}

fn singularize_once(token: &str) -> Option<String> {
    if token.chars().count() <= 3 {
        return None;
    }
    if token.ends_with("ss") || token.ends_with("us") || token.ends_with("is") {
        return None;
    }

    if token.ends_with("ies") && token.chars().count() > 4 {
        return Some(format!("{}y", &token[..token.len() - 3]));
    }

    if let Some(stem) = token.strip_suffix("es") {
        let sibilant = ["s", "x", "z", "ch", "sh"].iter().any(|s| stem.ends_with(s));
        if sibilant {
            return Some(stem.to_string());
        }
    }

    token.strip_suffix('s').map(str::to_string)
}

// * Standardizes a URL cell from the export: trims whitespace and trailing slashes.
pub fn clean_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

// * Turns a URL from the export into something fetchable.
// * Absolute http(s) URLs pass through; path-only URLs are joined onto
// * the site root when one is configured.
pub fn resolve_url(raw: &str, site_root: Option<&str>) -> Option<String> {
    if let Ok(url) = Url::parse(raw) {
        return match url.scheme() {
            "http" | "https" => Some(url.to_string()),
            _ => None,
        };
    }

    let base = Url::parse(site_root?).ok()?;
    let mut joined = base.join(raw).ok()?;

    // * Fragments never reach the server
    joined.set_fragment(None);
    Some(joined.to_string())
}
