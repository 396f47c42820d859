// * Keyword Matcher
// * Decides whether a keyword is present in a page field, tolerating
// * case, punctuation, plural and leading-article variation.

use super::normalization::normalize_text;

// * Returns true when the normalized keyword is a contiguous substring of
// * the normalized field. Multi-word keywords must appear as a phrase, not
// * as scattered tokens.
// * Absent or empty fields never match.
pub fn contains(keyword: &str, field_text: Option<&str>) -> bool {
    let Some(field_text) = field_text else {
        return false;
    };

    let keyword = normalize_text(keyword);
    if keyword.is_empty() {
        return false;
    }

    normalize_text(field_text).contains(&keyword)
}

// * Joins repeated fields (every H1 or H2 of a page) into one text field,
// * in document order, so they can be matched as a single field
pub fn join_fields<S: AsRef<str>>(fields: &[S]) -> Option<String> {
    if fields.is_empty() {
        return None;
    }
    let joined: Vec<&str> = fields.iter().map(AsRef::as_ref).collect();
    Some(joined.join(" "))
}

// * Keyword normalized once, reused across the five fields of a page
#[derive(Debug, Clone)]
pub struct PreparedKeyword {
    normalized: String,
}

impl PreparedKeyword {
    pub fn new(keyword: &str) -> Self {
        Self {
            normalized: normalize_text(keyword),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    // * Field must already be normalized
    pub fn found_in(&self, normalized_field: Option<&str>) -> bool {
        match normalized_field {
            Some(field) if !self.is_empty() => field.contains(&self.normalized),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_punctuation_tolerance() {
        assert!(contains("Running Shoes", Some("Best RUNNING-SHOES store")));
    }

    #[test]
    fn test_plural_tolerance() {
        assert!(contains("running shoe", Some("our running shoes are great")));
        assert!(contains("running shoes", Some("a running shoe for everyone")));
    }

    #[test]
    fn test_article_tolerance() {
        assert!(contains("the best trail shoes", Some("Best trail shoes of 2024")));
    }

    #[test]
    fn test_absent_and_empty_fields() {
        assert!(!contains("running shoes", None));
        assert!(!contains("running shoes", Some("")));
        assert!(!contains("", Some("anything at all")));
        assert!(!contains("!!!", Some("anything at all")));
    }

    #[test]
    fn test_multi_word_requires_phrase() {
        assert!(!contains("best running shoes", Some("Running Shoes Guide")));
        assert!(!contains("trail shoes", Some("shoes for the trail")));
        assert!(contains("best running shoes", Some("Find the best running shoes here")));
    }

    #[test]
    fn test_joined_headings_match_across_boundaries() {
        let headings = vec!["Best trail", "Running shoes"];
        let joined = join_fields(&headings);
        assert_eq!(joined.as_deref(), Some("Best trail Running shoes"));
        assert!(contains("trail running", joined.as_deref()));
        assert!(contains("running shoe", joined.as_deref()));
        assert_eq!(join_fields::<&str>(&[]), None);
    }

    #[test]
    fn test_prepared_keyword_matches_free_function() {
        let kw = PreparedKeyword::new("Running Shoes");
        let field = normalize_text("Best RUNNING-SHOES store");
        assert_eq!(kw.as_str(), "running shoe");
        assert!(kw.found_in(Some(&field)));
        assert!(!kw.found_in(None));

        let empty = PreparedKeyword::new("  ");
        assert!(empty.is_empty());
        assert!(!empty.found_in(Some(&field)));
    }
}
