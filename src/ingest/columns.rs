// * Header alias table for Search Console exports
// * Resolved once per file; matching is case-insensitive on trimmed names.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Keyword,
    Url,
    Clicks,
    Position,
    Impressions,
    Ctr,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Keyword => "Keyword",
            Field::Url => "URL",
            Field::Clicks => "Clicks",
            Field::Position => "Position",
            Field::Impressions => "Impressions",
            Field::Ctr => "CTR",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Field::Keyword | Field::Url | Field::Clicks)
    }
}

/// Accepted header variants per canonical field, lowercase
pub const ALIASES: &[(Field, &[&str])] = &[
    (
        Field::Keyword,
        &["query", "queries", "keyword", "keywords", "search term", "top queries"],
    ),
    (
        Field::Url,
        &[
            "landing page",
            "landing pages",
            "url",
            "urls",
            "address",
            "page",
            "pages",
            "top pages",
            "link",
            "links",
            "path",
            "uri",
        ],
    ),
    (Field::Clicks, &["clicks", "click", "visits", "traffic"]),
    (
        Field::Position,
        &["position", "rank", "ranking", "avg position", "average position", "avg. position"],
    ),
    (Field::Impressions, &["impressions", "impression", "impr."]),
    (Field::Ctr, &["ctr", "click through rate", "click-through rate"]),
];

/// Column index of every recognised field in one header row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub keyword: Option<usize>,
    pub url: Option<usize>,
    pub clicks: Option<usize>,
    pub position: Option<usize>,
    pub impressions: Option<usize>,
    pub ctr: Option<usize>,
}

impl ColumnMap {
    /// Maps headers to fields; the first matching column wins
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut map = ColumnMap::default();

        for (idx, header) in headers.iter().enumerate() {
            let name = clean_header(header.as_ref()).to_lowercase();
            let Some(field) = lookup(&name) else {
                continue;
            };
            let slot = map.slot_mut(field);
            if slot.is_none() {
                *slot = Some(idx);
            }
        }

        map
    }

    pub fn get(&self, field: Field) -> Option<usize> {
        match field {
            Field::Keyword => self.keyword,
            Field::Url => self.url,
            Field::Clicks => self.clicks,
            Field::Position => self.position,
            Field::Impressions => self.impressions,
            Field::Ctr => self.ctr,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<usize> {
        match field {
            Field::Keyword => &mut self.keyword,
            Field::Url => &mut self.url,
            Field::Clicks => &mut self.clicks,
            Field::Position => &mut self.position,
            Field::Impressions => &mut self.impressions,
            Field::Ctr => &mut self.ctr,
        }
    }

    /// Required fields with no matching column
    pub fn missing_required(&self) -> Vec<Field> {
        ALIASES
            .iter()
            .map(|(field, _)| *field)
            .filter(|field| field.is_required() && self.get(*field).is_none())
            .collect()
    }
}

fn lookup(name: &str) -> Option<Field> {
    ALIASES
        .iter()
        .find(|(_, variants)| variants.contains(&name))
        .map(|(field, _)| *field)
}

// * Strips the UTF-8 BOM some exporters prepend, plus surrounding whitespace
pub fn clean_header(raw: &str) -> &str {
    raw.trim_start_matches('\u{feff}').trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gsc_headers() {
        let headers = ["Top queries", "Landing Page", "Clicks", "Impressions", "CTR", "Position"];
        let map = ColumnMap::resolve(&headers);

        assert_eq!(map.keyword, Some(0));
        assert_eq!(map.url, Some(1));
        assert_eq!(map.clicks, Some(2));
        assert_eq!(map.impressions, Some(3));
        assert_eq!(map.ctr, Some(4));
        assert_eq!(map.position, Some(5));
        assert!(map.missing_required().is_empty());
    }

    #[test]
    fn test_case_insensitive_with_bom() {
        let headers = ["\u{feff}KEYWORD", " address ", "traffic"];
        let map = ColumnMap::resolve(&headers);
        assert_eq!(map.keyword, Some(0));
        assert_eq!(map.url, Some(1));
        assert_eq!(map.clicks, Some(2));
        assert_eq!(map.position, None);
    }

    #[test]
    fn test_first_matching_column_wins() {
        let headers = ["Query", "Page", "URL", "Clicks"];
        let map = ColumnMap::resolve(&headers);
        assert_eq!(map.url, Some(1));
    }

    #[test]
    fn test_missing_required() {
        let headers = ["Query", "Impressions"];
        let missing = ColumnMap::resolve(&headers).missing_required();
        assert_eq!(missing, vec![Field::Url, Field::Clicks]);
    }
}
