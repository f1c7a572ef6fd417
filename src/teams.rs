/// Scraper team slugs and the two-letter codes the game-by-game pages use for
/// opponents.
pub const TEAM_KEYS: [(&str, &str); 20] = [
    ("adelaide", "AD"),
    ("brisbaneb", "BB"),
    ("brisbanel", "BL"),
    ("carlton", "CA"),
    ("collingwood", "CW"),
    ("essendon", "ES"),
    ("fitzroy", "FI"),
    ("fremantle", "FR"),
    ("geelong", "GE"),
    ("goldcoast", "GC"),
    ("gws", "GW"),
    ("hawthorn", "HW"),
    ("melbourne", "ME"),
    ("kangaroos", "NM"),
    ("padelaide", "PA"),
    ("richmond", "RI"),
    ("stkilda", "SK"),
    ("swans", "SY"),
    ("westcoast", "WC"),
    // Slug as published by afltables.
    ("bullldogs", "WB"),
];

pub fn team_code(slug: &str) -> Option<&'static str> {
    TEAM_KEYS
        .iter()
        .find(|(s, _)| s.eq_ignore_ascii_case(slug.trim()))
        .map(|(_, code)| *code)
}

/// Resolves an opponent cell to a team slug. Accepts the two-letter code or a
/// slug that is already decoded.
pub fn opponent_slug(raw: &str) -> Option<&'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    TEAM_KEYS
        .iter()
        .find(|(slug, code)| code.eq_ignore_ascii_case(raw) || slug.eq_ignore_ascii_case(raw))
        .map(|(slug, _)| *slug)
}

#[cfg(test)]
mod tests {
    use super::{opponent_slug, team_code};

    #[test]
    fn decodes_codes_and_slugs() {
        assert_eq!(opponent_slug("CA"), Some("carlton"));
        assert_eq!(opponent_slug(" es "), Some("essendon"));
        assert_eq!(opponent_slug("swans"), Some("swans"));
        assert_eq!(opponent_slug("XX"), None);
        assert_eq!(opponent_slug(""), None);
        assert_eq!(team_code("bullldogs"), Some("WB"));
    }
}
