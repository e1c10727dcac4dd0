//! Canonical team naming.
//!
//! Game logs and season stats span franchise relocations and rebrands, so the
//! same franchise shows up under several names. Every team-keyed join in the
//! crate goes through `normalize` first; skipping it fragments a team's
//! history across its old and new names.

/// Historical name -> current franchise name
const TEAM_ALIASES: &[(&str, &str)] = &[
    ("LA Clippers", "Los Angeles Clippers"),
    ("New Orleans Hornets", "New Orleans Pelicans"),
    ("Seattle SuperSonics", "Oklahoma City Thunder"),
    ("New Jersey Nets", "Brooklyn Nets"),
    ("Vancouver Grizzlies", "Memphis Grizzlies"),
    ("Charlotte Bobcats", "Charlotte Hornets"),
    ("Washington Bullets", "Washington Wizards"),
];

/// Map a historical or alternate franchise name to its canonical current
/// name. Unknown names pass through unchanged; this never fails.
pub fn normalize(name: &str) -> &str {
    let trimmed = name.trim();
    for (alias, canonical) in TEAM_ALIASES {
        if trimmed == *alias {
            return canonical;
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_relocated_franchises() {
        assert_eq!(normalize("Seattle SuperSonics"), "Oklahoma City Thunder");
        assert_eq!(normalize("New Jersey Nets"), "Brooklyn Nets");
        assert_eq!(normalize("Vancouver Grizzlies"), "Memphis Grizzlies");
        assert_eq!(normalize("Washington Bullets"), "Washington Wizards");
    }

    #[test]
    fn test_normalize_passes_through_unknown_names() {
        assert_eq!(normalize("Boston Celtics"), "Boston Celtics");
        assert_eq!(normalize("Denver Nuggets"), "Denver Nuggets");
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(normalize("  Charlotte Bobcats "), "Charlotte Hornets");
    }
}
