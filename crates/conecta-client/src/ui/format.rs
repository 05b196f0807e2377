//! Small presentation helpers shared across screens.

use chrono::{DateTime, Local, Utc};

/// Fallback shown for ministries without a description
pub fn description_or_default(description: Option<&str>) -> &str {
    match description {
        Some(d) if !d.trim().is_empty() => d,
        _ => "Sem descrição",
    }
}

/// Short local time for chat bubbles
pub fn message_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M").to_string()
}

/// Date plus time for events and announcements
pub fn date_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string()
}

/// Uppercase initial for avatar circles
pub fn initial(name: &str) -> String {
    name.chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "?".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_description_gets_the_fallback() {
        assert_eq!(description_or_default(None), "Sem descrição");
        assert_eq!(description_or_default(Some("")), "Sem descrição");
        assert_eq!(description_or_default(Some("  ")), "Sem descrição");
    }

    #[test]
    fn present_description_is_kept() {
        assert_eq!(
            description_or_default(Some("Equipe de louvor")),
            "Equipe de louvor"
        );
    }

    #[test]
    fn initial_is_uppercased() {
        assert_eq!(initial("ana"), "A");
        assert_eq!(initial(""), "?");
    }
}
