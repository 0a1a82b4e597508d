use rapport::RapportError;
use rapport::conversation::ModeKind;
use rapport::relationships::RelationshipType;

pub fn parse_relationship_type(type_str: &str) -> rapport::Result<RelationshipType> {
    type_str.parse().map_err(|_| {
        let known: Vec<&str> = RelationshipType::ALL.iter().map(|t| t.as_str()).collect();
        RapportError::Validation(format!(
            "Invalid relationship type: {} (expected one of: {})",
            type_str,
            known.join(", ")
        ))
    })
}

pub fn parse_mode_kind(mode_str: &str) -> rapport::Result<ModeKind> {
    mode_str.parse().map_err(|_| {
        let known: Vec<&str> = ModeKind::ALL.iter().map(|m| m.as_str()).collect();
        RapportError::Validation(format!(
            "Invalid interaction mode: {} (expected one of: {})",
            mode_str,
            known.join(", ")
        ))
    })
}

/// Split a chat command line into the command and its argument
pub fn split_command(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix('/')?;
    match rest.split_once(char::is_whitespace) {
        Some((command, argument)) => Some((command, argument.trim())),
        None => Some((rest, "")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_relationship_type("Mentor").unwrap(), RelationshipType::Mentor);
        assert!(matches!(
            parse_relationship_type("nemesis"),
            Err(RapportError::Validation(_))
        ));
        assert_eq!(parse_mode_kind("therapy").unwrap(), ModeKind::Therapy);
        assert!(parse_mode_kind("karaoke").is_err());
    }

    #[test]
    fn test_split_command() {
        assert_eq!(split_command("/mode therapy"), Some(("mode", "therapy")));
        assert_eq!(split_command("/quit"), Some(("quit", "")));
        assert_eq!(split_command("/mood  quiet dread "), Some(("mood", "quiet dread")));
        assert_eq!(split_command("hello"), None);
    }
}
