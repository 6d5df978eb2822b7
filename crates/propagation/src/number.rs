//! Door number composition

/// Base number (to-room, else from-room) plus `separator` and `extra` when
/// `extra` is not blank
pub fn compose_door_number(to_number: &str, from_number: &str, extra: &str, separator: &str) -> String {
    let mut number = if to_number.trim().is_empty() {
        from_number.to_string()
    } else {
        to_number.to_string()
    };
    if !extra.trim().is_empty() {
        number.push_str(separator);
        number.push_str(extra);
    }
    number
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_room_wins() {
        assert_eq!(compose_door_number("1.02", "1.01", "", "-"), "1.02");
    }

    #[test]
    fn test_blank_to_room_falls_back() {
        assert_eq!(compose_door_number("  ", "1.01", "", "-"), "1.01");
        assert_eq!(compose_door_number("", "", "", "-"), "");
    }

    #[test]
    fn test_extra_appended() {
        assert_eq!(compose_door_number("1.02", "1.01", "a", "-"), "1.02-a");
        assert_eq!(compose_door_number("1.02", "", " ", "-"), "1.02");
        assert_eq!(compose_door_number("", "", "b", "/"), "/b");
    }
}
