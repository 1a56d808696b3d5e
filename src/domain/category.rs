use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named, colored bucket that tasks refer to by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    /// Always stored lowercase
    pub name: String,
    /// Hex color like `#4361EE`
    pub color: String,
}

impl Category {
    pub fn new(name: &str, color: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_lowercase(),
            color: color.to_string(),
        }
    }

    /// Case-insensitive name comparison
    pub fn matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// Categories seeded on first run
pub fn default_categories() -> Vec<Category> {
    [
        ("1", "work", "#4361EE"),
        ("2", "study", "#7209B7"),
        ("3", "leisure", "#F72585"),
        ("4", "other", "#4CC9F0"),
    ]
    .into_iter()
    .map(|(id, name, color)| Category {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
    })
    .collect()
}

/// Validate a `#RRGGBB` hex color
pub fn is_valid_hex(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse a `#RRGGBB` hex color into its components
pub fn parse_hex(s: &str) -> Option<(u8, u8, u8)> {
    if !is_valid_hex(s) {
        return None;
    }
    let r = u8::from_str_radix(&s[1..3], 16).ok()?;
    let g = u8::from_str_radix(&s[3..5], 16).ok()?;
    let b = u8::from_str_radix(&s[5..7], 16).ok()?;
    Some((r, g, b))
}
