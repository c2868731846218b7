//! The closed category vocabulary and its color palette.
//!
//! Category-to-color is a total function: every variant has a color, and
//! deserialization maps any out-of-vocabulary name to `Unknown` rather than
//! failing, so an unexpected tag can never break rendering.

use eframe::egui::Color32;
use serde::Deserialize;

/// A creature category tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Normal,
    Fighting,
    Flying,
    Poison,
    Ground,
    Rock,
    Bug,
    Ghost,
    Steel,
    Fire,
    Water,
    Grass,
    Electric,
    Psychic,
    Ice,
    Dragon,
    Dark,
    Fairy,
    Shadow,
    /// Fallback for any name outside the known vocabulary
    #[serde(other)]
    Unknown,
}

impl Category {
    /// Get all known categories
    pub fn all() -> &'static [Category] {
        &[
            Category::Normal,
            Category::Fighting,
            Category::Flying,
            Category::Poison,
            Category::Ground,
            Category::Rock,
            Category::Bug,
            Category::Ghost,
            Category::Steel,
            Category::Fire,
            Category::Water,
            Category::Grass,
            Category::Electric,
            Category::Psychic,
            Category::Ice,
            Category::Dragon,
            Category::Dark,
            Category::Fairy,
            Category::Shadow,
            Category::Unknown,
        ]
    }

    /// Get the lowercase display label
    pub fn name(&self) -> &'static str {
        match self {
            Category::Normal => "normal",
            Category::Fighting => "fighting",
            Category::Flying => "flying",
            Category::Poison => "poison",
            Category::Ground => "ground",
            Category::Rock => "rock",
            Category::Bug => "bug",
            Category::Ghost => "ghost",
            Category::Steel => "steel",
            Category::Fire => "fire",
            Category::Water => "water",
            Category::Grass => "grass",
            Category::Electric => "electric",
            Category::Psychic => "psychic",
            Category::Ice => "ice",
            Category::Dragon => "dragon",
            Category::Dark => "dark",
            Category::Fairy => "fairy",
            Category::Shadow => "shadow",
            Category::Unknown => "unknown",
        }
    }

    /// Get the badge/background color for this category
    pub fn color(&self) -> Color32 {
        match self {
            Category::Normal => Color32::from_rgb(0xA8, 0xA7, 0x7A),
            Category::Fighting => Color32::from_rgb(0xC2, 0x2E, 0x28),
            Category::Flying => Color32::from_rgb(0xA9, 0x8F, 0xF3),
            Category::Poison => Color32::from_rgb(0xA3, 0x3E, 0xA1),
            Category::Ground => Color32::from_rgb(0xE2, 0xBF, 0x65),
            Category::Rock => Color32::from_rgb(0xB6, 0xA1, 0x36),
            Category::Bug => Color32::from_rgb(0xA6, 0xB9, 0x1A),
            Category::Ghost => Color32::from_rgb(0x73, 0x57, 0x97),
            Category::Steel => Color32::from_rgb(0xB7, 0xB7, 0xCE),
            Category::Fire => Color32::from_rgb(0xEE, 0x81, 0x30),
            Category::Water => Color32::from_rgb(0x63, 0x90, 0xF0),
            Category::Grass => Color32::from_rgb(0x7A, 0xC7, 0x4C),
            Category::Electric => Color32::from_rgb(0xF7, 0xD0, 0x2C),
            Category::Psychic => Color32::from_rgb(0xF9, 0x55, 0x87),
            Category::Ice => Color32::from_rgb(0x96, 0xD9, 0xD6),
            Category::Dragon => Color32::from_rgb(0x6F, 0x35, 0xFC),
            Category::Dark => Color32::from_rgb(0x70, 0x57, 0x46),
            Category::Fairy => Color32::from_rgb(0xD6, 0x85, 0xAD),
            Category::Shadow => Color32::from_rgb(0x33, 0x33, 0x33),
            Category::Unknown => Color32::from_rgb(0xAA, 0xAA, 0xAA),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_deserialize_to_their_variant() {
        let electric: Category = serde_json::from_str(r#""electric""#).unwrap();
        assert_eq!(electric, Category::Electric);

        let shadow: Category = serde_json::from_str(r#""shadow""#).unwrap();
        assert_eq!(shadow, Category::Shadow);
    }

    #[test]
    fn out_of_vocabulary_name_is_unknown() {
        let mystery: Category = serde_json::from_str(r#""plasma""#).unwrap();
        assert_eq!(mystery, Category::Unknown);
    }

    #[test]
    fn every_category_has_a_distinct_label() {
        let mut labels: Vec<&str> = Category::all().iter().map(|c| c.name()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), Category::all().len());
    }

    #[test]
    fn unknown_has_the_fallback_color() {
        assert_eq!(Category::Unknown.color(), Color32::from_rgb(0xAA, 0xAA, 0xAA));
    }
}
