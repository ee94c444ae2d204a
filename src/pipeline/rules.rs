//! Keyword rules shared by the translation instruction and the response filter.
//!
//! A rule fires when its keyword appears anywhere in the lower-cased prompt.
//! A firing rule may enable a query flag, select a view category, or both.

use super::QueryFlag;

/// Sections of a provider response the client knows how to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Wind,
    Waves,
    BatteryVoltage,
    Humidity,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Wind,
        Category::Waves,
        Category::BatteryVoltage,
        Category::Humidity,
    ];

    /// Field name in the provider payload, also used as the view key.
    pub fn field(self) -> &'static str {
        match self {
            Category::Wind => "wind",
            Category::Waves => "waves",
            Category::BatteryVoltage => "batteryVoltage",
            Category::Humidity => "humidity",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub keyword: &'static str,
    pub flag: Option<QueryFlag>,
    pub category: Option<Category>,
}

pub const KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        keyword: "wind",
        flag: Some(QueryFlag::WindData),
        category: Some(Category::Wind),
    },
    KeywordRule {
        keyword: "battery",
        flag: Some(QueryFlag::BatteryStatus),
        category: Some(Category::BatteryVoltage),
    },
    KeywordRule {
        keyword: "wave directions",
        flag: Some(QueryFlag::DirectionalMoments),
        category: None,
    },
    KeywordRule {
        keyword: "surface temperature",
        flag: Some(QueryFlag::SurfaceTempData),
        category: None,
    },
    KeywordRule {
        keyword: "wave",
        flag: None,
        category: Some(Category::Waves),
    },
    KeywordRule {
        keyword: "humidity",
        flag: None,
        category: Some(Category::Humidity),
    },
];

fn matching(prompt: &str) -> impl Iterator<Item = &'static KeywordRule> {
    let prompt = prompt.to_lowercase();
    KEYWORD_RULES
        .iter()
        .filter(move |rule| prompt.contains(rule.keyword))
}

/// Flags the rule set enables for `prompt`, in table order.
pub fn flags_for(prompt: &str) -> Vec<QueryFlag> {
    let mut flags = Vec::new();
    for flag in matching(prompt).filter_map(|rule| rule.flag) {
        if !flags.contains(&flag) {
            flags.push(flag);
        }
    }
    flags
}

/// Categories the prompt asks to see, in [`Category::ALL`] order.
pub fn categories_for(prompt: &str) -> Vec<Category> {
    let requested: Vec<Category> = matching(prompt).filter_map(|rule| rule.category).collect();
    Category::ALL
        .into_iter()
        .filter(|category| requested.contains(category))
        .collect()
}

/// Rule lines for the translation instruction, one per flag-setting rule.
pub fn instruction_lines() -> Vec<String> {
    KEYWORD_RULES
        .iter()
        .filter_map(|rule| {
            rule.flag.map(|flag| {
                format!(
                    "- If user mentions \"{}\", set {} = true.",
                    rule.keyword,
                    flag.param_name()
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wind_and_battery_prompt_sets_both_flags() {
        let flags = flags_for("show me wind speed and battery");
        assert_eq!(flags, vec![QueryFlag::WindData, QueryFlag::BatteryStatus]);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(flags_for("SURFACE Temperature please"), vec![QueryFlag::SurfaceTempData]);
        assert_eq!(categories_for("How is the HUMIDITY?"), vec![Category::Humidity]);
    }

    #[test]
    fn test_wave_directions_enables_moments_and_waves_view() {
        assert_eq!(flags_for("wave directions today"), vec![QueryFlag::DirectionalMoments]);
        assert_eq!(categories_for("wave directions today"), vec![Category::Waves]);
    }

    #[test]
    fn test_unrelated_prompt_matches_nothing() {
        assert!(flags_for("what time is it").is_empty());
        assert!(categories_for("what time is it").is_empty());
    }

    #[test]
    fn test_categories_follow_canonical_order() {
        assert_eq!(
            categories_for("humidity, battery, waves and wind"),
            vec![
                Category::Wind,
                Category::Waves,
                Category::BatteryVoltage,
                Category::Humidity
            ]
        );
    }

    #[test]
    fn test_instruction_lines_cover_every_flag_rule() {
        let lines = instruction_lines();
        assert_eq!(lines.len(), 4);
        assert!(lines.contains(&"- If user mentions \"battery\", set includeBatteryStatus = true.".to_string()));
        assert!(lines.iter().all(|line| !line.contains("humidity")));
    }
}
