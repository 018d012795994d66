use serde::{Deserialize, Deserializer, Serialize};

/// Six base stats. Absent or null fields read as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    #[serde(rename = "HP", default, deserialize_with = "stat_or_zero")]
    pub hp: u32,
    #[serde(rename = "Attack", default, deserialize_with = "stat_or_zero")]
    pub attack: u32,
    #[serde(rename = "Defense", default, deserialize_with = "stat_or_zero")]
    pub defense: u32,
    #[serde(
        rename = "SpecialAttack",
        alias = "Sp. Attack",
        default,
        deserialize_with = "stat_or_zero"
    )]
    pub special_attack: u32,
    #[serde(
        rename = "SpecialDefense",
        alias = "Sp. Defense",
        default,
        deserialize_with = "stat_or_zero"
    )]
    pub special_defense: u32,
    #[serde(rename = "Speed", default, deserialize_with = "stat_or_zero")]
    pub speed: u32,
}

impl BaseStats {
    pub fn total(&self) -> u64 {
        [
            self.hp,
            self.attack,
            self.defense,
            self.special_attack,
            self.special_defense,
            self.speed,
        ]
        .iter()
        .map(|&v| u64::from(v))
        .sum()
    }
}

/// Localized display names. Resolution order: english, french, japanese, chinese.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub french: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub japanese: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chinese: Option<String>,
}

impl LocalizedName {
    pub fn english(name: impl Into<String>) -> Self {
        Self {
            english: Some(name.into()),
            ..Self::default()
        }
    }

    /// First non-empty name in resolution order.
    pub fn preferred(&self) -> Option<&str> {
        [&self.english, &self.french, &self.japanese, &self.chinese]
            .into_iter()
            .filter_map(|n| n.as_deref())
            .map(str::trim)
            .find(|n| !n.is_empty())
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        [&self.english, &self.french, &self.japanese, &self.chinese]
            .into_iter()
            .filter_map(|n| n.as_deref())
            .any(|n| n.trim().eq_ignore_ascii_case(query))
    }

    /// Case-insensitive substring match on any localized name. A blank query matches.
    pub fn contains(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        [&self.english, &self.french, &self.japanese, &self.chinese]
            .into_iter()
            .filter_map(|n| n.as_deref())
            .any(|n| n.to_lowercase().contains(&query))
            || query.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: LocalizedName,
    #[serde(rename = "type", default)]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub base: BaseStats,
}

impl Creature {
    pub fn new(id: impl Into<String>, english_name: impl Into<String>, base: BaseStats) -> Self {
        Self {
            id: id.into(),
            name: LocalizedName::english(english_name),
            types: Vec::new(),
            image: None,
            base,
        }
    }

    /// Name used in battle logs; falls back to the id when no name is set.
    pub fn display_name(&self) -> &str {
        self.name.preferred().unwrap_or(self.id.as_str())
    }

    pub fn has_type(&self, wanted: &str) -> bool {
        self.types.iter().any(|t| t.eq_ignore_ascii_case(wanted.trim()))
    }
}

fn stat_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}
