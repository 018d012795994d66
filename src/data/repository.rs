//! Read-only creature catalog. The JSON loader accepts the two shapes the listing
//! endpoint returns: a bare array, or an envelope object with `items` or `pokemons`.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::data::creature::Creature;
use crate::data::error::DataError;

pub const DEFAULT_CREATURES_PATH: &str = "data/creatures.json";

pub const DEFAULT_PAGE_LIMIT: usize = 20;

pub trait CreatureRepository {
    fn all(&self) -> &[Creature];

    fn get(&self, id: &str) -> Option<&Creature> {
        let id = id.trim();
        self.all().iter().find(|c| c.id == id)
    }

    /// Case-insensitive match on any localized name.
    fn find_by_name(&self, name: &str) -> Option<&Creature> {
        self.all().iter().find(|c| c.name.matches(name))
    }

    /// Id first, then name.
    fn resolve(&self, id_or_name: &str) -> Option<&Creature> {
        self.get(id_or_name).or_else(|| self.find_by_name(id_or_name))
    }

    fn require(&self, id_or_name: &str) -> Result<&Creature, DataError> {
        self.resolve(id_or_name)
            .ok_or_else(|| DataError::not_found(id_or_name))
    }

    /// One page of the catalog, optionally restricted to a type and a name fragment.
    fn list(&self, query: &ListQuery) -> CreaturePage<'_> {
        let filtered: Vec<&Creature> = self
            .all()
            .iter()
            .filter(|c| query.type_filter.as_deref().map_or(true, |t| c.has_type(t)))
            .filter(|c| query.search.as_deref().map_or(true, |q| c.name.contains(q)))
            .collect();
        let limit = query.limit.max(1);
        let page = query.page.max(1);
        let total = filtered.len();
        let total_pages = total.div_ceil(limit).max(1);
        let items = filtered
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();
        debug!(page, limit, total, "listed creatures");
        CreaturePage {
            items,
            page,
            limit,
            total,
            total_pages,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Bare(Vec<Creature>),
    Envelope {
        #[serde(alias = "pokemons")]
        items: Vec<Creature>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct JsonCreatureRepository {
    creatures: Vec<Creature>,
}

impl JsonCreatureRepository {
    pub fn new(creatures: Vec<Creature>) -> Result<Self, DataError> {
        let mut seen = HashSet::new();
        for creature in &creatures {
            if !seen.insert(creature.id.as_str()) {
                return Err(DataError::DuplicateId(creature.id.clone()));
            }
        }
        Ok(Self { creatures })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, DataError> {
        let creatures = match serde_json::from_str::<CatalogFile>(raw) {
            Ok(CatalogFile::Bare(items)) | Ok(CatalogFile::Envelope { items }) => items,
            // Untagged errors are opaque; reparse as a bare list for a useful message.
            Err(_) => serde_json::from_str::<Vec<Creature>>(raw)?,
        };
        Self::new(creatures)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let repo = Self::from_json_str(&raw)?;
        info!(path = %path.display(), count = repo.creatures.len(), "loaded creature catalog");
        Ok(repo)
    }

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }
}

impl CreatureRepository for JsonCreatureRepository {
    fn all(&self) -> &[Creature] {
        &self.creatures
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: usize,
    pub limit: usize,
    pub type_filter: Option<String>,
    /// Name fragment, matched case-insensitively against every localized name.
    pub search: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            type_filter: None,
            search: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreaturePage<'a> {
    pub items: Vec<&'a Creature>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"[
        {"id": 1, "name": {"english": "Bulbasaur", "french": "Bulbizarre"}, "type": ["Grass", "Poison"], "base": {"HP": 45}},
        {"id": 4, "name": {"english": "Charmander"}, "type": ["Fire"], "base": {"HP": 39}},
        {"id": 7, "name": {"english": "Squirtle"}, "type": ["Water"], "base": {"HP": 44}}
    ]"#;

    #[test]
    fn resolves_by_id_then_localized_name() {
        let repo = JsonCreatureRepository::from_json_str(CATALOG).expect("catalog should load");
        assert_eq!(repo.resolve("4").map(|c| c.display_name()), Some("Charmander"));
        assert_eq!(repo.resolve("bulbizarre").map(|c| c.id.as_str()), Some("1"));
        assert!(repo.resolve("Mew").is_none());
    }

    #[test]
    fn require_reports_the_missing_key() {
        let repo = JsonCreatureRepository::from_json_str(CATALOG).expect("catalog should load");
        assert_eq!(repo.require("squirtle").map(|c| c.id.as_str()).ok(), Some("7"));
        let err = repo.require("Mew").expect_err("Mew is not in the catalog");
        assert!(matches!(&err, DataError::NotFound(key) if key == "Mew"));
        assert_eq!(err.to_string(), "creature not found: Mew");
    }

    #[test]
    fn envelope_shapes_are_accepted() {
        let items = format!(r#"{{"items": {CATALOG}, "total": 3}}"#);
        let pokemons = format!(r#"{{"pokemons": {CATALOG}}}"#);
        assert_eq!(JsonCreatureRepository::from_json_str(&items).map(|r| r.len()).ok(), Some(3));
        assert_eq!(JsonCreatureRepository::from_json_str(&pokemons).map(|r| r.len()).ok(), Some(3));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = JsonCreatureRepository::from_json_str(r#"[{"id": 1}, {"id": "1"}]"#)
            .expect_err("duplicate should fail");
        assert!(matches!(err, DataError::DuplicateId(id) if id == "1"));
    }

    #[test]
    fn list_filters_by_type_and_paginates() {
        let repo = JsonCreatureRepository::from_json_str(CATALOG).expect("catalog should load");

        let fire = repo.list(&ListQuery {
            type_filter: Some("fire".to_string()),
            ..ListQuery::default()
        });
        assert_eq!(fire.total, 1);
        assert_eq!(fire.items[0].id, "4");

        let second = repo.list(&ListQuery {
            page: 2,
            limit: 2,
            ..ListQuery::default()
        });
        assert_eq!(second.total_pages, 2);
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].id, "7");
    }

    #[test]
    fn search_matches_name_fragments_in_any_language() {
        let repo = JsonCreatureRepository::from_json_str(CATALOG).expect("catalog should load");
        let search = |q: &str| {
            repo.list(&ListQuery {
                search: Some(q.to_string()),
                ..ListQuery::default()
            })
            .items
            .iter()
            .map(|c| c.id.clone())
            .collect::<Vec<_>>()
        };

        assert_eq!(search("SAUR"), vec!["1"]);
        assert_eq!(search("izar"), vec!["1"]);
        assert_eq!(search("r"), vec!["1", "4", "7"]);
        assert!(search("pika").is_empty());
    }

    #[test]
    fn search_combines_with_type_filter() {
        let repo = JsonCreatureRepository::from_json_str(CATALOG).expect("catalog should load");
        let page = repo.list(&ListQuery {
            type_filter: Some("water".to_string()),
            search: Some("char".to_string()),
            ..ListQuery::default()
        });
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn empty_catalog_still_reports_one_page() {
        let repo = JsonCreatureRepository::default();
        assert_eq!(repo.list(&ListQuery::default()).total_pages, 1);
    }
}
