pub mod creature;
pub mod error;
pub mod repository;

pub use creature::{BaseStats, Creature, LocalizedName};
pub use error::DataError;
pub use repository::{
    CreaturePage, CreatureRepository, JsonCreatureRepository, ListQuery, DEFAULT_CREATURES_PATH,
    DEFAULT_PAGE_LIMIT,
};
