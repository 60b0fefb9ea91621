//! Generated population: records, index maps, and the files written for
//! downstream consumers

pub mod codec;
pub mod export;
pub mod index_map;
pub mod model;
pub mod records;
pub mod stats;
pub mod summary;

pub use codec::{read_population, write_population, PopulationFile};
pub use export::{write_geojson, zones_feature_collection};
pub use index_map::IdMap;
pub use model::PopulationModel;
pub use records::{Family, FamilyRecord, Person};
pub use stats::GenerationStats;
pub use summary::PopulationSummary;
