//! Superhero schema and a small sample dataset
//!
//! The schema mirrors the catalog the reports are written against: lookup
//! tables referenced by `superhero`, plus the `hero_power` and
//! `hero_attribute` junction tables.

use crate::reader::connection::ConnectOptions;
use crate::reader::DuckDBReader;
use crate::{HeroscopeError, Result};
use std::path::Path;
use tracing::info;

/// DDL for the superhero catalog
pub const SCHEMA_SQL: &str = "
CREATE TABLE alignment (id INTEGER PRIMARY KEY, alignment VARCHAR);
CREATE TABLE attribute (id INTEGER PRIMARY KEY, attribute_name VARCHAR);
CREATE TABLE colour (id INTEGER PRIMARY KEY, colour VARCHAR);
CREATE TABLE gender (id INTEGER PRIMARY KEY, gender VARCHAR);
CREATE TABLE publisher (id INTEGER PRIMARY KEY, publisher_name VARCHAR);
CREATE TABLE race (id INTEGER PRIMARY KEY, race VARCHAR);
CREATE TABLE superpower (id INTEGER PRIMARY KEY, power_name VARCHAR);
CREATE TABLE superhero (
    id INTEGER PRIMARY KEY,
    superhero_name VARCHAR,
    full_name VARCHAR,
    gender_id INTEGER REFERENCES gender(id),
    eye_colour_id INTEGER REFERENCES colour(id),
    hair_colour_id INTEGER REFERENCES colour(id),
    skin_colour_id INTEGER REFERENCES colour(id),
    race_id INTEGER REFERENCES race(id),
    publisher_id INTEGER REFERENCES publisher(id),
    alignment_id INTEGER REFERENCES alignment(id),
    height_cm INTEGER,
    weight_kg INTEGER
);
CREATE TABLE hero_attribute (
    hero_id INTEGER REFERENCES superhero(id),
    attribute_id INTEGER REFERENCES attribute(id),
    attribute_value INTEGER
);
CREATE TABLE hero_power (
    hero_id INTEGER REFERENCES superhero(id),
    power_id INTEGER REFERENCES superpower(id)
);
";

/// Sample rows covering every report (including NULL attributes)
pub const SAMPLE_DATA_SQL: &str = "
INSERT INTO alignment VALUES (1, 'Good'), (2, 'Bad'), (3, 'Neutral');
INSERT INTO gender VALUES (1, 'Male'), (2, 'Female'), (3, 'N/A');
INSERT INTO colour VALUES
    (1, 'No Colour'), (2, 'Blue'), (3, 'Brown'), (4, 'Green'),
    (5, 'Black'), (6, 'Red'), (7, 'White'), (8, 'Blond');
INSERT INTO race VALUES
    (1, 'Human'), (2, 'Mutant'), (3, 'Kryptonian'),
    (4, 'Asgardian'), (5, 'Android'), (6, 'Amazon');
INSERT INTO publisher VALUES (1, 'Marvel Comics'), (2, 'DC Comics'), (3, 'Dark Horse Comics');
INSERT INTO attribute VALUES
    (1, 'Intelligence'), (2, 'Strength'), (3, 'Speed'),
    (4, 'Durability'), (5, 'Power'), (6, 'Combat');
INSERT INTO superpower VALUES
    (1, 'Agility'), (2, 'Super Strength'), (3, 'Flight'), (4, 'Stamina'),
    (5, 'Durability'), (6, 'Intelligence'), (7, 'Weather Control'),
    (8, 'Telepathy'), (9, 'Accelerated Healing'), (10, 'Super Speed');
INSERT INTO superhero VALUES
    (1, 'Superman', 'Clark Kent', 1, 2, 5, 1, 3, 2, 1, 191, 101),
    (2, 'Batman', 'Bruce Wayne', 1, 2, 5, 1, 1, 2, 1, 188, 95),
    (3, 'Wonder Woman', 'Diana Prince', 2, 2, 5, 1, 6, 2, 1, 183, 74),
    (4, 'Storm', 'Ororo Munroe', 2, 3, 7, 1, 2, 1, 1, 180, 57),
    (5, 'Magneto', 'Max Eisenhardt', 1, 2, 7, 1, 2, 1, 2, 188, 86),
    (6, 'Thor', 'Thor Odinson', 1, 2, 8, 1, 4, 1, 1, 198, 288),
    (7, 'Joker', 'Jack Napier', 1, 4, 4, 7, 1, 2, 2, 196, 86),
    (8, 'Vision', NULL, 1, 6, 1, 6, 5, 1, 1, 191, 135),
    (9, 'Hellboy', 'Anung Un Rama', 1, 3, 5, 6, 1, 3, 1, 259, 158),
    (10, 'Rogue', 'Anna Marie', 2, 4, 3, 1, 2, 1, 1, 173, 54),
    (11, 'Deadpool', 'Wade Wilson', 1, 3, 1, 1, 2, 1, 3, 188, 95),
    (12, 'Unknown Drifter', NULL, 3, NULL, NULL, NULL, NULL, 3, 3, NULL, NULL);
INSERT INTO hero_power VALUES
    (1, 1), (1, 2), (1, 3), (1, 4), (1, 5), (1, 9), (1, 10),
    (2, 1), (2, 4), (2, 6),
    (3, 1), (3, 2), (3, 3), (3, 4), (3, 5),
    (4, 1), (4, 3), (4, 7),
    (5, 3), (5, 5), (5, 6),
    (6, 2), (6, 3), (6, 4), (6, 5), (6, 7),
    (7, 6),
    (8, 2), (8, 3), (8, 5), (8, 6),
    (9, 2), (9, 4), (9, 5), (9, 9),
    (10, 2), (10, 3), (10, 4),
    (11, 1), (11, 4), (11, 9);
INSERT INTO hero_attribute VALUES
    (1, 1, 95), (1, 2, 100), (1, 3, 100), (1, 4, 100), (1, 5, 95), (1, 6, 85),
    (2, 1, 100), (2, 6, 100),
    (3, 2, 100), (3, 3, 75), (3, 4, 100), (3, 6, 100),
    (4, 1, 80), (4, 5, 100),
    (5, 1, 90), (5, 5, 100),
    (6, 2, 100), (6, 4, 100), (6, 5, 100),
    (7, 1, 100),
    (8, 1, 100), (8, 2, 75), (8, 5, 90),
    (9, 2, 85), (9, 4, 90), (9, 6, 75),
    (10, 2, 60), (10, 4, 70),
    (11, 4, 100), (11, 6, 90);
";

/// Create the superhero schema (empty tables)
pub fn load_schema(reader: &DuckDBReader) -> Result<()> {
    reader.execute_batch(SCHEMA_SQL)
}

/// Create the superhero schema and fill it with the sample dataset
pub fn load_sample_data(reader: &DuckDBReader) -> Result<()> {
    load_schema(reader)?;
    reader.execute_batch(SAMPLE_DATA_SQL)?;
    info!("Loaded sample superhero dataset");
    Ok(())
}

/// Create a new DuckDB file holding the schema and the sample dataset
///
/// Refuses to touch an existing file.
pub fn seed_database(path: &Path) -> Result<DuckDBReader> {
    if path.exists() {
        return Err(HeroscopeError::ValidationError(format!(
            "'{}' already exists",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            HeroscopeError::InternalError(format!(
                "Failed to create directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Opening a missing file through the reader is an error, so create it first
    duckdb::Connection::open(path).map_err(|e| {
        HeroscopeError::ConnectionError(format!(
            "Failed to create DuckDB file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let uri = format!("duckdb://{}", path.display());
    let reader = DuckDBReader::open(&uri, &ConnectOptions::default())?;
    load_sample_data(&reader)?;
    info!("Seeded {}", path.display());
    Ok(reader)
}
