//! The static report definitions
//!
//! Every ranking orders by its metric descending and then by the grouping
//! name(s) ascending, so equal counts always come back in the same order.

use crate::report::{ChartBindings, ChartSpec, Palette, ParamSpec, Presentation, ReportDefinition};

const TOP_DESCRIPTION: &str = "Number of entries to show";

fn top_param() -> ParamSpec {
    ParamSpec::integer("top", 10, TOP_DESCRIPTION)
}

/// Build every report definition, in catalog order
pub fn definitions() -> Vec<ReportDefinition> {
    vec![
        top_powers(),
        top_attributes(),
        gender_distribution(),
        race_distribution(),
        top_publishers(),
        top_heroes_by_power_count(),
        alignment_distribution(),
        heroes_with_power(),
        compare_two_heroes(),
        attributes_by_gender(),
        powers_by_publisher(),
        physical_traits_by_alignment(),
        power_combo_frequency(),
        similar_heroes(),
        publishers_by_alignment(),
        physical_traits(),
        height_vs_weight(),
    ]
}

// =============================================================================
// Rankings and distributions
// =============================================================================

fn top_powers() -> ReportDefinition {
    ReportDefinition {
        id: "top-powers",
        title: "TOP {top} Poderes más Populares",
        description: "Powers held by the most heroes",
        sql: "SELECT sp.power_name, COUNT(hp.hero_id) AS hero_count
              FROM superpower sp
              JOIN hero_power hp ON sp.id = hp.power_id
              GROUP BY sp.power_name
              ORDER BY hero_count DESC, sp.power_name
              LIMIT ?",
        params: vec![top_param()],
        binds: vec!["top"],
        columns: vec!["Poder", "Cantidad de Héroes"],
        chart: Some(
            ChartSpec::new(
                Presentation::HorizontalBar,
                ChartBindings::new("Poder", "Cantidad de Héroes"),
                Palette::Magma,
            )
            .with_labels("Poder", "Cantidad de superhéroes"),
        ),
    }
}

fn top_attributes() -> ReportDefinition {
    ReportDefinition {
        id: "top-attributes",
        title: "TOP {top} Atributos más Comunes",
        description: "Attributes recorded for the most heroes",
        sql: "SELECT a.attribute_name, COUNT(ha.hero_id) AS hero_count
              FROM attribute a
              JOIN hero_attribute ha ON a.id = ha.attribute_id
              GROUP BY a.attribute_name
              ORDER BY hero_count DESC, a.attribute_name
              LIMIT ?",
        params: vec![top_param()],
        binds: vec!["top"],
        columns: vec!["Atributo", "Cantidad de Héroes"],
        chart: None,
    }
}

fn gender_distribution() -> ReportDefinition {
    ReportDefinition {
        id: "gender-distribution",
        title: "Distribución de Superhéroes por Género",
        description: "Number of heroes per gender",
        sql: "SELECT g.gender, COUNT(s.id) AS hero_count
              FROM gender g
              JOIN superhero s ON g.id = s.gender_id
              GROUP BY g.gender
              ORDER BY hero_count DESC, g.gender",
        params: vec![],
        binds: vec![],
        columns: vec!["Género", "Cantidad de Superhéroes"],
        chart: Some(ChartSpec::new(
            Presentation::Pie,
            ChartBindings::new("Género", "Cantidad de Superhéroes"),
            Palette::Pastel,
        )),
    }
}

fn race_distribution() -> ReportDefinition {
    ReportDefinition {
        id: "race-distribution",
        title: "Distribución de Superhéroes por Raza",
        description: "Number of heroes per race",
        sql: "SELECT r.race, COUNT(s.id) AS hero_count
              FROM race r
              JOIN superhero s ON r.id = s.race_id
              GROUP BY r.race
              ORDER BY hero_count DESC, r.race",
        params: vec![],
        binds: vec![],
        columns: vec!["Raza", "Cantidad de Superhéroes"],
        chart: None,
    }
}

fn top_publishers() -> ReportDefinition {
    ReportDefinition {
        id: "top-publishers",
        title: "TOP {top} Editoriales con más Superhéroes",
        description: "Publishers with the most heroes",
        sql: "SELECT p.publisher_name, COUNT(s.id) AS hero_count
              FROM publisher p
              JOIN superhero s ON p.id = s.publisher_id
              GROUP BY p.publisher_name
              ORDER BY hero_count DESC, p.publisher_name
              LIMIT ?",
        params: vec![top_param()],
        binds: vec!["top"],
        columns: vec!["Editorial", "Cantidad de Superhéroes"],
        chart: None,
    }
}

fn top_heroes_by_power_count() -> ReportDefinition {
    ReportDefinition {
        id: "top-heroes-by-power-count",
        title: "TOP {top} Superhéroes con más Poderes",
        description: "Heroes holding the most powers",
        sql: "SELECT s.superhero_name, COUNT(hp.power_id) AS power_count
              FROM superhero s
              JOIN hero_power hp ON s.id = hp.hero_id
              GROUP BY s.superhero_name
              ORDER BY power_count DESC, s.superhero_name
              LIMIT ?",
        params: vec![top_param()],
        binds: vec!["top"],
        columns: vec!["Superhéroe", "Cantidad de Poderes"],
        chart: Some(
            ChartSpec::new(
                Presentation::Bar,
                ChartBindings::new("Superhéroe", "Cantidad de Poderes"),
                Palette::Viridis,
            )
            .with_labels("Superhéroes", "Cantidad de poderes"),
        ),
    }
}

fn alignment_distribution() -> ReportDefinition {
    ReportDefinition {
        id: "alignment-distribution",
        title: "Distribución de Superhéroes por Alineación",
        description: "Number of heroes per alignment",
        sql: "SELECT a.alignment, COUNT(s.id) AS hero_count
              FROM alignment a
              JOIN superhero s ON a.id = s.alignment_id
              GROUP BY a.alignment
              ORDER BY hero_count DESC, a.alignment",
        params: vec![],
        binds: vec![],
        columns: vec!["Alineación", "Cantidad de Superhéroes"],
        chart: Some(ChartSpec::new(
            Presentation::Pie,
            ChartBindings::new("Alineación", "Cantidad de Superhéroes"),
            Palette::Set2,
        )),
    }
}

// =============================================================================
// Searches and comparisons
// =============================================================================

fn heroes_with_power() -> ReportDefinition {
    ReportDefinition {
        id: "heroes-with-power",
        title: "Superhéroes con poderes relacionados a '{power}'",
        description: "Heroes ranked by how many powers match a name substring",
        sql: "SELECT s.superhero_name, COUNT(hp.power_id) AS power_count
              FROM superhero s
              JOIN hero_power hp ON s.id = hp.hero_id
              JOIN superpower sp ON hp.power_id = sp.id
              WHERE sp.power_name ILIKE '%' || ? || '%'
              GROUP BY s.superhero_name
              ORDER BY power_count DESC, s.superhero_name
              LIMIT 10",
        params: vec![ParamSpec::text("power", "Power name substring")],
        binds: vec!["power"],
        columns: vec!["Superhéroe", "Cantidad de Poderes"],
        chart: None,
    }
}

fn compare_two_heroes() -> ReportDefinition {
    ReportDefinition {
        id: "compare-two-heroes",
        title: "Comparativa de poderes: {hero1} vs {hero2}",
        description: "Powers held by either of two heroes, with a presence flag per hero",
        sql: "SELECT sp.power_name,
                     MAX(CASE WHEN s.superhero_name = ? THEN 'Sí' ELSE 'No' END) AS first_hero,
                     MAX(CASE WHEN s.superhero_name = ? THEN 'Sí' ELSE 'No' END) AS second_hero
              FROM superpower sp
              JOIN hero_power hp ON sp.id = hp.power_id
              JOIN superhero s ON hp.hero_id = s.id
              WHERE s.superhero_name IN (?, ?)
              GROUP BY sp.power_name
              ORDER BY sp.power_name",
        params: vec![
            ParamSpec::text("hero1", "First hero name"),
            ParamSpec::text("hero2", "Second hero name"),
        ],
        binds: vec!["hero1", "hero2", "hero1", "hero2"],
        columns: vec!["Poder", "{hero1}", "{hero2}"],
        chart: None,
    }
}

fn attributes_by_gender() -> ReportDefinition {
    ReportDefinition {
        id: "attributes-by-gender",
        title: "Análisis de Atributos por Género",
        description: "Attribute counts within each gender",
        sql: "SELECT g.gender, a.attribute_name, COUNT(ha.hero_id) AS hero_count
              FROM gender g
              JOIN superhero s ON g.id = s.gender_id
              JOIN hero_attribute ha ON s.id = ha.hero_id
              JOIN attribute a ON ha.attribute_id = a.id
              GROUP BY g.gender, a.attribute_name
              ORDER BY g.gender, hero_count DESC, a.attribute_name",
        params: vec![],
        binds: vec![],
        columns: vec!["Género", "Atributo", "Cantidad de Héroes"],
        chart: None,
    }
}

fn powers_by_publisher() -> ReportDefinition {
    ReportDefinition {
        id: "powers-by-publisher",
        title: "Poderes más comunes en héroes de {publisher}",
        description: "Most common powers among heroes of publishers matching a name substring",
        sql: "SELECT sp.power_name, COUNT(hp.hero_id) AS hero_count
              FROM superpower sp
              JOIN hero_power hp ON sp.id = hp.power_id
              JOIN superhero s ON hp.hero_id = s.id
              JOIN publisher p ON s.publisher_id = p.id
              WHERE p.publisher_name ILIKE '%' || ? || '%'
              GROUP BY sp.power_name
              ORDER BY hero_count DESC, sp.power_name
              LIMIT 15",
        params: vec![ParamSpec::text("publisher", "Publisher name substring")],
        binds: vec!["publisher"],
        columns: vec!["Poder", "Cantidad de Héroes"],
        chart: None,
    }
}

fn physical_traits_by_alignment() -> ReportDefinition {
    ReportDefinition {
        id: "physical-traits-by-alignment",
        title: "Características Físicas por Alineación",
        description: "Eye, hair and skin colour counts within each alignment",
        sql: "SELECT alignment, trait, colour, hero_count
              FROM (
                  SELECT a.alignment, 1 AS trait_order, 'Color de ojos' AS trait,
                         c.colour, COUNT(s.id) AS hero_count
                  FROM alignment a
                  JOIN superhero s ON a.id = s.alignment_id
                  JOIN colour c ON s.eye_colour_id = c.id
                  GROUP BY a.alignment, c.colour
                  UNION ALL
                  SELECT a.alignment, 2, 'Color de cabello', c.colour, COUNT(s.id)
                  FROM alignment a
                  JOIN superhero s ON a.id = s.alignment_id
                  JOIN colour c ON s.hair_colour_id = c.id
                  GROUP BY a.alignment, c.colour
                  UNION ALL
                  SELECT a.alignment, 3, 'Color de piel', c.colour, COUNT(s.id)
                  FROM alignment a
                  JOIN superhero s ON a.id = s.alignment_id
                  JOIN colour c ON s.skin_colour_id = c.id
                  GROUP BY a.alignment, c.colour
              ) AS traits
              ORDER BY alignment, trait_order, hero_count DESC, colour",
        params: vec![],
        binds: vec![],
        columns: vec!["Alineación", "Característica", "Color", "Cantidad"],
        chart: None,
    }
}

fn power_combo_frequency() -> ReportDefinition {
    ReportDefinition {
        id: "power-combo-frequency",
        title: "TOP {top} Combinaciones de Poderes",
        description: "Pairs of powers most often held by the same hero",
        sql: "SELECT sp1.power_name AS first_power, sp2.power_name AS second_power,
                     COUNT(*) AS frequency
              FROM hero_power hp1
              JOIN hero_power hp2
                ON hp1.hero_id = hp2.hero_id AND hp1.power_id < hp2.power_id
              JOIN superpower sp1 ON hp1.power_id = sp1.id
              JOIN superpower sp2 ON hp2.power_id = sp2.id
              GROUP BY sp1.power_name, sp2.power_name
              ORDER BY frequency DESC, first_power, second_power
              LIMIT ?",
        params: vec![top_param()],
        binds: vec!["top"],
        columns: vec!["Poder 1", "Poder 2", "Frecuencia"],
        chart: None,
    }
}

fn similar_heroes() -> ReportDefinition {
    ReportDefinition {
        id: "similar-heroes",
        title: "Superhéroes similares a {hero}",
        description: "Heroes sharing gender, colours, race, publisher or alignment with a hero",
        sql: "WITH target AS (
                  SELECT superhero_name, gender_id, eye_colour_id, hair_colour_id,
                         skin_colour_id, race_id, publisher_id, alignment_id
                  FROM superhero
                  WHERE superhero_name = ?
                  ORDER BY id
                  LIMIT 1
              ),
              scored AS (
                  SELECT s.superhero_name,
                         CASE WHEN s.gender_id = t.gender_id THEN 1 ELSE 0 END
                       + CASE WHEN s.eye_colour_id = t.eye_colour_id THEN 1 ELSE 0 END
                       + CASE WHEN s.hair_colour_id = t.hair_colour_id THEN 1 ELSE 0 END
                       + CASE WHEN s.skin_colour_id = t.skin_colour_id THEN 1 ELSE 0 END
                       + CASE WHEN s.race_id = t.race_id THEN 1 ELSE 0 END
                       + CASE WHEN s.publisher_id = t.publisher_id THEN 1 ELSE 0 END
                       + CASE WHEN s.alignment_id = t.alignment_id THEN 1 ELSE 0 END
                         AS similarity
                  FROM superhero s
                  CROSS JOIN target t
                  WHERE s.superhero_name <> t.superhero_name
              )
              SELECT superhero_name, similarity
              FROM scored
              WHERE similarity >= 1
              ORDER BY similarity DESC, superhero_name
              LIMIT 10",
        params: vec![ParamSpec::text("hero", "Hero name")],
        binds: vec!["hero"],
        columns: vec!["Superhéroe", "Similitud"],
        chart: None,
    }
}

// =============================================================================
// Chart-first reports
// =============================================================================

fn publishers_by_alignment() -> ReportDefinition {
    ReportDefinition {
        id: "publishers-by-alignment",
        title: "TOP {top} editoriales por alineación de superhéroes",
        description: "Hero counts per alignment for the publishers with the most heroes",
        sql: "WITH ranked AS (
                  SELECT p.id, p.publisher_name, COUNT(s.id) AS total
                  FROM publisher p
                  JOIN superhero s ON p.id = s.publisher_id
                  JOIN alignment a ON s.alignment_id = a.id
                  GROUP BY p.id, p.publisher_name
                  ORDER BY total DESC, p.publisher_name
                  LIMIT ?
              )
              SELECT r.publisher_name, a.alignment, COUNT(s.id) AS hero_count
              FROM ranked r
              JOIN superhero s ON r.id = s.publisher_id
              JOIN alignment a ON s.alignment_id = a.id
              GROUP BY r.publisher_name, r.total, a.alignment
              ORDER BY r.total DESC, r.publisher_name, hero_count DESC, a.alignment",
        params: vec![top_param()],
        binds: vec!["top"],
        columns: vec!["Editorial", "Alineación", "Cantidad de Superhéroes"],
        chart: Some(
            ChartSpec::new(
                Presentation::StackedBar,
                ChartBindings::new("Editorial", "Cantidad de Superhéroes").with_hue("Alineación"),
                Palette::Bright,
            )
            .with_labels("Editorial", "Cantidad de superhéroes"),
        ),
    }
}

fn physical_traits() -> ReportDefinition {
    ReportDefinition {
        id: "physical-traits",
        title: "Distribución de Características Físicas",
        description: "Most common eye, hair and skin colours",
        sql: "SELECT trait, colour, hero_count
              FROM (
                  SELECT 1 AS trait_order, 'Color de ojos' AS trait, c.colour, COUNT(s.id) AS hero_count
                  FROM colour c
                  JOIN superhero s ON c.id = s.eye_colour_id
                  GROUP BY c.colour
                  UNION ALL
                  SELECT 2, 'Color de cabello', c.colour, COUNT(s.id)
                  FROM colour c
                  JOIN superhero s ON c.id = s.hair_colour_id
                  GROUP BY c.colour
                  UNION ALL
                  SELECT 3, 'Color de piel', c.colour, COUNT(s.id)
                  FROM colour c
                  JOIN superhero s ON c.id = s.skin_colour_id
                  GROUP BY c.colour
              ) AS traits
              ORDER BY trait_order, hero_count DESC, colour",
        params: vec![],
        binds: vec![],
        columns: vec!["Característica", "Color", "Cantidad de Superhéroes"],
        chart: Some(
            ChartSpec::new(
                Presentation::MultiPanel,
                ChartBindings::new("Color", "Cantidad de Superhéroes")
                    .with_panel("Característica"),
                Palette::Blues,
            )
            .with_palettes(vec![Palette::Blues, Palette::Reds, Palette::Greens])
            .with_max_categories(10),
        ),
    }
}

fn height_vs_weight() -> ReportDefinition {
    ReportDefinition {
        id: "height-vs-weight",
        title: "Relación entre altura y peso de superhéroes",
        description: "Height against weight for heroes with both recorded",
        sql: "SELECT s.superhero_name, s.height_cm, s.weight_kg, a.alignment, g.gender
              FROM superhero s
              JOIN alignment a ON s.alignment_id = a.id
              JOIN gender g ON s.gender_id = g.id
              WHERE s.height_cm IS NOT NULL AND s.weight_kg IS NOT NULL
              ORDER BY s.id
              LIMIT 100",
        params: vec![],
        binds: vec![],
        columns: vec![
            "Superhéroe",
            "Altura (cm)",
            "Peso (kg)",
            "Alineación",
            "Género",
        ],
        chart: Some(ChartSpec::new(
            Presentation::Scatter,
            ChartBindings::new("Altura (cm)", "Peso (kg)")
                .with_hue("Alineación")
                .with_style("Género"),
            Palette::Deep,
        )),
    }
}

#[cfg(test)]
mod tests {
    use crate::api::{self, PreparedReport};
    use crate::reader::{DuckDBReader, Value};
    use crate::report::ReportCatalog;
    use crate::sample::{load_sample_data, load_schema};
    use std::collections::{HashMap, HashSet};

    fn sample_reader() -> DuckDBReader {
        let reader = DuckDBReader::from_connection_string("duckdb://memory").unwrap();
        load_sample_data(&reader).unwrap();
        reader
    }

    fn run<'a>(
        reader: &DuckDBReader,
        catalog: &'a ReportCatalog,
        id: &str,
        pairs: &[(&str, &str)],
    ) -> PreparedReport<'a> {
        let params: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        api::prepare(reader, catalog, id, &params).unwrap()
    }

    fn column(report: &PreparedReport, idx: usize) -> Vec<Value> {
        report
            .result()
            .rows()
            .iter()
            .map(|row| row[idx].clone())
            .collect()
    }

    fn assert_non_increasing(values: &[Value]) {
        for pair in values.windows(2) {
            assert!(
                pair[0].as_i64() >= pair[1].as_i64(),
                "{:?} before {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_every_report_runs_on_sample_data() {
        let reader = sample_reader();
        let catalog = ReportCatalog::new();
        let text_values = [
            ("power", "super"),
            ("publisher", "marvel"),
            ("hero", "Superman"),
            ("hero1", "Superman"),
            ("hero2", "Batman"),
        ];

        for definition in catalog.definitions() {
            let report = run(&reader, &catalog, definition.id, &text_values);
            assert_eq!(
                report.result().columns().len(),
                definition.columns.len(),
                "{}",
                definition.id
            );
            assert!(!report.result().is_empty(), "{} returned no rows", definition.id);
        }
    }

    #[test]
    fn test_row_count_never_exceeds_top() {
        let reader = sample_reader();
        let catalog = ReportCatalog::new();
        for id in [
            "top-powers",
            "top-attributes",
            "top-publishers",
            "top-heroes-by-power-count",
            "power-combo-frequency",
        ] {
            for top in ["1", "2", "5"] {
                let report = run(&reader, &catalog, id, &[("top", top)]);
                assert!(report.result().len() <= top.parse().unwrap(), "{} top={}", id, top);
            }
            // Clamped to at least one row
            let report = run(&reader, &catalog, id, &[("top", "-3")]);
            assert_eq!(report.result().len(), 1, "{}", id);
        }
    }

    #[test]
    fn test_rankings_are_non_increasing() {
        let reader = sample_reader();
        let catalog = ReportCatalog::new();
        for id in [
            "top-powers",
            "top-attributes",
            "top-publishers",
            "top-heroes-by-power-count",
            "gender-distribution",
            "race-distribution",
            "alignment-distribution",
        ] {
            let report = run(&reader, &catalog, id, &[("top", "50")]);
            assert_non_increasing(&column(&report, 1));
        }
    }

    #[test]
    fn test_top_powers_ties_break_by_name() {
        let reader = sample_reader();
        let catalog = ReportCatalog::new();
        let report = run(&reader, &catalog, "top-powers", &[("top", "4")]);
        let names: Vec<String> = column(&report, 0).iter().map(|v| v.to_string()).collect();
        assert_eq!(names, vec!["Flight", "Stamina", "Durability", "Super Strength"]);
        assert_eq!(column(&report, 1)[0], Value::Int(7));
    }

    #[test]
    fn test_top_heroes_by_power_count() {
        let reader = sample_reader();
        let catalog = ReportCatalog::new();
        let report = run(&reader, &catalog, "top-heroes-by-power-count", &[("top", "3")]);
        assert_eq!(
            report.result().rows()[0],
            vec![Value::from("Superman"), Value::Int(7)]
        );
        assert_eq!(report.result().rows()[1][0], Value::from("Thor"));
        assert_eq!(report.result().rows()[2][0], Value::from("Wonder Woman"));
    }

    #[test]
    fn test_attributes_by_gender_sorted_within_gender() {
        let reader = sample_reader();
        let catalog = ReportCatalog::new();
        let report = run(&reader, &catalog, "attributes-by-gender", &[]);

        let mut by_gender: HashMap<String, Vec<Value>> = HashMap::new();
        for row in report.result().rows() {
            by_gender
                .entry(row[0].to_string())
                .or_default()
                .push(row[2].clone());
        }
        assert!(by_gender.len() >= 2);
        for counts in by_gender.values() {
            assert_non_increasing(counts);
        }
    }

    #[test]
    fn test_power_combos_have_no_duplicates_or_self_pairs() {
        let reader = sample_reader();
        let catalog = ReportCatalog::new();
        let report = run(&reader, &catalog, "power-combo-frequency", &[("top", "100")]);

        let mut seen = HashSet::new();
        for row in report.result().rows() {
            let a = row[0].to_string();
            let b = row[1].to_string();
            assert_ne!(a, b);
            let key = if a < b { (a, b) } else { (b, a) };
            assert!(seen.insert(key), "pair listed twice");
        }
        assert_non_increasing(&column(&report, 2));
    }

    #[test]
    fn test_heroes_with_power_is_case_insensitive() {
        let reader = sample_reader();
        let catalog = ReportCatalog::new();
        let report = run(&reader, &catalog, "heroes-with-power", &[("power", "SUPER")]);
        assert_eq!(
            report.result().rows()[0],
            vec![Value::from("Superman"), Value::Int(2)]
        );
        assert!(report.result().len() <= 10);
    }

    #[test]
    fn test_free_text_is_bound_not_spliced() {
        let reader = sample_reader();
        let catalog = ReportCatalog::new();
        let report = run(
            &reader,
            &catalog,
            "powers-by-publisher",
            &[("publisher", "x' OR '1'='1")],
        );
        assert!(report.result().is_empty());
        assert_eq!(reader.row_count("superhero").unwrap(), 12);
    }

    #[test]
    fn test_powers_by_publisher() {
        let reader = sample_reader();
        let catalog = ReportCatalog::new();
        let report = run(&reader, &catalog, "powers-by-publisher", &[("publisher", "marvel")]);
        assert_eq!(
            report.result().rows()[0],
            vec![Value::from("Flight"), Value::Int(5)]
        );
        assert!(report.result().len() <= 15);
    }

    #[test]
    fn test_compare_two_heroes() {
        let reader = sample_reader();
        let catalog = ReportCatalog::new();
        let report = run(
            &reader,
            &catalog,
            "compare-two-heroes",
            &[("hero1", "Superman"), ("hero2", "Batman")],
        );

        assert_eq!(report.result().columns(), &["Poder", "Superman", "Batman"]);
        assert_eq!(report.result().len(), 8);
        let intelligence = report
            .result()
            .rows()
            .iter()
            .find(|row| row[0] == Value::from("Intelligence"))
            .unwrap();
        assert_eq!(intelligence[1], Value::from("No"));
        assert_eq!(intelligence[2], Value::from("Sí"));
        let agility = report
            .result()
            .rows()
            .iter()
            .find(|row| row[0] == Value::from("Agility"))
            .unwrap();
        assert_eq!(agility[1], Value::from("Sí"));
        assert_eq!(agility[2], Value::from("Sí"));
    }

    #[test]
    fn test_similar_heroes_scores() {
        let reader = sample_reader();
        let catalog = ReportCatalog::new();
        let report = run(&reader, &catalog, "similar-heroes", &[("hero", "Superman")]);

        assert_eq!(report.result().len(), 10);
        assert_eq!(
            report.result().rows()[0],
            vec![Value::from("Batman"), Value::Int(6)]
        );
        assert_eq!(
            report.result().rows()[1],
            vec![Value::from("Wonder Woman"), Value::Int(5)]
        );
        for row in report.result().rows() {
            let score = row[1].as_i64().unwrap();
            assert!((1..=7).contains(&score));
            assert_ne!(row[0], Value::from("Superman"));
            // All attributes NULL, so never similar
            assert_ne!(row[0], Value::from("Unknown Drifter"));
        }
        assert_non_increasing(&column(&report, 1));
    }

    #[test]
    fn test_similar_heroes_identical_twin_scores_seven() {
        let reader = DuckDBReader::from_connection_string("duckdb://memory").unwrap();
        load_schema(&reader).unwrap();
        reader
            .execute_batch(
                "INSERT INTO gender VALUES (1, 'Male');
                 INSERT INTO colour VALUES (1, 'Blue'), (2, 'Black');
                 INSERT INTO race VALUES (1, 'Human');
                 INSERT INTO publisher VALUES (1, 'Marvel Comics');
                 INSERT INTO alignment VALUES (1, 'Good');
                 INSERT INTO superhero VALUES
                     (1, 'Original', NULL, 1, 1, 2, 1, 1, 1, 1, 180, 80),
                     (2, 'Twin', NULL, 1, 1, 2, 1, 1, 1, 1, 180, 80);",
            )
            .unwrap();
        let catalog = ReportCatalog::new();
        let report = run(&reader, &catalog, "similar-heroes", &[("hero", "Original")]);
        assert_eq!(
            report.result().rows(),
            &[vec![Value::from("Twin"), Value::Int(7)]]
        );
    }

    #[test]
    fn test_similar_heroes_excludes_namesakes() {
        let reader = sample_reader();
        // Same name and attributes as Batman, but a different row
        reader
            .execute_batch(
                "INSERT INTO superhero
                 SELECT 13, superhero_name, full_name, gender_id, eye_colour_id,
                        hair_colour_id, skin_colour_id, race_id, publisher_id,
                        alignment_id, height_cm, weight_kg
                 FROM superhero WHERE superhero_name = 'Batman'",
            )
            .unwrap();
        let catalog = ReportCatalog::new();
        let report = run(&reader, &catalog, "similar-heroes", &[("hero", "Batman")]);

        assert!(!report.result().is_empty());
        for row in report.result().rows() {
            assert_ne!(row[0], Value::from("Batman"));
        }
        assert_eq!(
            report.result().rows()[0],
            vec![Value::from("Superman"), Value::Int(6)]
        );
    }

    #[test]
    fn test_similar_heroes_shared_gender_and_alignment() {
        let reader = DuckDBReader::from_connection_string("duckdb://memory").unwrap();
        load_schema(&reader).unwrap();
        reader
            .execute_batch(
                "INSERT INTO gender VALUES (1, 'Female');
                 INSERT INTO colour VALUES (1, 'Blue'), (2, 'Green'), (3, 'Black'),
                     (4, 'Red'), (5, 'Gold'), (6, 'Grey');
                 INSERT INTO race VALUES (1, 'Human'), (2, 'Mutant');
                 INSERT INTO publisher VALUES (1, 'Marvel Comics'), (2, 'DC Comics');
                 INSERT INTO alignment VALUES (1, 'Good');
                 INSERT INTO superhero VALUES
                     (1, 'Hero A', NULL, 1, 1, 2, 3, 1, 1, 1, NULL, NULL),
                     (2, 'Hero B', NULL, 1, 4, 5, 6, 2, 2, 1, NULL, NULL);",
            )
            .unwrap();
        let catalog = ReportCatalog::new();
        let report = run(&reader, &catalog, "similar-heroes", &[("hero", "Hero A")]);
        assert_eq!(
            report.result().rows(),
            &[vec![Value::from("Hero B"), Value::Int(2)]]
        );
    }

    #[test]
    fn test_similar_heroes_unknown_target_is_empty() {
        let reader = sample_reader();
        let catalog = ReportCatalog::new();
        let report = run(&reader, &catalog, "similar-heroes", &[("hero", "Nobody")]);
        assert!(report.result().is_empty());
    }

    #[test]
    fn test_physical_traits_by_alignment_order() {
        let reader = sample_reader();
        let catalog = ReportCatalog::new();
        let report = run(&reader, &catalog, "physical-traits-by-alignment", &[]);
        let rows = report.result().rows();

        assert_eq!(rows[0][0], Value::from("Bad"));
        assert_eq!(rows[0][1], Value::from("Color de ojos"));
        let kinds: HashSet<String> = rows.iter().map(|r| r[1].to_string()).collect();
        assert_eq!(kinds.len(), 3);
    }

    #[test]
    fn test_publishers_by_alignment_limits_publishers() {
        let reader = sample_reader();
        let catalog = ReportCatalog::new();
        let report = run(&reader, &catalog, "publishers-by-alignment", &[("top", "2")]);
        let publishers: HashSet<String> = column(&report, 0).iter().map(|v| v.to_string()).collect();
        assert_eq!(
            publishers,
            HashSet::from(["Marvel Comics".to_string(), "DC Comics".to_string()])
        );
    }

    #[test]
    fn test_height_vs_weight_excludes_missing_measurements() {
        let reader = sample_reader();
        let catalog = ReportCatalog::new();
        let report = run(&reader, &catalog, "height-vs-weight", &[]);
        assert_eq!(report.result().len(), 11);
        for row in report.result().rows() {
            assert!(!row[1].is_null() && !row[2].is_null());
        }
    }
}
