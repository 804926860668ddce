//! Demo catalog for trying the engine from the command line.

use serde::Serialize;
use storage::repository::{CatalogRepository, StorageError};
use tracing::{debug, info};
use vocab_core::model::{
    ConceptId, Difficulty, Domain, DomainCode, Language, LanguageCode, NewConcept,
    NewTranslation, WordType,
};

const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("fr", "French"),
    ("es", "Spanish"),
    ("de", "German"),
];

const DOMAINS: &[(&str, &str)] = &[("FOOD", "Food"), ("TRAVEL", "Travel"), ("HOME", "Home")];

struct DemoConcept {
    key: &'static str,
    domain: &'static str,
    difficulty: Difficulty,
    word_type: WordType,
    /// `(language, text)`; languages may be missing on purpose.
    forms: &'static [(&'static str, &'static str)],
}

const CONCEPTS: &[DemoConcept] = &[
    DemoConcept {
        key: "bread",
        domain: "FOOD",
        difficulty: Difficulty::Easy,
        word_type: WordType::Noun,
        forms: &[("en", "bread"), ("fr", "pain"), ("es", "pan"), ("de", "Brot")],
    },
    DemoConcept {
        key: "water",
        domain: "FOOD",
        difficulty: Difficulty::Easy,
        word_type: WordType::Noun,
        forms: &[("en", "water"), ("fr", "eau"), ("es", "agua"), ("de", "Wasser")],
    },
    DemoConcept {
        key: "apple",
        domain: "FOOD",
        difficulty: Difficulty::Easy,
        word_type: WordType::Noun,
        forms: &[("en", "apple"), ("fr", "pomme"), ("es", "manzana"), ("de", "Apfel")],
    },
    DemoConcept {
        key: "cheese",
        domain: "FOOD",
        difficulty: Difficulty::Easy,
        word_type: WordType::Noun,
        forms: &[("en", "cheese"), ("fr", "fromage"), ("es", "queso"), ("de", "Käse")],
    },
    DemoConcept {
        key: "to_eat",
        domain: "FOOD",
        difficulty: Difficulty::Easy,
        word_type: WordType::Verb,
        forms: &[("en", "to eat"), ("fr", "manger"), ("es", "comer"), ("de", "essen")],
    },
    DemoConcept {
        key: "spoon",
        domain: "FOOD",
        difficulty: Difficulty::Medium,
        word_type: WordType::Noun,
        forms: &[("en", "spoon"), ("fr", "cuillère"), ("es", "cuchara"), ("de", "Löffel")],
    },
    DemoConcept {
        key: "bitter",
        domain: "FOOD",
        difficulty: Difficulty::Medium,
        word_type: WordType::Adjective,
        forms: &[("en", "bitter"), ("fr", "amer"), ("es", "amargo"), ("de", "bitter")],
    },
    DemoConcept {
        key: "to_simmer",
        domain: "FOOD",
        difficulty: Difficulty::Hard,
        word_type: WordType::Verb,
        forms: &[("en", "to simmer"), ("fr", "mijoter"), ("es", "hervir a fuego lento")],
    },
    DemoConcept {
        key: "train",
        domain: "TRAVEL",
        difficulty: Difficulty::Easy,
        word_type: WordType::Noun,
        forms: &[("en", "train"), ("fr", "train"), ("es", "tren"), ("de", "Zug")],
    },
    DemoConcept {
        key: "ticket",
        domain: "TRAVEL",
        difficulty: Difficulty::Easy,
        word_type: WordType::Noun,
        forms: &[("en", "ticket"), ("fr", "billet"), ("es", "billete"), ("de", "Fahrkarte")],
    },
    DemoConcept {
        key: "luggage",
        domain: "TRAVEL",
        difficulty: Difficulty::Medium,
        word_type: WordType::Noun,
        forms: &[("en", "luggage"), ("fr", "bagages"), ("es", "equipaje"), ("de", "Gepäck")],
    },
    DemoConcept {
        key: "departure",
        domain: "TRAVEL",
        difficulty: Difficulty::Medium,
        word_type: WordType::Noun,
        forms: &[("en", "departure"), ("fr", "départ"), ("es", "salida"), ("de", "Abfahrt")],
    },
    DemoConcept {
        key: "layover",
        domain: "TRAVEL",
        difficulty: Difficulty::Hard,
        word_type: WordType::Noun,
        forms: &[("en", "layover"), ("fr", "escale"), ("de", "Zwischenstopp")],
    },
    DemoConcept {
        key: "door",
        domain: "HOME",
        difficulty: Difficulty::Easy,
        word_type: WordType::Noun,
        forms: &[("en", "door"), ("fr", "porte"), ("es", "puerta"), ("de", "Tür")],
    },
    DemoConcept {
        key: "window",
        domain: "HOME",
        difficulty: Difficulty::Easy,
        word_type: WordType::Noun,
        forms: &[("en", "window"), ("fr", "fenêtre"), ("es", "ventana"), ("de", "Fenster")],
    },
    DemoConcept {
        key: "chimney",
        domain: "HOME",
        difficulty: Difficulty::Hard,
        word_type: WordType::Noun,
        forms: &[("en", "chimney"), ("fr", "cheminée"), ("es", "chimenea"), ("de", "Schornstein")],
    },
];

/// Counts of what a seed run wrote.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub languages: usize,
    pub domains: usize,
    pub concepts: usize,
    pub translations: usize,
    pub skipped: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Model(#[from] vocab_core::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Write the demo catalog. Concepts already present (by key) are skipped,
/// so running it twice is harmless.
///
/// # Errors
///
/// Returns `SeedError` if a demo entry fails validation or storage fails.
pub async fn seed_demo_catalog(catalog: &dyn CatalogRepository) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    for (code, name) in LANGUAGES {
        let language = language(code, name)?;
        catalog.upsert_language(&language).await?;
        report.languages += 1;
    }
    for (code, name) in DOMAINS {
        let domain = domain(code, name)?;
        catalog.upsert_domain(&domain).await?;
        report.domains += 1;
    }

    for demo in CONCEPTS {
        let concept = new_concept(demo)?;
        let concept_id = match catalog.insert_concept(&concept).await {
            Ok(id) => id,
            Err(StorageError::Conflict) => {
                debug!(key = demo.key, "concept already seeded");
                report.skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        report.concepts += 1;

        for (code, text) in demo.forms {
            let translation = translation(concept_id, code, text)?;
            catalog.insert_translation(&translation).await?;
            report.translations += 1;
        }
    }

    info!(
        concepts = report.concepts,
        translations = report.translations,
        skipped = report.skipped,
        "demo catalog seeded"
    );
    Ok(report)
}

fn language(code: &str, name: &str) -> Result<Language, vocab_core::Error> {
    Ok(Language::new(LanguageCode::parse(code)?, name)?)
}

fn domain(code: &str, name: &str) -> Result<Domain, vocab_core::Error> {
    Ok(Domain::new(DomainCode::parse(code)?, name)?)
}

fn translation(
    concept_id: ConceptId,
    code: &str,
    text: &str,
) -> Result<NewTranslation, vocab_core::Error> {
    Ok(NewTranslation::new(concept_id, LanguageCode::parse(code)?, text)?)
}

fn new_concept(demo: &DemoConcept) -> Result<NewConcept, vocab_core::Error> {
    let domain = DomainCode::parse(demo.domain)?;
    Ok(NewConcept::new(demo.key, domain, demo.difficulty)?.with_word_type(demo.word_type))
}
