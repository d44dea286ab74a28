// Candidate loading from the per-mode JSON data files.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::engine::candidate::{Candidate, CandidateSource, Mode};
use crate::engine::config::*;
use crate::error::LoadError;

/// `{ "traits": ["Arcana", ...] }`
#[derive(Deserialize)]
struct TraitFile {
    traits: Vec<String>,
}

/// Data Dragon tactician listing, keyed by tactician id.
#[derive(Deserialize)]
struct TacticianFile {
    data: BTreeMap<String, TacticianEntry>,
}

#[derive(Deserialize)]
struct TacticianEntry {
    name: String,
    image: TacticianImage,
}

#[derive(Deserialize)]
struct TacticianImage {
    full: String,
}

/// `[ { "name": "...", "image": "x.png" } ]`
#[derive(Deserialize)]
struct AugmentEntry {
    name: String,
    #[serde(default)]
    image: Option<String>,
}

/// Read and parse the candidate file for `mode`.
pub async fn load_source(mode: Mode, path: &Path) -> Result<CandidateSource, LoadError> {
    let contents = tokio::fs::read_to_string(path).await?;
    let source = parse_source(mode, &contents)?;
    tracing::info!(
        mode = %mode,
        path = %path.display(),
        candidates = source.len(),
        "Loaded candidates"
    );
    Ok(source)
}

/// Parse candidate JSON for `mode`. Entries without a name (or, for augments,
/// without an image) are dropped.
pub fn parse_source(mode: Mode, json: &str) -> Result<CandidateSource, LoadError> {
    let candidates: Vec<Candidate> = match mode {
        Mode::Trait => {
            let file: TraitFile = serde_json::from_str(json)?;
            file.traits
                .into_iter()
                .map(|name| {
                    let image = trait_image_ref(&name);
                    Candidate::new(name, image)
                })
                .collect()
        }
        Mode::Tactician => {
            let file: TacticianFile = serde_json::from_str(json)?;
            file.data
                .into_values()
                .map(|t| Candidate::new(t.name, format!("{TACTICIAN_IMAGE_BASE}{}", t.image.full)))
                .collect()
        }
        Mode::Augment => {
            let entries: Vec<AugmentEntry> = serde_json::from_str(json)?;
            entries
                .into_iter()
                .filter_map(|a| {
                    let image = a.image.filter(|i| !i.trim().is_empty())?;
                    Some(Candidate::new(a.name, format!("{AUGMENT_IMAGE_BASE}{image}")))
                })
                .collect()
        }
    };

    let candidates: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| !c.name.trim().is_empty())
        .collect();

    if candidates.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(CandidateSource::new(candidates))
}

/// Wiki icon URL for a trait. Every whitespace run, leading and trailing
/// ones included, becomes a single underscore.
pub fn trait_image_ref(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_space = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_space {
                slug.push('_');
            }
            in_space = true;
        } else {
            slug.push(ch);
            in_space = false;
        }
    }
    format!("{TRAIT_IMAGE_BASE}{slug}{TRAIT_IMAGE_SUFFIX}")
}
