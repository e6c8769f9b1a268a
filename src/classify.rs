//! Acceptance classifier.
//!
//! A short-circuit cascade of structural and domain rules. The first
//! matching rule rejects the corpus and nothing further runs. Rules
//! that indicate the ruleset no longer matches the data (rather than a
//! bad corpus) are hard errors instead of rejections.
use std::collections::BTreeSet;

use crate::corpus::Corpus;
use crate::error::Error;
use crate::lang;
use crate::metadata::Document;

/// Repository download URLs under this prefix redirect, except when a
/// consent POST is required, in which case the redirect breaks.
const REPOSITORY_DOWNLOAD_PREFIX: &str = "https://elrc-share.eu/repository/download/";

/// Very open attribution licenses that the repository nonetheless puts
/// behind a click-wrap consent form.
pub const REQUIRES_POST: [&str; 2] = ["NLOD-1.0", "Apache-2.0"];

/// Franchises already catalogued on OPUS; re-exporting them from ELRC
/// would only produce duplicates.
fn already_on_opus(name: &str) -> bool {
    name.contains("Tatoeba")
        || name.contains("Global Voices")
        || name.contains("ParaCrawl ")
        || name.starts_with("Europat")
        || name.starts_with("EuroPat")
}

/// Run the acceptance cascade, populating download location, consent
/// payload, licenses, languages and linguality on the way through.
pub fn classify(corpus: &mut Corpus, doc: &Document) -> Result<(), Error> {
    if already_on_opus(&corpus.name) {
        corpus.reject("Already on OPUS");
        return Ok(());
    }

    // Only corpora; software, term banks and MT systems are out of scope.
    let corpus_info = match &doc.resource_info.resource_component_type.corpus_info {
        Some(info) => info,
        None => {
            corpus.reject("Not a corpus");
            return Ok(());
        }
    };

    let distributions = match &doc.resource_info.distribution_info {
        Some(d) => d.as_slice(),
        None => {
            corpus.reject("No download information");
            return Ok(());
        }
    };

    let mut locations = BTreeSet::new();
    for distribution in distributions {
        for licence in distribution.licence_info.as_slice() {
            corpus.licenses.insert(licence.licence.clone());
        }
        // Distributions missing an actual location are skipped.
        if let Some(location) = &distribution.download_location {
            locations.extend(location.as_slice().iter().cloned());
        }
    }

    if locations.is_empty() {
        corpus.reject("Nothing to download");
        return Ok(());
    }
    // Only ParaCrawl abused the multiple locations functionality, and it
    // is already gone by name match above.
    if locations.len() > 1 {
        return Err(Error::Custom(format!(
            "corpus {} has multiple download locations: {:?}",
            corpus.number, locations
        )));
    }
    let mut download = locations
        .into_iter()
        .next()
        .expect("one location checked above");
    if download.starts_with(REPOSITORY_DOWNLOAD_PREFIX) {
        download.push('/');
        if REQUIRES_POST.iter().any(|l| corpus.licenses.contains(*l)) {
            if corpus.licenses.len() != 1 {
                // Not sure what to do with a POST if there are two licenses.
                return Err(Error::Custom(format!(
                    "corpus {} requires a consent POST but has {} licenses: {:?}",
                    corpus.number,
                    corpus.licenses.len(),
                    corpus.licenses
                )));
            }
            let licence = corpus.licenses.iter().next().expect("one license");
            corpus.post = Some(format!(
                "licence_agree=on&in_licence_agree_form=True&licence={}",
                licence
            ));
        }
    }
    corpus.download = Some(download);

    for info in corpus_info.corpus_media_type.corpus_text_info.as_slice() {
        for language in info.language_info.as_slice() {
            corpus
                .languages
                .insert(lang::normalize_lossy(&language.language_id));
        }
        let linguality = &info.linguality_info;
        corpus.linguality.insert(linguality.linguality_type.clone());
        if linguality.linguality_type == "multilingual" {
            if let Some(sub) = &linguality.multilinguality_type {
                // "other" and "comparable" are not sentence-aligned.
                if sub == "other" || sub == "comparable" {
                    corpus.reject(format!("multilingualityType is {}", sub));
                    return Ok(());
                }
            }
        }
    }

    // Currently only parallel corpora.
    if !corpus.linguality.contains("bilingual") && !corpus.linguality.contains("multilingual") {
        corpus.reject("Not a parallel corpus");
        return Ok(());
    }

    if !corpus.aligned_annotated.is_empty() {
        corpus.reject("There's an aligned or annotated version");
        return Ok(());
    }

    Ok(())
}
