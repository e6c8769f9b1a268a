//! Manual corrections for known defects in the source catalogue.
//!
//! The repository metadata is curated by many hands and carries a fixed
//! set of known mistakes: wrong encodings, duplicate download targets,
//! incomplete exports, missing language declarations. Corrections are
//! data in two tables here; [apply] is the single generic mechanism.
//! Corrections are overwrites, so applying a table twice is a no-op.
use log::warn;

use crate::corpus::{get, get_mut, Catalogue};
use crate::error::Error;

/// One correction. References by identifier may be absent in a given
/// environment; that is logged, not fatal.
#[derive(Debug, Clone, Copy)]
pub enum Fix {
    /// Reject the corpus with a human-readable justification.
    Reject(&'static str),
    /// Reject the corpus and every corpus it declares as a part.
    RejectWithParts(&'static str),
    /// A language present in the content but missing from the metadata.
    AddLanguage(&'static str),
    /// Assign a short name to this corpus only.
    SetShortname(&'static str),
    /// Propagate a short name across the corpus's version, aligned and
    /// part family. No-op-safe on already-rejected members.
    FamilyShortname(&'static str),
    /// Keep only the named archive members. Every named member must be
    /// present, or the table no longer matches the archive.
    KeepOnlyFiles(&'static [&'static str]),
    /// Drop archive members with the given suffix.
    DropFilesEndingWith(&'static str),
}

/// Metadata-level corrections, applied after graph resolution.
pub static METADATA_FIXES: &[(usize, Fix)] = &[
    // Insufficiently annotated v1 multilingual corpora that have a v2.
    (2923, Fix::RejectWithParts("Dataset v1 has a v2")), // COVID-19 EUROPARL dataset v1
    (3382, Fix::RejectWithParts("Dataset v1 has a v2")), // COVID-19 EU presscorner v1 dataset
    (2681, Fix::RejectWithParts("Dataset v1 has a v2")), // Publications Office of the EU on the medical domain, 2730 is v2
    // Subsumed by 2541 and 2542, the processed ministry memories.
    (2386, Fix::Reject("Part of a larger corpus but not labeled as such")),
    (2387, Fix::Reject("Part of a larger corpus but not labeled as such")),
    (2389, Fix::Reject("Part of a larger corpus but not labeled as such")),
    (2390, Fix::Reject("Part of a larger corpus but not labeled as such")),
    (1834, Fix::Reject("test XML")),
    (2654, Fix::Reject("post-editing training data")),
    (4244, Fix::Reject("Download broken")),
    (2606, Fix::Reject("XLIFF format; TMX is supposed to be available as 2610 but that is not available for download yet and the corpus is too small to bother with an XLIFF parser")),
    (2483, Fix::Reject("Unaligned text file")),
    (3860, Fix::Reject("Available in another format as 3859")),
    (3858, Fix::Reject("Same download location as EMEA.")),
    (3859, Fix::Reject("Same download location as EMEA.")),
    (3861, Fix::Reject("Same download location as EMEA.")),
    (3862, Fix::Reject("Same download location as EMEA.")),
    (3864, Fix::Reject("Same download location as EMEA.")),
    (3836, Fix::Reject("TODO: extract from this non-standard format")),
    (2646, Fix::Reject("TODO: nested zip files, ugh")),
    // part_1a (v.1.0) of the HEALTH (COVID-19) corpus when (v.1.05) exists.
    (3858, Fix::Reject("Old version")),
    (3861, Fix::Reject("Old version")),
    (3862, Fix::Reject("Old version")),
    (3863, Fix::Reject("Old version")),
    (3866, Fix::Reject("Old version")),
    (3867, Fix::Reject("Old version")),
    (3870, Fix::Reject("Old version")),
    (3872, Fix::Reject("Old version")),
    // Have TMX in a language but not in the metadata.
    (416, Fix::AddLanguage("sr")),
    (416, Fix::AddLanguage("el")),
    // Nicer names for multilingual corpora.
    (3192, Fix::FamilyShortname("antibiotic")),
    (2682, Fix::FamilyShortname("EMEA")),
    (3550, Fix::FamilyShortname("presscorner_covid")),
    (1134, Fix::FamilyShortname("EUIPO_2017")),
    (704, Fix::FamilyShortname("EUIPO_list")),
    (2865, Fix::FamilyShortname("EU_publications_medical_v2")),
    (3549, Fix::FamilyShortname("EUR_LEX_covid")),
    (3448, Fix::FamilyShortname("EC_EUROPA_covid")),
    (3254, Fix::FamilyShortname("EUROPARL_covid")),
    (2922, Fix::FamilyShortname("wikipedia_health")),
    (2730, Fix::FamilyShortname("vaccination")),
];

/// Archive-member corrections, applied after listing, before sampling.
pub static FILE_FIXES: &[(usize, Fix)] = &[
    // Same TMX present under two different names.
    (1254, Fix::KeepOnlyFiles(&["335-1254.es-pt.tmx"])),
    // Extra text files alongside the TMX.
    (1796, Fix::DropFilesEndingWith(".txt")),
    (1797, Fix::DropFilesEndingWith(".txt")),
    // Incorrect language code se, should be sv. Tilde was notified.
    (417, Fix::DropFilesEndingWith("-se.tmx")),
];

/// Apply a correction table. Absent identifiers are logged and skipped;
/// a [Fix::KeepOnlyFiles] naming an unknown member is fatal because the
/// table itself is out of date.
pub fn apply(catalogue: &mut Catalogue, fixes: &[(usize, Fix)]) -> Result<(), Error> {
    for (number, fix) in fixes {
        if get(catalogue, *number).is_none() {
            warn!("override for {} refers to a corpus that was never loaded", number);
            continue;
        }
        match fix {
            Fix::Reject(reason) => {
                if let Some(corpus) = get_mut(catalogue, *number) {
                    corpus.reject(*reason);
                }
            }
            Fix::RejectWithParts(reason) => {
                let parts = get(catalogue, *number)
                    .map(|c| c.has_part.clone())
                    .unwrap_or_default();
                for part in parts {
                    match get_mut(catalogue, part) {
                        Some(corpus) => corpus.reject(*reason),
                        None => warn!(
                            "override for {} names part {}, which was never loaded",
                            number, part
                        ),
                    }
                }
                if let Some(corpus) = get_mut(catalogue, *number) {
                    corpus.reject(*reason);
                }
            }
            Fix::AddLanguage(language) => {
                if let Some(corpus) = get_mut(catalogue, *number) {
                    corpus.languages.insert(language.to_string());
                }
            }
            Fix::SetShortname(shortname) => {
                if let Some(corpus) = get_mut(catalogue, *number) {
                    corpus.shortname = shortname.to_string();
                }
            }
            Fix::FamilyShortname(shortname) => {
                let family: Vec<usize> = get(catalogue, *number)
                    .map(|c| {
                        c.versions
                            .iter()
                            .chain(&c.aligned_annotated)
                            .chain(&c.has_part)
                            .copied()
                            .collect()
                    })
                    .unwrap_or_default();
                for member in family {
                    match get_mut(catalogue, member) {
                        Some(corpus) => corpus.shortname = shortname.to_string(),
                        None => warn!(
                            "override for {} names family member {}, which was never loaded",
                            number, member
                        ),
                    }
                }
            }
            Fix::KeepOnlyFiles(keep) => {
                if let Some(corpus) = get_mut(catalogue, *number) {
                    for name in *keep {
                        if !corpus.files.iter().any(|f| f == name) {
                            return Err(Error::Custom(format!(
                                "file override for {} expects member {:?}, absent from the archive",
                                number, name
                            )));
                        }
                    }
                    corpus.files = keep.iter().map(|s| s.to_string()).collect();
                }
            }
            Fix::DropFilesEndingWith(suffix) => {
                if let Some(corpus) = get_mut(catalogue, *number) {
                    corpus.files.retain(|f| !f.ends_with(suffix));
                }
            }
        }
    }
    Ok(())
}
