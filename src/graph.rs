//! Relation graph resolution.
//!
//! Three passes over the initially-accepted corpora. Each pass snapshots
//! the accepted set before touching anything, so a pass never reacts to
//! rejections it produced itself.
use log::warn;

use crate::corpus::{accepted_ids, get, Catalogue};
use crate::error::Error;

/// Known erroneous processed-version relation in the source data;
/// skipped instead of treated as an inconsistency.
const BROKEN_PROCESSED_PAIR: (usize, usize) = (29, 1086);

/// Khresmoi declares a phantom EN-PL part that is rejected; keep the
/// bundle itself.
const BUNDLE_EXEMPT: usize = 1091;

/// v1 labeled as part of v2 alongside other corpora.
const PART_EXEMPT: usize = 3382;

pub fn resolve(catalogue: &mut Catalogue) -> Result<(), Error> {
    prefer_processed(catalogue)?;
    warn_residual_versions(catalogue)?;
    suppress_bundles(catalogue)?;
    Ok(())
}

fn related(catalogue: &Catalogue, from: usize, to: usize) -> Result<&crate::corpus::Corpus, Error> {
    get(catalogue, to).ok_or_else(|| {
        Error::Custom(format!(
            "corpus {} has a relation to {}, which does not exist",
            from, to
        ))
    })
}

/// Version relationships are messy: they can mean a revision or a
/// processed derivative. When exactly one side of a version edge is
/// named "(Processed)", prefer it and reject the other.
fn prefer_processed(catalogue: &mut Catalogue) -> Result<(), Error> {
    for number in accepted_ids(catalogue) {
        let versions = match get(catalogue, number) {
            Some(c) => c.versions.clone(),
            None => continue,
        };
        for version in versions {
            let this = get(catalogue, number).expect("snapshot id present");
            let other = related(catalogue, number, version)?;
            let (winner, loser) = match (this.processed_name, other.processed_name) {
                (true, true) => {
                    return Err(Error::Custom(format!(
                        "two corpora claim to be processed with a version relation: {} {}",
                        number, version
                    )))
                }
                (true, false) => (number, version),
                (false, true) => (version, number),
                (false, false) => continue,
            };
            let winner_rejected = !get(catalogue, winner).expect("resolved above").accepted();
            let loser_rejected = !get(catalogue, loser).expect("resolved above").accepted();
            if winner_rejected && !loser_rejected {
                if (loser, winner) == BROKEN_PROCESSED_PAIR {
                    continue;
                }
                return Err(Error::Custom(format!(
                    "processed version {} of {} is rejected",
                    winner, loser
                )));
            }
            if let Some(c) = crate::corpus::get_mut(catalogue, loser) {
                c.reject(format!("{} is a processed version", winner));
            }
        }
    }
    Ok(())
}

/// Surviving version edges between accepted corpora are duplicate
/// candidates a human has to adjudicate; diagnose, don't reject.
fn warn_residual_versions(catalogue: &Catalogue) -> Result<(), Error> {
    for number in accepted_ids(catalogue) {
        let corpus = match get(catalogue, number) {
            Some(c) if c.accepted() => c,
            _ => continue,
        };
        let mut alive = Vec::new();
        for version in &corpus.versions {
            let other = related(catalogue, number, *version)?;
            if other.accepted() {
                alive.push(other);
            }
        }
        if !alive.is_empty() {
            warn!(
                "Version information for {} \"{}\" suggests there are other versions:",
                number, corpus.name
            );
            for other in alive {
                warn!("   {}", other.name);
            }
        }
    }
    Ok(())
}

/// A multilingual corpus with declared parts is just a zip of the parts;
/// download only the parts. Every part must itself be accepted, or the
/// bundle is the only surviving copy of that content and the rule is
/// wrong.
fn suppress_bundles(catalogue: &mut Catalogue) -> Result<(), Error> {
    for number in accepted_ids(catalogue) {
        let corpus = match get(catalogue, number) {
            Some(c) if c.accepted() => c,
            _ => continue,
        };
        if !corpus.linguality.contains("multilingual") || corpus.has_part.is_empty() {
            continue;
        }
        if number == BUNDLE_EXEMPT {
            continue;
        }
        for part in corpus.has_part.clone() {
            let part_corpus = related(catalogue, number, part)?;
            if !part_corpus.accepted() && part != PART_EXEMPT {
                return Err(Error::Custom(format!(
                    "part of accepted multilingual corpus #{} {} was rejected: #{} {}",
                    number, corpus.name, part, part_corpus.name
                )));
            }
        }
        if let Some(c) = crate::corpus::get_mut(catalogue, number) {
            c.reject("Multilingual bundle has smaller parts");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;
    use crate::corpus::Corpus;

    fn corpus(number: usize, name: &str) -> Corpus {
        Corpus {
            number,
            name: name.to_string(),
            shortname: number.to_string(),
            processed_name: name.ends_with("(Processed)"),
            info_url: format!("https://example.org/info/{}", number),
            download: Some(format!("https://example.org/dl/{}.zip", number)),
            post: None,
            licenses: BTreeSet::new(),
            languages: ["en", "fr"].iter().map(|s| s.to_string()).collect(),
            linguality: ["bilingual".to_string()].into_iter().collect(),
            versions: Vec::new(),
            aligned_annotated: Vec::new(),
            part_of: Vec::new(),
            has_part: Vec::new(),
            rejected: None,
            files: Vec::new(),
            detected: BTreeMap::new(),
        }
    }

    fn catalogue(corpora: Vec<Corpus>) -> Catalogue {
        let max = corpora.iter().map(|c| c.number).max().unwrap_or(0);
        let mut catalogue: Catalogue = (0..=max).map(|_| None).collect();
        for c in corpora {
            let number = c.number;
            catalogue[number] = Some(c);
        }
        catalogue
    }

    #[test]
    fn processed_side_wins() {
        let mut processed = corpus(1, "Corpus (Processed)");
        processed.versions = vec![2];
        let raw = corpus(2, "Corpus");
        let mut cat = catalogue(vec![processed, raw]);
        resolve(&mut cat).unwrap();
        assert!(get(&cat, 1).unwrap().accepted());
        assert_eq!(
            get(&cat, 2).unwrap().rejected.as_deref(),
            Some("1 is a processed version")
        );
    }

    #[test]
    fn processed_side_wins_from_other_end() {
        let mut raw = corpus(1, "Corpus");
        raw.versions = vec![2];
        let processed = corpus(2, "Corpus (Processed)");
        let mut cat = catalogue(vec![raw, processed]);
        resolve(&mut cat).unwrap();
        assert_eq!(
            get(&cat, 1).unwrap().rejected.as_deref(),
            Some("2 is a processed version")
        );
        assert!(get(&cat, 2).unwrap().accepted());
    }

    #[test]
    fn two_processed_claimants_are_fatal() {
        let mut a = corpus(1, "Corpus (Processed)");
        a.versions = vec![2];
        let b = corpus(2, "Other (Processed)");
        let mut cat = catalogue(vec![a, b]);
        assert!(resolve(&mut cat).is_err());
    }

    #[test]
    fn rejected_winner_is_fatal() {
        let mut raw = corpus(1, "Corpus");
        raw.versions = vec![2];
        let mut processed = corpus(2, "Corpus (Processed)");
        processed.rejected = Some("Nothing to download".to_string());
        let mut cat = catalogue(vec![raw, processed]);
        assert!(resolve(&mut cat).is_err());
    }

    #[test]
    fn version_edge_to_missing_corpus_is_fatal() {
        let mut raw = corpus(1, "Corpus");
        raw.versions = vec![5];
        let mut cat = catalogue(vec![raw]);
        cat.resize_with(6, || None);
        assert!(resolve(&mut cat).is_err());
    }

    #[test]
    fn multilingual_bundle_suppressed() {
        let mut bundle = corpus(1, "Bundle");
        bundle.linguality = ["multilingual".to_string()].into_iter().collect();
        bundle.has_part = vec![2, 3];
        let a = corpus(2, "Part A");
        let b = corpus(3, "Part B");
        let mut cat = catalogue(vec![bundle, a, b]);
        resolve(&mut cat).unwrap();
        assert_eq!(
            get(&cat, 1).unwrap().rejected.as_deref(),
            Some("Multilingual bundle has smaller parts")
        );
        assert!(get(&cat, 2).unwrap().accepted());
        assert!(get(&cat, 3).unwrap().accepted());
    }

    #[test]
    fn rejected_part_under_bundle_is_fatal() {
        let mut bundle = corpus(1, "Bundle");
        bundle.linguality = ["multilingual".to_string()].into_iter().collect();
        bundle.has_part = vec![2];
        let mut part = corpus(2, "Part A");
        part.rejected = Some("Nothing to download".to_string());
        let mut cat = catalogue(vec![bundle, part]);
        assert!(resolve(&mut cat).is_err());
    }

    #[test]
    fn bilingual_with_parts_untouched() {
        let mut parent = corpus(1, "Parent");
        parent.has_part = vec![2];
        let part = corpus(2, "Part A");
        let mut cat = catalogue(vec![parent, part]);
        resolve(&mut cat).unwrap();
        assert!(get(&cat, 1).unwrap().accepted());
    }
}
