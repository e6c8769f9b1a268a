//! Record synthesis.
//!
//! Turns each accepted corpus into one normalized record per language
//! pair. Dispatch is over the handful of file layouts that actually
//! occur in the catalogue; anything else is a hard error so that new
//! layouts get a rule instead of a guess.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use itertools::Itertools;
use log::warn;

use crate::corpus::{Catalogue, Corpus};
use crate::error::Error;
use crate::lang;

/// One catalogue record: a corpus restricted to a single language pair
/// and the archive members that carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Sorted, distinct two-letter codes.
    pub langs: (String, String),
    pub number: usize,
    pub shortname: String,
    pub name: String,
    pub info_url: String,
    pub download: String,
    pub licenses: Vec<String>,
    pub in_paths: Vec<String>,
}

impl Entry {
    fn new(
        corpus: &Corpus,
        in_paths: Vec<String>,
        shortname: Option<&str>,
        languages: Option<(String, String)>,
    ) -> Result<Entry, Error> {
        let (a, b) = match languages {
            Some(pair) => pair,
            None => {
                if corpus.languages.len() != 2 {
                    return Err(Error::Custom(format!(
                        "corpus {} needs an explicit language pair, it declares {:?}",
                        corpus.number, corpus.languages
                    )));
                }
                let mut it = corpus.languages.iter().cloned();
                (it.next().expect("two languages"), it.next().expect("two languages"))
            }
        };
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        for code in [&a, &b] {
            if code.len() != 2 || !code.bytes().all(|c| c.is_ascii_lowercase()) {
                return Err(Error::Custom(format!(
                    "corpus {} has a malformed language code {:?}",
                    corpus.number, code
                )));
            }
        }
        if a == b {
            return Err(Error::Custom(format!(
                "corpus {} produced a degenerate language pair ({}, {})",
                corpus.number, a, b
            )));
        }
        Ok(Entry {
            langs: (a, b),
            number: corpus.number,
            shortname: shortname.unwrap_or(corpus.shortname.as_str()).to_string(),
            name: corpus.name.clone(),
            info_url: corpus.info_url.clone(),
            download: corpus.download.clone().unwrap_or_default(),
            licenses: corpus.licenses.iter().cloned().collect(),
            in_paths,
        })
    }
}

impl fmt::Display for Entry {
    /// Tab-separated positional encoding; the member paths follow the
    /// fixed columns.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\tELRC_{}\t{}\t{}\t{}\t{}",
            self.langs.0,
            self.langs.1,
            self.number,
            self.shortname,
            self.name,
            self.info_url,
            self.download,
            self.licenses.join(" ")
        )?;
        for path in &self.in_paths {
            write!(f, "\t{}", path)?;
        }
        Ok(())
    }
}

/// The NTEU training compilations use a fixed two-tier layout.
fn is_nteu(name: &str) -> bool {
    name.starts_with("Compilation of ")
        && name.ends_with(
            " parallel corpora resources used for training of NTEU Machine Translation engines.",
        )
}

/// One record per tier, with fixed tier shortnames.
fn nteu(corpus: &Corpus) -> Result<Vec<Entry>, Error> {
    let langs: Vec<&String> = corpus.languages.iter().collect();
    if langs.len() != 2 {
        return Err(Error::Custom(format!(
            "NTEU compilation {} should be bilingual, declares {:?}",
            corpus.number, corpus.languages
        )));
    }
    let mut entries = Vec::new();
    for (tier, shortname) in [("a", "NTEU_TierA"), ("b", "NTEU_TierB")] {
        let file = format!("{}-{}-{}.tmx", langs[0], langs[1], tier);
        if !corpus.files.contains(&file) {
            return Err(Error::Custom(format!(
                "NTEU compilation {} is missing tier file {}",
                corpus.number, file
            )));
        }
        entries.push(Entry::new(corpus, vec![file], Some(shortname), None)?);
    }
    Ok(entries)
}

/// Extract a language pair from a file name.
///
/// Regional variants collapse first, then the name is tokenized on
/// path, underscore, dot, space and hyphen separators and adjacent
/// tokens are checked against the corpus's languages, directly or via
/// the three-letter mapping.
pub fn parse_language(
    filename: &str,
    languages: &BTreeSet<String>,
) -> Result<(String, String), Error> {
    let cleaned = filename
        .replace("en-GB", "en")
        .replace("de-DE", "de")
        .replace("fr-FR", "fr")
        .replace("it-IT", "it")
        .replace("es-ES", "es")
        .replace("pt-PT", "pt");
    let tokens: Vec<&str> = cleaned.split(['/', '_', '.', ' ', '-']).collect();
    if tokens.len() < 2 {
        return Err(Error::Custom(format!(
            "not sure how to parse filename {}",
            filename
        )));
    }
    for window in tokens.windows(2) {
        let (first, second) = (window[0], window[1]);
        if languages.contains(first) && languages.contains(second) {
            return Ok(sorted_pair(first, second));
        }
        if let (Some(first), Some(second)) = (
            lang::THREE_TO_TWO.get(first),
            lang::THREE_TO_TWO.get(second),
        ) {
            if languages.contains(*first) && languages.contains(*second) {
                return Ok(sorted_pair(first, second));
            }
        }
    }
    Err(Error::Custom(format!(
        "could not parse languages out of file name {}",
        filename
    )))
}

fn sorted_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Synthesize the records of one corpus, dispatching on its file layout.
pub fn synthesize(corpus: &Corpus) -> Result<Vec<Entry>, Error> {
    let tmxes: Vec<String> = corpus
        .files
        .iter()
        .filter(|f| f.ends_with(".tmx"))
        .cloned()
        .collect();

    if is_nteu(&corpus.name) {
        return nteu(corpus);
    }

    if corpus.files.len() == 1 && corpus.files[0].ends_with(".tmx") {
        // Sane corpora, thank you!
        if corpus.languages.len() == 2 {
            return Ok(vec![Entry::new(corpus, corpus.files.clone(), None, None)?]);
        }
        // A few multilingual corpora ship every pair in a single TMX;
        // the file is referenced by every pairwise record.
        if corpus.languages.len() > 2 {
            let mut entries = Vec::new();
            for (a, b) in corpus.languages.iter().tuple_combinations() {
                entries.push(Entry::new(
                    corpus,
                    corpus.files.clone(),
                    None,
                    Some((a.clone(), b.clone())),
                )?);
            }
            return Ok(entries);
        }
    }

    if corpus.languages.len() == 2 {
        if tmxes.len() != corpus.files.len() {
            return Err(Error::Custom(format!(
                "expected all TMX files; check for extra cruft in {}: {:?}",
                corpus.number, corpus.files
            )));
        }
        return Ok(vec![Entry::new(corpus, tmxes, None, None)?]);
    }

    if corpus.languages.len() > 2 && tmxes.len() > 1 {
        // Multilingual with separate TMXes: resolve a pair per file and
        // gather files by pair.
        let mut pairs: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
        for file in &corpus.files {
            let mut pair = parse_language(file, &corpus.languages)?;
            if let Some(detected) = corpus.detected.get(file) {
                if detected.len() == 2 {
                    let mut it = detected.iter().cloned();
                    let content = (
                        it.next().expect("two detected"),
                        it.next().expect("two detected"),
                    );
                    if content != pair {
                        warn!(
                            "corpus {} file {} is named for pair {:?} but contains {:?}; \
                             trusting the content",
                            corpus.number, file, pair, content
                        );
                        pair = content;
                    }
                }
            }
            pairs.entry(pair).or_default().push(file.clone());
        }
        let mut entries = Vec::new();
        for (pair, mut files) in pairs {
            files.sort();
            entries.push(Entry::new(corpus, files, None, Some(pair))?);
        }
        return Ok(entries);
    }

    Err(Error::Custom(format!(
        "unsure what the TMX structure of {} {} is with {:?}",
        corpus.number, corpus.name, corpus.files
    )))
}

/// Lazily synthesize the records of every accepted corpus, in
/// identifier order. Consumed once by the driver.
pub fn records(catalogue: &Catalogue) -> impl Iterator<Item = Result<Entry, Error>> + '_ {
    catalogue
        .iter()
        .flatten()
        .filter(|c| c.accepted())
        .flat_map(|c| match synthesize(c) {
            Ok(entries) => entries.into_iter().map(Ok).collect::<Vec<_>>(),
            Err(e) => vec![Err(e)],
        })
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;

    fn corpus(languages: &[&str], files: &[&str]) -> Corpus {
        Corpus {
            number: 42,
            name: "Some corpus".to_string(),
            shortname: "42".to_string(),
            processed_name: false,
            info_url: "https://example.org/info/42".to_string(),
            download: Some("https://example.org/dl/42.zip".to_string()),
            post: None,
            licenses: ["CC-BY-4.0".to_string()].into_iter().collect(),
            languages: languages.iter().map(|s| s.to_string()).collect(),
            linguality: ["bilingual".to_string()].into_iter().collect(),
            versions: Vec::new(),
            aligned_annotated: Vec::new(),
            part_of: Vec::new(),
            has_part: Vec::new(),
            rejected: None,
            files: files.iter().map(|s| s.to_string()).collect(),
            detected: BTreeMap::new(),
        }
    }

    #[test]
    fn single_bilingual_file() {
        let entries = synthesize(&corpus(&["fr", "en"], &["corpus.tmx"])).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].langs, ("en".to_string(), "fr".to_string()));
        assert_eq!(entries[0].in_paths, vec!["corpus.tmx"]);
    }

    #[test]
    fn single_multilingual_file_splits_pairwise() {
        let entries = synthesize(&corpus(&["en", "fr", "de"], &["corpus.tmx"])).unwrap();
        let pairs: Vec<(&str, &str)> = entries
            .iter()
            .map(|e| (e.langs.0.as_str(), e.langs.1.as_str()))
            .collect();
        assert_eq!(pairs, vec![("de", "en"), ("de", "fr"), ("en", "fr")]);
        for entry in &entries {
            assert_eq!(entry.in_paths, vec!["corpus.tmx"]);
        }
    }

    #[test]
    fn bilingual_many_files() {
        let entries =
            synthesize(&corpus(&["en", "fr"], &["part1.tmx", "part2.tmx"])).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].in_paths, vec!["part1.tmx", "part2.tmx"]);
    }

    #[test]
    fn bilingual_with_cruft_is_fatal() {
        let result = synthesize(&corpus(&["en", "fr"], &["part1.tmx", "notes.doc"]));
        assert!(result.is_err());
    }

    #[test]
    fn multilingual_filename_pairs() {
        let mut c = corpus(
            &["en", "es", "fr"],
            &["report_en_es.tmx", "report_en_fr.tmx"],
        );
        c.detected.insert(
            "report_en_es.tmx".to_string(),
            ["en", "es"].iter().map(|s| s.to_string()).collect(),
        );
        c.detected.insert(
            "report_en_fr.tmx".to_string(),
            ["en", "fr"].iter().map(|s| s.to_string()).collect(),
        );
        let entries = synthesize(&c).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].langs, ("en".to_string(), "es".to_string()));
        assert_eq!(entries[0].in_paths, vec!["report_en_es.tmx"]);
        assert_eq!(entries[1].langs, ("en".to_string(), "fr".to_string()));
        assert_eq!(entries[1].in_paths, vec!["report_en_fr.tmx"]);
    }

    #[test]
    fn content_detection_overrides_filename() {
        let mut c = corpus(
            &["en", "es", "fr"],
            &["report_en_es.tmx", "report_en_fr.tmx"],
        );
        // The file named en-es actually holds en-fr.
        c.detected.insert(
            "report_en_es.tmx".to_string(),
            ["en", "fr"].iter().map(|s| s.to_string()).collect(),
        );
        let entries = synthesize(&c).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].langs, ("en".to_string(), "fr".to_string()));
        assert_eq!(
            entries[0].in_paths,
            vec!["report_en_es.tmx", "report_en_fr.tmx"]
        );
    }

    #[test]
    fn nteu_tiers() {
        let mut c = corpus(&["en", "ga"], &["en-ga-a.tmx", "en-ga-b.tmx"]);
        c.name = "Compilation of English-Irish parallel corpora resources used for \
                  training of NTEU Machine Translation engines."
            .to_string();
        let entries = synthesize(&c).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].shortname, "NTEU_TierA");
        assert_eq!(entries[0].in_paths, vec!["en-ga-a.tmx"]);
        assert_eq!(entries[1].shortname, "NTEU_TierB");
        assert_eq!(entries[1].in_paths, vec!["en-ga-b.tmx"]);
    }

    #[test]
    fn nteu_missing_tier_is_fatal() {
        let mut c = corpus(&["en", "ga"], &["en-ga-a.tmx"]);
        c.name = "Compilation of English-Irish parallel corpora resources used for \
                  training of NTEU Machine Translation engines."
            .to_string();
        assert!(synthesize(&c).is_err());
    }

    #[test]
    fn unrecognized_shape_is_fatal() {
        // Multilingual but only one TMX among several files.
        let result = synthesize(&corpus(&["en", "fr", "de"], &["a.tmx", "b.doc"]));
        assert!(result.is_err());
    }

    #[test]
    fn filename_parsing_uses_three_letter_codes() {
        let languages: BTreeSet<String> =
            ["en", "bg"].iter().map(|s| s.to_string()).collect();
        let pair = parse_language("dir/corpus.eng-bul.tmx", &languages).unwrap();
        assert_eq!(pair, ("bg".to_string(), "en".to_string()));
    }

    #[test]
    fn filename_parsing_collapses_regions() {
        let languages: BTreeSet<String> =
            ["en", "pt"].iter().map(|s| s.to_string()).collect();
        let pair = parse_language("memories/en-GB_pt-PT.tmx", &languages).unwrap();
        assert_eq!(pair, ("en".to_string(), "pt".to_string()));
    }

    #[test]
    fn unparseable_filename_is_fatal() {
        let languages: BTreeSet<String> =
            ["en", "fr", "de"].iter().map(|s| s.to_string()).collect();
        assert!(parse_language("mystery.tmx", &languages).is_err());
    }

    #[test]
    fn record_rendering() {
        let entries = synthesize(&corpus(&["fr", "en"], &["corpus.tmx"])).unwrap();
        let line = entries[0].to_string();
        assert_eq!(
            line,
            "en\tfr\t42\tELRC_42\tSome corpus\thttps://example.org/info/42\t\
             https://example.org/dl/42.zip\tCC-BY-4.0\tcorpus.tmx"
        );
    }
}
