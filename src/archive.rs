//! Archive inspection.
//!
//! Opens each accepted corpus's downloaded zip, filters the member list
//! down to actual content, and samples a bounded prefix of each TMX
//! member to find the languages actually present. The declared language
//! set is then narrowed to what was really observed.
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::corpus::{accepted_ids, get_mut, Catalogue};
use crate::error::Error;
use crate::lang;

/// Translation units sampled per TMX member.
pub const SAMPLE_UNITS: usize = 10;

/// Validation reports were supposed to be uploaded separately.
const STRAY_VALREP: &str = "ELRC_474_Natolin European Centre Dataset (Processed)_VALREP.pdf";

/// Content filter for archive members. Drops administrative metadata,
/// license text, resource descriptors, OS junk, spreadsheets and
/// anything under a rejected/ sub-path.
pub fn keep_file(name: &str) -> bool {
    if name.ends_with('/') || name.ends_with("_metadata.txt") {
        return false;
    }
    let file_name = name.rsplit('/').next().unwrap_or(name);
    if file_name.starts_with("license")
        && (file_name.ends_with(".txt") || file_name.ends_with(".pdf"))
    {
        return false;
    }
    if file_name.starts_with("resource-") && file_name.ends_with(".xml") {
        return false;
    }
    if name.starts_with("__MACOSX") || name.ends_with(".DS_Store") {
        return false;
    }
    if name.ends_with(".xls") || name.ends_with(".xlsx") {
        return false;
    }
    // A whole bunch of archives carry their curation rejects.
    if name.contains("rejected/") {
        return false;
    }
    if name.ends_with("ReadMe.txt") {
        return false;
    }
    if name == STRAY_VALREP {
        return false;
    }
    true
}

fn archive_path(src: &Path, number: usize) -> PathBuf {
    src.join(format!("{}.zip", number))
}

/// List and filter the archive members of every accepted corpus.
///
/// Returns the identifiers whose archive is missing locally; those are
/// queued for fetching and excluded from the rest of the run. A present
/// but unreadable archive rejects the corpus. An archive whose members
/// are all filtered out is a hard error: the filter is wrong, not the
/// corpus empty.
pub fn load_files(catalogue: &mut Catalogue, src: &Path) -> Result<Vec<usize>, Error> {
    let mut to_download = Vec::new();
    for number in accepted_ids(catalogue) {
        let path = archive_path(src, number);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                to_download.push(number);
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let archive = match zip::ZipArchive::new(file) {
            Ok(archive) => archive,
            Err(e) => {
                let corpus = get_mut(catalogue, number).expect("accepted id present");
                error!(
                    "File {} from {} is not a zip file. Most likely the corpus has an open \
                     license but the repository put a click wrap on it for no reason; consider \
                     adding the licence to REQUIRES_POST.",
                    path.display(),
                    corpus.download.as_deref().unwrap_or("?")
                );
                corpus.reject(format!("not a zip file: {:?}", e));
                continue;
            }
        };
        let mut names: Vec<String> = archive
            .file_names()
            .filter(|n| keep_file(n))
            .map(String::from)
            .collect();
        if names.is_empty() {
            return Err(Error::Custom(format!(
                "every member of {}.zip was filtered out; the keep_file rules do not fit this corpus",
                number
            )));
        }
        names.sort();
        let corpus = get_mut(catalogue, number).expect("accepted id present");
        corpus.files = names;
    }
    Ok(to_download)
}

/// Sample the first [SAMPLE_UNITS] translation units of a TMX stream and
/// collect the normalized language tags of their variants.
pub fn sample_tmx<R: BufRead>(reader: R) -> Result<BTreeSet<String>, Error> {
    let mut xml = Reader::from_reader(reader);
    let mut buf = Vec::new();
    let mut languages = BTreeSet::new();
    let mut units = 0usize;
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"tu" => {
                    units += 1;
                    if units > SAMPLE_UNITS {
                        break;
                    }
                }
                b"tuv" => {
                    for attr in e.attributes() {
                        let attr = attr.map_err(quick_xml::Error::from)?;
                        let key = attr.key.as_ref();
                        if key == b"xml:lang" || key == b"lang" {
                            let value = attr.unescape_value()?;
                            if let Some(code) = lang::normalize(&value) {
                                languages.insert(code);
                            }
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(languages)
}

/// Cross-validate declared languages against archive content.
///
/// Detected languages outside the declared set are logged as metadata
/// patches; declared languages never observed in any member are dropped.
/// A TMX member that fails to parse rejects the corpus.
pub fn verify_languages(catalogue: &mut Catalogue, src: &Path) -> Result<(), Error> {
    for number in accepted_ids(catalogue) {
        let (files, declared) = {
            let corpus = crate::corpus::get(catalogue, number).expect("accepted id present");
            (corpus.files.clone(), corpus.languages.clone())
        };
        let path = archive_path(src, number);
        let file = File::open(&path)?;
        let mut archive = zip::ZipArchive::new(file)?;
        let mut observed = BTreeSet::new();
        let mut sampled_any = false;
        for member in files.iter().filter(|f| f.ends_with(".tmx")) {
            let entry = archive.by_name(member)?;
            let detected = match sample_tmx(BufReader::new(entry)) {
                Ok(detected) => detected,
                Err(e) => {
                    let corpus = get_mut(catalogue, number).expect("accepted id present");
                    corpus.reject(format!("invalid TMX {}: {:?}", member, e));
                    break;
                }
            };
            if !detected.is_subset(&declared) {
                let missing: Vec<&String> = detected.difference(&declared).collect();
                info!(
                    "corpus {} member {} contains languages missing from the metadata: {:?}",
                    number, member, missing
                );
            }
            observed.extend(detected.iter().cloned());
            sampled_any = true;
            let corpus = get_mut(catalogue, number).expect("accepted id present");
            corpus.detected.insert(member.clone(), detected);
        }
        let corpus = get_mut(catalogue, number).expect("accepted id present");
        if corpus.accepted() && sampled_any {
            for dropped in declared.difference(&observed) {
                warn!(
                    "corpus {} declares language {} but no member contains it; dropping",
                    number, dropped
                );
            }
            corpus.languages = observed;
        }
    }
    Ok(())
}
