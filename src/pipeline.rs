//! Catalogue pipeline.
//!
//! Drives the full batch: load every metadata document in the identifier
//! range, classify, resolve the relation graph, apply manual overrides,
//! gate on local archives, verify content and synthesize records. Fatal
//! inconsistencies abort the run; they mean the curated ruleset no
//! longer matches the repository and a human has to look.
use std::fs;
use std::path::PathBuf;

use log::info;

use crate::archive;
use crate::classify;
use crate::corpus::{get, Catalogue, Corpus};
use crate::error::Error;
use crate::graph;
use crate::metadata;
use crate::overrides;
use crate::records::{self, Entry};

/// ELRC metadata is sequentially numbered; this is above their maximum.
pub const NUM_MAX: usize = 5000;

pub const EXPORT_URL: &str = "https://www.elrc-share.eu/repository/export_json/";

/// This trait must be implemented for each Pipeline,
/// and is generic over the return type so that
/// any custom pipeline that needs a return type can use the
/// trait aswell.
pub trait Pipeline<T> {
    fn run(&self) -> Result<T, Error>;
}

/// Outcome of a pipeline run. The two fetch variants carry the
/// instructions to print before exiting with the matching status code.
#[derive(Debug)]
pub enum RunStatus {
    /// At least one metadata document is missing on disk.
    NeedMetadata,
    /// Archives to fetch, one wget directive per accepted corpus
    /// without a local zip.
    NeedArchives(Vec<String>),
    /// One record per (corpus, language pair).
    Records(Vec<Entry>),
}

/// Shell loop fetching the metadata documents that are still missing.
pub fn metadata_fetch_hint(max_id: usize) -> String {
    format!(
        "for ((i=0;i<{};++i)); do if [ ! -s $i.json ]; then echo wget -O $i.json {}$i/; fi; done | parallel",
        max_id, EXPORT_URL
    )
}

pub struct CataloguePipeline {
    src: PathBuf,
    max_id: usize,
}

impl CataloguePipeline {
    pub fn new(src: PathBuf, max_id: usize) -> Self {
        CataloguePipeline { src, max_id }
    }

    /// Load and classify the whole identifier range.
    ///
    /// A missing `{id}.json` means the export step has not run to
    /// completion and yields `Ok(None)`; a present-but-empty document
    /// means the identifier was never assigned and leaves a gap.
    fn load_catalogue(&self) -> Result<Option<Catalogue>, Error> {
        let mut catalogue: Catalogue = Vec::with_capacity(self.max_id);
        for number in 0..self.max_id {
            let path = self.src.join(format!("{}.json", number));
            let raw = match fs::read(&path) {
                Ok(raw) => raw,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(e.into()),
            };
            match metadata::parse(&raw)? {
                Some(doc) => {
                    let mut corpus = Corpus::from_document(number, &doc)?;
                    classify::classify(&mut corpus, &doc)?;
                    catalogue.push(Some(corpus));
                }
                None => catalogue.push(None),
            }
        }
        Ok(Some(catalogue))
    }
}

impl Pipeline<RunStatus> for CataloguePipeline {
    fn run(&self) -> Result<RunStatus, Error> {
        let mut catalogue = match self.load_catalogue()? {
            Some(catalogue) => catalogue,
            None => return Ok(RunStatus::NeedMetadata),
        };
        info!(
            "loaded {} corpora out of {} identifiers",
            catalogue.iter().flatten().count(),
            self.max_id
        );

        graph::resolve(&mut catalogue)?;
        overrides::apply(&mut catalogue, overrides::METADATA_FIXES)?;

        let to_download = archive::load_files(&mut catalogue, &self.src)?;
        if !to_download.is_empty() {
            let directives = to_download
                .iter()
                .map(|number| {
                    get(&catalogue, *number)
                        .expect("queued id present")
                        .wget()
                })
                .collect();
            return Ok(RunStatus::NeedArchives(directives));
        }

        overrides::apply(&mut catalogue, overrides::FILE_FIXES)?;
        archive::verify_languages(&mut catalogue, &self.src)?;

        let entries = records::records(&catalogue).collect::<Result<Vec<_>, _>>()?;
        info!("synthesized {} records", entries.len());
        Ok(RunStatus::Records(entries))
    }
}
