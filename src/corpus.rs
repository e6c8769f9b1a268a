//! Corpus records and the identifier-indexed catalogue.
use std::collections::{BTreeMap, BTreeSet};

use log::warn;

use crate::error::Error;
use crate::metadata::{self, Document};

/// One catalogued resource, built once from its metadata document and
/// mutated in place by the later pipeline stages.
#[derive(Debug)]
pub struct Corpus {
    pub number: usize,
    /// Display name, preferring the English-tagged variant.
    pub name: String,
    /// Human-friendly identifier for downstream cataloguing.
    /// Defaults to the number; overrides may assign a nicer one.
    pub shortname: String,
    /// The name ends with "(Processed)", marking a cleaned derivative.
    pub processed_name: bool,
    pub info_url: String,
    /// Resolved download location. Exactly one for accepted corpora.
    pub download: Option<String>,
    /// Consent POST payload for click-wrapped open licenses.
    pub post: Option<String>,
    pub licenses: BTreeSet<String>,
    pub languages: BTreeSet<String>,
    pub linguality: BTreeSet<String>,
    /// hasVersion / isVersionOf edges. Messy: can mean revised or processed.
    pub versions: Vec<usize>,
    /// hasAlignedVersion / hasAnnotatedVersion / hasConvertedVersion edges.
    pub aligned_annotated: Vec<usize>,
    pub part_of: Vec<usize>,
    pub has_part: Vec<usize>,
    /// Rejection reason. [None] means accepted; once set it is final.
    pub rejected: Option<String>,
    /// Archive members kept after filtering.
    pub files: Vec<String>,
    /// Per TMX member, languages actually observed in a sample.
    pub detected: BTreeMap<String, BTreeSet<String>>,
}

impl Corpus {
    /// Extract identification and relations from a metadata document.
    /// Acceptance rules live in [crate::classify].
    pub fn from_document(number: usize, doc: &Document) -> Result<Self, Error> {
        let info = &doc.resource_info.identification_info;
        let names = info.resource_name.as_slice();
        let mut name = names
            .first()
            .map(|n| n.text.clone())
            .unwrap_or_else(|| number.to_string());
        for n in names {
            if n.lang == "en" {
                name = n.text.clone();
            }
        }

        let mut versions = Vec::new();
        let mut aligned_annotated = Vec::new();
        let mut part_of = Vec::new();
        let mut has_part = Vec::new();
        for relation in doc.resource_info.relation_info.as_slice() {
            let target = metadata::relation_target(&relation.related_resource.target)?;
            match relation.relation_type.as_str() {
                // If they aligned it for us, don't bother.
                "hasAlignedVersion" | "hasAnnotatedVersion" | "hasConvertedVersion" => {
                    aligned_annotated.push(target)
                }
                "hasVersion" | "isVersionOf" => versions.push(target),
                "isPartOf" => part_of.push(target),
                "hasPart" => has_part.push(target),
                _ => {}
            }
        }

        Ok(Corpus {
            number,
            processed_name: name.ends_with("(Processed)"),
            name,
            shortname: number.to_string(),
            info_url: info.url.clone(),
            download: None,
            post: None,
            licenses: BTreeSet::new(),
            languages: BTreeSet::new(),
            linguality: BTreeSet::new(),
            versions,
            aligned_annotated,
            part_of,
            has_part,
            rejected: None,
            files: Vec::new(),
            detected: BTreeMap::new(),
        })
    }

    /// Mark the corpus rejected. The first reason wins; rejection is
    /// terminal and later calls are no-ops.
    pub fn reject(&mut self, reason: impl Into<String>) {
        if self.rejected.is_some() {
            return;
        }
        let reason = reason.into();
        warn!("Reject {}: {}: {}", self.number, reason, self.name);
        self.rejected = Some(reason);
    }

    pub fn accepted(&self) -> bool {
        self.rejected.is_none()
    }

    /// Shell directive fetching this corpus's archive.
    pub fn wget(&self) -> String {
        let post = match &self.post {
            Some(payload) => format!(" --post-data='{}'", payload),
            None => String::new(),
        };
        format!(
            "wget -O {}.zip{} {}",
            self.number,
            post,
            self.download.as_deref().unwrap_or("")
        )
    }
}

/// Identifier-indexed collection with gaps for unassigned identifiers.
pub type Catalogue = Vec<Option<Corpus>>;

pub fn get(catalogue: &Catalogue, number: usize) -> Option<&Corpus> {
    catalogue.get(number).and_then(|c| c.as_ref())
}

pub fn get_mut(catalogue: &mut Catalogue, number: usize) -> Option<&mut Corpus> {
    catalogue.get_mut(number).and_then(|c| c.as_mut())
}

/// Identifiers of currently accepted corpora, in catalogue order.
pub fn accepted_ids(catalogue: &Catalogue) -> Vec<usize> {
    catalogue
        .iter()
        .flatten()
        .filter(|c| c.accepted())
        .map(|c| c.number)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(value: serde_json::Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    fn minimal(name: &str, relations: serde_json::Value) -> Document {
        document(serde_json::json!({
            "resourceInfo": {
                "identificationInfo": {
                    "resourceName": [
                        {"@lang": "hr", "#text": "Hrvatski naziv"},
                        {"@lang": "en", "#text": name}
                    ],
                    "url": "https://example.org/info/7"
                },
                "relationInfo": relations,
                "resourceComponentType": {}
            }
        }))
    }

    #[test]
    fn prefers_english_name() {
        let doc = minimal("Parliament proceedings (Processed)", serde_json::json!([]));
        let corpus = Corpus::from_document(7, &doc).unwrap();
        assert_eq!(corpus.name, "Parliament proceedings (Processed)");
        assert!(corpus.processed_name);
        assert_eq!(corpus.shortname, "7");
    }

    #[test]
    fn relation_buckets() {
        let doc = minimal(
            "Some corpus",
            serde_json::json!([
                {"relationType": "hasVersion",
                 "relatedResource": {"targetResourceNameURI": "12"}},
                {"relationType": "hasAlignedVersion",
                 "relatedResource": {"targetResourceNameURI": "13"}},
                {"relationType": "hasPart",
                 "relatedResource": {"targetResourceNameURI": "14"}},
                {"relationType": "isPartOf",
                 "relatedResource": {"targetResourceNameURI": "15"}},
                {"relationType": "isRelatedTo",
                 "relatedResource": {"targetResourceNameURI": "16"}}
            ]),
        );
        let corpus = Corpus::from_document(7, &doc).unwrap();
        assert_eq!(corpus.versions, vec![12]);
        assert_eq!(corpus.aligned_annotated, vec![13]);
        assert_eq!(corpus.has_part, vec![14]);
        assert_eq!(corpus.part_of, vec![15]);
    }

    #[test]
    fn unmapped_free_text_relation_is_fatal() {
        let doc = minimal(
            "Some corpus",
            serde_json::json!([
                {"relationType": "hasVersion",
                 "relatedResource": {"targetResourceNameURI": "A corpus nobody mapped"}}
            ]),
        );
        assert!(Corpus::from_document(7, &doc).is_err());
    }

    #[test]
    fn rejection_is_terminal() {
        let doc = minimal("Some corpus", serde_json::json!([]));
        let mut corpus = Corpus::from_document(7, &doc).unwrap();
        corpus.reject("first");
        corpus.reject("second");
        assert_eq!(corpus.rejected.as_deref(), Some("first"));
    }

    #[test]
    fn wget_directive() {
        let doc = minimal("Some corpus", serde_json::json!([]));
        let mut corpus = Corpus::from_document(7, &doc).unwrap();
        corpus.download = Some("https://example.org/dl/7".to_string());
        assert_eq!(corpus.wget(), "wget -O 7.zip https://example.org/dl/7");
        corpus.post = Some("licence_agree=on".to_string());
        assert_eq!(
            corpus.wget(),
            "wget -O 7.zip --post-data='licence_agree=on' https://example.org/dl/7"
        );
    }
}
