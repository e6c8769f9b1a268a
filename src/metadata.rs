//! ELRC-SHARE metadata documents.
//!
//! Mirrors the JSON export schema of the repository. The export is
//! loosely typed: list-valued fields are serialized as a bare object
//! when there is a single element. [OneOrMany] absorbs that ambiguity
//! at the parse boundary so the rest of the crate only sees [Vec]s.
use serde::Deserialize;

use crate::error::Error;

/// A field that is sometimes a list, sometimes a single element.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(v) => vec![v],
            OneOrMany::Many(v) => v,
        }
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(v) => std::slice::from_ref(v),
            OneOrMany::Many(v) => v,
        }
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

#[derive(Debug, Deserialize)]
pub struct Document {
    #[serde(rename = "resourceInfo")]
    pub resource_info: ResourceInfo,
}

#[derive(Debug, Deserialize)]
pub struct ResourceInfo {
    #[serde(rename = "identificationInfo")]
    pub identification_info: IdentificationInfo,
    #[serde(rename = "relationInfo", default)]
    pub relation_info: OneOrMany<Relation>,
    #[serde(rename = "distributionInfo")]
    pub distribution_info: Option<OneOrMany<Distribution>>,
    #[serde(rename = "resourceComponentType")]
    pub resource_component_type: ResourceComponentType,
}

#[derive(Debug, Deserialize)]
pub struct IdentificationInfo {
    #[serde(rename = "resourceName")]
    pub resource_name: OneOrMany<LocalizedName>,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalizedName {
    #[serde(rename = "@lang")]
    pub lang: String,
    #[serde(rename = "#text")]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Relation {
    #[serde(rename = "relationType")]
    pub relation_type: String,
    #[serde(rename = "relatedResource")]
    pub related_resource: RelatedResource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelatedResource {
    #[serde(rename = "targetResourceNameURI")]
    pub target: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Distribution {
    #[serde(rename = "licenceInfo", default)]
    pub licence_info: OneOrMany<LicenceInfo>,
    #[serde(rename = "downloadLocation")]
    pub download_location: Option<OneOrMany<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LicenceInfo {
    pub licence: String,
}

#[derive(Debug, Deserialize)]
pub struct ResourceComponentType {
    #[serde(rename = "corpusInfo")]
    pub corpus_info: Option<CorpusInfo>,
}

#[derive(Debug, Deserialize)]
pub struct CorpusInfo {
    #[serde(rename = "corpusMediaType")]
    pub corpus_media_type: CorpusMediaType,
}

#[derive(Debug, Deserialize)]
pub struct CorpusMediaType {
    #[serde(rename = "corpusTextInfo", default)]
    pub corpus_text_info: OneOrMany<CorpusTextInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorpusTextInfo {
    #[serde(rename = "languageInfo", default)]
    pub language_info: OneOrMany<LanguageInfo>,
    #[serde(rename = "lingualityInfo")]
    pub linguality_info: LingualityInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageInfo {
    #[serde(rename = "languageId")]
    pub language_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LingualityInfo {
    #[serde(rename = "lingualityType")]
    pub linguality_type: String,
    #[serde(rename = "multilingualityType")]
    pub multilinguality_type: Option<String>,
}

/// Parse one exported metadata document.
///
/// The repository answers requests for unassigned identifiers with an
/// empty body rather than an error code, so zero-length content maps to
/// `Ok(None)`.
pub fn parse(raw: &[u8]) -> Result<Option<Document>, Error> {
    if raw.is_empty() {
        return Ok(None);
    }
    let doc = serde_json::from_slice(raw)?;
    Ok(Some(doc))
}

/// Resolve a relation target to a numeric identifier.
///
/// A handful of records reference related resources by title instead of
/// number. The catalogue is bounded, so the known titles are enumerated
/// here and anything else is a hard error: new free-text targets need a
/// curated mapping entry, not a guess.
pub fn relation_target(raw: &str) -> Result<usize, Error> {
    if let Ok(number) = raw.trim().parse() {
        return Ok(number);
    }
    match raw {
        "MARCELL Croatian legislative subcorpus" => Ok(2645),
        other => Err(Error::Custom(format!(
            "relation target {:?} is not a number and not in the known-title table",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_or_many() {
        let one: OneOrMany<u32> = serde_json::from_str("3").unwrap();
        assert_eq!(one.into_vec(), vec![3]);
        let many: OneOrMany<u32> = serde_json::from_str("[1,2]").unwrap();
        assert_eq!(many.into_vec(), vec![1, 2]);
    }

    #[test]
    fn empty_document_does_not_exist() {
        assert!(parse(b"").unwrap().is_none());
    }

    #[test]
    fn single_name_variant() {
        let raw = serde_json::json!({
            "resourceInfo": {
                "identificationInfo": {
                    "resourceName": {"@lang": "en", "#text": "Some corpus"},
                    "url": "https://example.org/info/1"
                },
                "resourceComponentType": {}
            }
        });
        let doc: Document = serde_json::from_value(raw).unwrap();
        let names = doc
            .resource_info
            .identification_info
            .resource_name
            .as_slice();
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].text, "Some corpus");
        assert!(doc.resource_info.distribution_info.is_none());
    }

    #[test]
    fn relation_targets() {
        assert_eq!(relation_target("2645").unwrap(), 2645);
        assert_eq!(
            relation_target("MARCELL Croatian legislative subcorpus").unwrap(),
            2645
        );
        assert!(relation_target("Some new corpus title").is_err());
    }
}
