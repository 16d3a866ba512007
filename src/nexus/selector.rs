use chrono::{NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ResolveError;
use crate::nexus::listing_xml::CatalogEntry;
use crate::nexus::products::PackageType;
use crate::nexus::version::VersionNumber;

lazy_static! {
    /// a dotted version at the end of a listing row's name, optionally followed by a build tag
    static ref TRAILING_VERSION_REGEX: Regex = Regex::new(
        r"(\d+(?:\.\d+)+)(?:-(?:SNAPSHOT|(?:ce|se)-SNAPSHOT|[cs]e|GA|RC\d+))?$"
    ).unwrap();
}

/// builds lacking the bundled Berkeley DB JE storage engine
const NO_EMBEDDED_DB_MARKER: &str = "no-je";
const JAR_WITH_DEPENDENCIES_SUFFIX: &str = "-jar-with-dependencies.jar";

/// A single downloadable build file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub display_name: String,
    pub download_uri: String,
    pub last_modified: NaiveDateTime,
}
impl From<CatalogEntry> for Artifact {
    fn from(entry: CatalogEntry) -> Self {
        Artifact {
            display_name: entry.display_name,
            download_uri: entry.resource_uri,
            last_modified: entry.last_modified,
        }
    }
}

/// Extracts the versions from a version listing, highest first. Rows that do not end in a
///  version (e.g. 'maven-metadata.xml') are skipped, duplicates are kept.
pub fn list_versions(entries: &[CatalogEntry]) -> Vec<VersionNumber> {
    let mut versions: Vec<VersionNumber> = entries.iter()
        .filter_map(|e| TRAILING_VERSION_REGEX.captures(&e.display_name))
        .filter_map(|c| VersionNumber::parse(&c[1]).ok())
        .collect();
    versions.sort_by(|a, b| b.cmp(a));
    versions
}

/// Keeps the rows that are actual builds of the given package type
pub fn filter_by_package_type(entries: Vec<CatalogEntry>, package_type: &PackageType) -> Vec<Artifact> {
    entries.into_iter()
        .filter(|e| is_build(&e.resource_uri, package_type))
        .map(Artifact::from)
        .collect()
}

fn is_build(uri: &str, package_type: &PackageType) -> bool {
    // for jars, only the self-contained one is of interest
    if package_type.is_jar() {
        return uri.ends_with(JAR_WITH_DEPENDENCIES_SUFFIX);
    }
    uri.ends_with(&format!(".{}", package_type)) && !uri.contains(NO_EMBEDDED_DB_MARKER)
}

/// sorts by last modification, most recent first
pub fn sort_by_recency(artifacts: &mut [Artifact]) {
    artifacts.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
}

pub fn pick_latest(mut artifacts: Vec<Artifact>) -> Result<Artifact, ResolveError> {
    sort_by_recency(&mut artifacts);
    artifacts.into_iter()
        .next()
        .ok_or_else(|| ResolveError::NoArtifactFound("Failed to retrieve artifact versions.".to_string()))
}

/// the first artifact last modified on the given day, regardless of time of day
pub fn pick_by_date(artifacts: Vec<Artifact>, date: NaiveDate) -> Result<Artifact, ResolveError> {
    artifacts.into_iter()
        .find(|a| a.last_modified.date() == date)
        .ok_or_else(|| ResolveError::NoArtifactFound(format!("The requested build from {} could not be found.", date)))
}

/// Picks the first of `versions` (expected to be sorted highest first) matching a pattern like
///  "4.7.0.x". The rightmost 'x' component matches a one or two digit number, all other
///  components must match exactly.
pub fn pick_by_pattern<'a>(versions: &'a [VersionNumber], pattern: &str) -> Result<&'a VersionNumber, ResolveError> {
    let matcher = pattern_matcher(pattern);
    versions.iter()
        .find(|v| matcher.is_match(v.as_str()))
        .ok_or_else(|| ResolveError::NoArtifactFound(format!("A build matching the pattern '{}' could not be found.", pattern)))
}

fn pattern_matcher(pattern: &str) -> Regex {
    let regex_string = match pattern.rsplit_once('.') {
        Some((prefix, "x")) => format!(r"^{}\.\d{{1,2}}$", regex::escape(prefix)),
        _ => format!("^{}$", regex::escape(pattern)),
    };
    // everything but the wildcard is escaped, so this is always a valid regex
    Regex::new(&regex_string).unwrap()
}
