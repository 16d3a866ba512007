use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::anyhow;
use chrono::NaiveDate;
use clap::{ArgAction, Parser};
use lazy_static::lazy_static;
use regex::Regex;

use crate::config::{Credentials, RepositoryConfig, DEFAULT_ENG_BASE_URI, DEFAULT_RELEASE_BASE_URI, DEFAULT_TIMEOUT_SECS};
use crate::error::ResolveError;
use crate::nexus::products::{BuildType, PackageType, Product};
use crate::nexus::repository::ResolutionRequest;
use crate::nexus::version::VersionSpec;

const ALU_INVOCATION: &str = "getalubuild";
const RPM_INVOCATION: &str = "getrpmbuild";

lazy_static! {
    /// an LDAP SDK version carrying an edition marker like "-ce" or "-se"
    static ref LDAPSDK_EDITION_REGEX: Regex = Regex::new(r"^.+-[a-z]e.*$").unwrap();
}

#[derive(Parser, Debug)]
#[command(
    name = "getbuild",
    version,
    about = "Download the latest build from the Nexus artifact repository.",
    after_help = "Examples:\n  getbuild broker\n  getbuild ds snapshot 3.2.0.0 M1\n  getbuild proxy release 4.7.0.x\n\n\
        Invoked as 'getalubuild', Alcatel-Lucent builds are retrieved instead of UnboundID builds.\n\
        Invoked as 'getrpmbuild', RPM builds are retrieved instead of zips.\n\n\
        A qualifier starting with '-' must follow '--', e.g. 'getbuild ds 3.2.0.0 -- -M1'.",
)]
pub struct Args {
    /// PRODUCT, optionally followed by BUILD_TYPE ('snapshot' or 'release'), VERSION (e.g.
    /// '4.7.0.3', '4.7.0.x' or 'latest') and QUALIFIER (e.g. 'I2'), in any order
    #[arg(required = true, value_name = "PRODUCT [ARGUMENTS]")]
    pub words: Vec<String>,

    /// Suppress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the artifact URL without downloading it
    #[arg(short, long)]
    pub print_url_only: bool,

    /// Download the latest build from the given date
    #[arg(short = 'f', long = "from", value_name = "YYYY-MM-DD")]
    pub from: Option<String>,

    /// Organization whose build to retrieve [default: UnboundID, or ALU as 'getalubuild']
    #[arg(long)]
    pub organization: Option<String>,

    /// File extension of the build [default: zip, or rpm as 'getrpmbuild']
    #[arg(long)]
    pub package_type: Option<String>,

    /// Where to save the build [default: the artifact's file name]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// More diagnostic output on stderr (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(long, env = "GETBUILD_RELEASE_URI", default_value = DEFAULT_RELEASE_BASE_URI)]
    pub release_uri: String,

    #[arg(long, env = "GETBUILD_ENG_URI", default_value = DEFAULT_ENG_BASE_URI)]
    pub eng_uri: String,

    #[arg(long, env = "GETBUILD_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "GETBUILD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// HTTP request timeout
    #[arg(long, env = "GETBUILD_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}
impl Args {
    pub fn repository_config(&self) -> RepositoryConfig {
        RepositoryConfig {
            release_base_uri: self.release_uri.clone(),
            eng_base_uri: self.eng_uri.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            credentials: self.username.as_ref().map(|username| Credentials {
                username: username.clone(),
                password: self.password.clone().unwrap_or_default(),
            }),
            ..Default::default()
        }
    }

    /// Turns the command line into a request. `invoked_as` is the program name, which selects
    ///  organization and package type defaults.
    pub fn resolution_request(&self, invoked_as: &str) -> anyhow::Result<ResolutionRequest> {
        let words = classify_words(&self.words)?;
        let version = with_default_edition(words.product, words.version);

        let program = Path::new(invoked_as)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let organization = self.organization.clone()
            .unwrap_or_else(|| (if program == ALU_INVOCATION { "ALU" } else { "UnboundID" }).to_string());
        let package_type = self.package_type.clone()
            .unwrap_or_else(|| (if program == RPM_INVOCATION { PackageType::rpm() } else { PackageType::zip() }).0);

        let as_of_date = match &self.from {
            Some(s) => Some(parse_build_date(s)?),
            None => None,
        };

        Ok(ResolutionRequest::new(
            words.product.name(),
            words.build_type.name(),
            &version,
            words.qualifier.as_deref(),
            &organization,
            &package_type,
            as_of_date,
        )?)
    }
}

pub fn parse_build_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| anyhow!("Build date should be in the format YYYY-MM-DD."))
}

#[derive(Debug, PartialEq, Eq)]
pub struct Words {
    pub product: Product,
    pub build_type: BuildType,
    pub version: String,
    pub qualifier: Option<String>,
}

/// Sorts the free-form positional words into product, build type, version and qualifier. The
///  first word that is none of the others is the qualifier.
pub fn classify_words(words: &[String]) -> Result<Words, ResolveError> {
    let mut product = None;
    let mut build_type = BuildType::Snapshot;
    let mut version = "latest".to_string();
    let mut rest = vec![];

    for word in words {
        if let Ok(b) = word.parse::<BuildType>() {
            build_type = b;
        }
        else if let Ok(p) = word.parse::<Product>() {
            product = Some(p);
        }
        else if looks_like_version(word) {
            version = word.clone();
        }
        else {
            rest.push(word.clone());
        }
    }

    let product = product
        .ok_or_else(|| ResolveError::UnknownProduct(rest.first().cloned().unwrap_or_default()))?;

    Ok(Words {
        product,
        build_type,
        version,
        qualifier: rest.into_iter().next(),
    })
}

/// An exact LDAP SDK version without an edition marker means the commercial edition
fn with_default_edition(product: Product, version: String) -> String {
    if product == Product::LdapSdk
        && matches!(VersionSpec::parse(&version), VersionSpec::Exact(_))
        && !LDAPSDK_EDITION_REGEX.is_match(&version)
    {
        format!("{}-ce", version)
    }
    else {
        version
    }
}

/// "latest", a word without letters except the 'x' wildcard, or a dotted word starting with a
///  digit like "4.0.0-se"
fn looks_like_version(word: &str) -> bool {
    word.eq_ignore_ascii_case("latest")
        || !word.chars().any(|c| c.is_ascii_alphabetic() && c != 'x' && c != 'X')
        || (word.starts_with(|c: char| c.is_ascii_digit()) && word.contains('.'))
}
