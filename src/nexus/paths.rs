use lazy_static::lazy_static;
use tracing::debug;

use crate::nexus::products::{BuildType, Product, RepositoryClass};
use crate::nexus::version::VersionNumber;

lazy_static! {
    /// SCIM artifacts after this version are published with the "...scim.qa" group id
    static ref SCIM_QA_GROUP_AFTER: VersionNumber = VersionNumber::parse("1.0.0").unwrap();
    /// server product artifacts after this version live below "product/ds/"
    static ref DS_PATH_SCHEME_AFTER: VersionNumber = VersionNumber::parse("3.2.0.0").unwrap();
}

const ORG_PLACEHOLDER: &str = "{org}";
const OPT_PLACEHOLDER: &str = "{opt}";
const TEST_TOOLS_PATH: &str = "com/unboundid/directory/testtools/";

/// Where a product's artifacts live inside a repository, relative to the build type's content root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProductPath {
    /// contains `{org}` and optionally `{opt}` placeholders
    Template(&'static str),
    Fixed(&'static str),
}

fn product_path(repository_class: RepositoryClass, product: Product) -> Option<ProductPath> {
    use ProductPath::*;

    match repository_class {
        RepositoryClass::Public => match product {
            Product::Ds => Some(Template("com/{org}/product/{opt}directory")),
            Product::Proxy => Some(Template("com/{org}/product/{opt}proxy")),
            Product::Sync => Some(Template("com/{org}/product/{opt}sync")),
            Product::Metrics => Some(Template("com/{org}/product/{opt}metrics")),
            Product::Broker => Some(Template("com/{org}/product/{opt}broker")),
            Product::DsWebConsole => Some(Template("com/{org}/product/{opt}ds-web-console")),
            Product::ProxyWebConsole => Some(Template("com/{org}/product/{opt}proxy-web-console")),
            Product::SyncWebConsole => Some(Template("com/{org}/product/{opt}sync-web-console")),
            Product::MetricsWebConsole => Some(Template("com/{org}/product/{opt}metrics-web-console")),
            Product::BrokerWebConsole => Some(Template("com/{org}/product/{opt}broker-web-console")),
            Product::ServerSdk => Some(Template("com/{org}/product/{opt}server-sdk")),
            Product::ScimSdk => Some(Template("com/{org}/product/scim/{opt}scim-sdk")),
            Product::ScimRi => Some(Template("com/{org}/product/scim/{opt}scim-ri")),
            Product::LdapSdk => Some(Template("com/{org}/product/ldapsdk")),
            _ => None,
        },
        RepositoryClass::Internal => match product {
            Product::TexasMgmtNode => Some(Fixed("com/unboundid/qa/texas/node/mgmt/texas-mgmt-node")),
            Product::TestNode => Some(Fixed("com/unboundid/qa/florida/test-node")),
            Product::TestNodePlugins => Some(Fixed("com/unboundid/qa/florida/test-node-plugins")),
            Product::BrokerTestTool => Some(Fixed("com/unboundid/qa/tools/broker/broker-test-tool")),
            Product::Ssam => Some(Fixed("com/unboundid/webapp/ssam")),
            _ => None,
        },
    }
}

/// Everything that determines a listing URI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathQuery<'a> {
    pub repository_class: RepositoryClass,
    pub build_type: BuildType,
    pub product: Product,
    pub organization: &'a str,
    /// no version means the product's version listing
    pub version: Option<&'a str>,
    pub qualifier: Option<&'a str>,
}

/// Maps a [PathQuery] to the URI of a Nexus content listing. This is a pure function of the
///  query and the two configured base URIs.
#[derive(Debug, Clone)]
pub struct PathResolver {
    release_base_uri: String, // without trailing '/'
    eng_base_uri: String,     // without trailing '/'
}
impl PathResolver {
    pub fn new(release_base_uri: &str, eng_base_uri: &str) -> PathResolver {
        PathResolver {
            release_base_uri: release_base_uri.trim_end_matches('/').to_string(),
            eng_base_uri: eng_base_uri.trim_end_matches('/').to_string(),
        }
    }

    pub fn resolve(&self, query: &PathQuery) -> String {
        let version = query.version.filter(|v| !v.is_empty());
        let qualifier = query.qualifier.filter(|q| !q.is_empty());

        let base_uri = match query.repository_class {
            RepositoryClass::Public => &self.release_base_uri,
            RepositoryClass::Internal => &self.eng_base_uri,
        };

        let product_path = match product_path(query.repository_class, query.product) {
            Some(ProductPath::Template(template)) => template
                .replace(ORG_PLACEHOLDER, &query.organization.to_lowercase())
                .replace(OPT_PLACEHOLDER, path_modifier(query.product, version)),
            Some(ProductPath::Fixed(path)) => path.to_string(),
            // anything without a path of its own is assumed to be a test tool
            None => format!("{}{}", TEST_TOOLS_PATH, query.product.name()),
        };

        let version_segment = match version {
            Some(v) => version_segment(query.product, query.build_type, v, qualifier),
            None => "".to_string(),
        };

        let uri = format!(
            "{}/{}/{}/{}",
            base_uri,
            query.build_type.content_segment(),
            product_path,
            version_segment,
        );
        debug!("resolved {:?} to {}", query, uri);
        uri
    }
}

/// the replacement for the `{opt}` placeholder
fn path_modifier(product: Product, version: Option<&str>) -> &'static str {
    // an unparseable version (i.e. an empty one) counts as no version at all
    let version = version.and_then(|v| VersionNumber::parse(v).ok());
    let newer_than = |threshold: &VersionNumber| match &version {
        Some(v) => v > threshold,
        None => true,
    };

    if product.is_scim() && newer_than(&*SCIM_QA_GROUP_AFTER) {
        "qa/"
    }
    else if !matches!(product, Product::ScimSdk | Product::ScimRi | Product::LdapSdk) && newer_than(&*DS_PATH_SCHEME_AFTER) {
        "ds/"
    }
    else {
        ""
    }
}

fn version_segment(product: Product, build_type: BuildType, version: &str, qualifier: Option<&str>) -> String {
    let mut result = version.to_string();
    let mut qualifier = qualifier;

    // the LDAP SDK defaults to the commercial edition. The qualifier becomes the edition marker
    //  and must not be appended a second time below
    if product == Product::LdapSdk && !(version.contains("-ce") || version.contains("-se")) {
        result.push_str(qualifier.unwrap_or("-ce"));
        qualifier = None;
    }

    match build_type {
        BuildType::Snapshot => match qualifier {
            Some(q) => result.push_str(&format!("_{}-SNAPSHOT", q)),
            None => result.push_str("-SNAPSHOT"),
        },
        BuildType::Release => match qualifier {
            Some(q) => result.push_str(&format!("-{}", q)),
            None => if product.defaults_to_ga() {
                result.push_str("-GA");
            },
        },
    }
    result
}
