use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::ResolveError;

/// Snapshot vs. release channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildType {
    Snapshot,
    Release,
}
impl BuildType {
    pub const ALL: [BuildType; 2] = [BuildType::Snapshot, BuildType::Release];

    pub fn name(&self) -> &'static str {
        match self {
            BuildType::Snapshot => "snapshot",
            BuildType::Release => "release",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|b| b.name()).collect()
    }

    /// the path segment below the repository base URI
    pub fn content_segment(&self) -> &'static str {
        match self {
            BuildType::Snapshot => "snapshots/content",
            BuildType::Release => "releases/content",
        }
    }
}
impl FromStr for BuildType {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.iter()
            .find(|b| b.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| ResolveError::InvalidBuildType(s.to_string()))
    }
}
impl Display for BuildType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Public products live in the release repository, internal ones in the engineering repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryClass {
    Public,
    Internal,
}
impl RepositoryClass {
    pub fn name(&self) -> &'static str {
        match self {
            RepositoryClass::Public => "release",
            RepositoryClass::Internal => "eng",
        }
    }

    pub fn names() -> Vec<&'static str> {
        vec![RepositoryClass::Public.name(), RepositoryClass::Internal.name()]
    }
}
impl FromStr for RepositoryClass {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "release" | "public" => Ok(RepositoryClass::Public),
            "eng" | "internal" => Ok(RepositoryClass::Internal),
            _ => Err(ResolveError::InvalidRepositoryClass(s.to_string())),
        }
    }
}
impl Display for RepositoryClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The fixed product catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Product {
    Ds,
    Proxy,
    Sync,
    Metrics,
    Broker,
    DsWebConsole,
    ProxyWebConsole,
    SyncWebConsole,
    MetricsWebConsole,
    BrokerWebConsole,
    ServerSdk,
    LdapSdk,
    ScimRi,
    ScimSdk,

    QaTools,
    TexasMgmtNode,
    TestNode,
    TestNodePlugins,
    BrokerTestTool,
    Ssam,
    Connecticut,
}
impl Product {
    pub const PUBLIC: [Product; 14] = [
        Product::Ds, Product::Proxy, Product::Sync, Product::Metrics, Product::Broker,
        Product::DsWebConsole, Product::ProxyWebConsole,
        Product::SyncWebConsole, Product::MetricsWebConsole,
        Product::BrokerWebConsole,
        Product::ServerSdk, Product::LdapSdk,
        Product::ScimRi, Product::ScimSdk,
    ];

    pub const INTERNAL: [Product; 7] = [
        Product::QaTools, Product::TexasMgmtNode,
        Product::TestNode, Product::TestNodePlugins,
        Product::BrokerTestTool, Product::Ssam, Product::Connecticut,
    ];

    pub fn all() -> impl Iterator<Item = Product> {
        Self::PUBLIC.into_iter().chain(Self::INTERNAL)
    }

    pub fn names() -> Vec<&'static str> {
        Self::all().map(|p| p.name()).collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Product::Ds => "ds",
            Product::Proxy => "proxy",
            Product::Sync => "sync",
            Product::Metrics => "metrics",
            Product::Broker => "broker",
            Product::DsWebConsole => "ds-web-console",
            Product::ProxyWebConsole => "proxy-web-console",
            Product::SyncWebConsole => "sync-web-console",
            Product::MetricsWebConsole => "metrics-web-console",
            Product::BrokerWebConsole => "broker-web-console",
            Product::ServerSdk => "server-sdk",
            Product::LdapSdk => "ldapsdk",
            Product::ScimRi => "scim-ri",
            Product::ScimSdk => "scim-sdk",
            Product::QaTools => "qa-tools",
            Product::TexasMgmtNode => "texas-mgmt-node",
            Product::TestNode => "test-node",
            Product::TestNodePlugins => "test-node-plugins",
            Product::BrokerTestTool => "broker-test-tool",
            Product::Ssam => "ssam",
            Product::Connecticut => "connecticut",
        }
    }

    pub fn is_public(&self) -> bool {
        Self::PUBLIC.contains(self)
    }

    /// the repository a product is published to
    pub fn repository_class(&self) -> RepositoryClass {
        if self.is_public() {
            RepositoryClass::Public
        }
        else {
            RepositoryClass::Internal
        }
    }

    pub fn is_scim(&self) -> bool {
        self.name().starts_with("scim")
    }

    /// Release builds without an explicit qualifier get '-GA' appended - except for internal
    ///  products and the SDKs, which are published without a qualifier.
    pub fn defaults_to_ga(&self) -> bool {
        self.is_public() && !matches!(self, Product::LdapSdk | Product::ScimSdk | Product::ScimRi)
    }

    /// Some test artifacts are only ever published as jars
    pub fn forced_package_type(&self) -> Option<PackageType> {
        match self {
            Product::TestNodePlugins | Product::Connecticut => Some(PackageType::jar()),
            _ => None,
        }
    }
}
impl FromStr for Product {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .find(|p| p.name() == s)
            .ok_or_else(|| ResolveError::UnknownProduct(s.to_string()))
    }
}
impl Display for Product {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The file extension of the artifact to pick from a listing. "jar" is special: it stands for
///  the self-contained "jar-with-dependencies" archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageType(pub String);
impl PackageType {
    pub const JAR: &'static str = "jar";

    pub fn jar() -> PackageType {
        PackageType(Self::JAR.to_string())
    }

    pub fn zip() -> PackageType {
        PackageType("zip".to_string())
    }

    pub fn rpm() -> PackageType {
        PackageType("rpm".to_string())
    }

    pub fn is_jar(&self) -> bool {
        self.0 == Self::JAR
    }
}
impl Display for PackageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
