use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::config::RepositoryConfig;
use crate::error::ResolveError;
use crate::nexus::listing_xml::{parse_listing, CatalogEntry};
use crate::nexus::paths::{PathQuery, PathResolver};
use crate::nexus::products::{BuildType, PackageType, Product, RepositoryClass};
use crate::nexus::selector::{filter_by_package_type, list_versions, pick_by_date, pick_by_pattern, pick_latest, sort_by_recency, Artifact};
use crate::nexus::version::{VersionNumber, VersionSpec};
use crate::util::fetcher::Fetcher;

/// Everything a caller can ask for in a single resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    pub product: Product,
    pub build_type: BuildType,
    pub version: VersionSpec,
    pub qualifier: Option<String>,
    pub organization: String,
    pub package_type: PackageType,
    pub repository_class: RepositoryClass,
    pub as_of_date: Option<NaiveDate>,
}
impl ResolutionRequest {
    /// Validates and types the raw inputs. The repository class follows from the product, and
    ///  products that are only published as jars get the jar package type regardless of
    ///  `package_type`.
    pub fn new(
        product: &str,
        build_type: &str,
        version: &str,
        qualifier: Option<&str>,
        organization: &str,
        package_type: &str,
        as_of_date: Option<NaiveDate>,
    ) -> Result<ResolutionRequest, ResolveError> {
        let product: Product = product.parse()?;
        let build_type: BuildType = build_type.parse()?;

        Ok(ResolutionRequest {
            product,
            build_type,
            version: VersionSpec::parse(version),
            qualifier: qualifier.filter(|q| !q.is_empty()).map(|q| q.to_string()),
            organization: organization.to_string(),
            package_type: product.forced_package_type()
                .unwrap_or_else(|| PackageType(package_type.to_string())),
            repository_class: product.repository_class(),
            as_of_date,
        })
    }
}

/// A Nexus repository of one build type and repository class.
///
/// Every operation resolves a listing URI, fetches the listing, and selects from it. Nothing is
///  cached between calls.
pub struct Repository<F: Fetcher> {
    fetcher: Arc<F>,
    resolver: PathResolver,
    build_type: BuildType,
    repository_class: RepositoryClass,
    organization: String,
}
impl <F: Fetcher> Repository<F> {
    pub fn new(config: &RepositoryConfig, build_type: BuildType, repository_class: RepositoryClass, organization: &str, fetcher: Arc<F>) -> Repository<F> {
        Repository {
            fetcher,
            resolver: PathResolver::new(&config.release_base_uri, &config.eng_base_uri),
            build_type,
            repository_class,
            organization: organization.to_string(),
        }
    }

    /// like [Repository::new], validating build type and repository class names
    pub fn from_names(config: &RepositoryConfig, build_type: &str, repository_class: &str, organization: &str, fetcher: Arc<F>) -> Result<Repository<F>, ResolveError> {
        Ok(Self::new(config, build_type.parse()?, repository_class.parse()?, organization, fetcher))
    }

    /// a repository matching the request's build type, repository class and organization
    pub fn for_request(config: &RepositoryConfig, request: &ResolutionRequest, fetcher: Arc<F>) -> Repository<F> {
        Self::new(config, request.build_type, request.repository_class, &request.organization, fetcher)
    }

    async fn fetch_listing(&self, product: Product, version: Option<&str>, qualifier: Option<&str>) -> Result<Vec<CatalogEntry>, ResolveError> {
        let uri = self.resolver.resolve(&PathQuery {
            repository_class: self.repository_class,
            build_type: self.build_type,
            product,
            organization: &self.organization,
            version,
            qualifier,
        });

        let document = self.fetcher.fetch(&uri).await?;
        let entries = parse_listing(&document)?;
        debug!("{} entries listed at {}", entries.len(), uri);
        Ok(entries)
    }

    /// all versions of a product, highest first
    pub async fn get_versions(&self, product: Product) -> Result<Vec<VersionNumber>, ResolveError> {
        let entries = self.fetch_listing(product, None, None).await?;
        Ok(list_versions(&entries))
    }

    /// all builds of the given version, most recent first
    pub async fn get_artifacts(&self, product: Product, version: &str, qualifier: Option<&str>, package_type: &PackageType) -> Result<Vec<Artifact>, ResolveError> {
        let entries = self.fetch_listing(product, Some(version), qualifier).await?;
        let mut artifacts = filter_by_package_type(entries, package_type);
        sort_by_recency(&mut artifacts);
        Ok(artifacts)
    }

    pub async fn get_latest(&self, product: Product, version: &str, qualifier: Option<&str>, package_type: &PackageType) -> Result<Artifact, ResolveError> {
        let artifacts = self.get_artifacts(product, version, qualifier, package_type).await?;
        pick_latest(artifacts)
    }

    /// The most recent build of the highest version matching a pattern like "4.7.0.x"
    pub async fn get_latest_matching(&self, product: Product, version_pattern: &str, qualifier: Option<&str>, package_type: &PackageType) -> Result<Artifact, ResolveError> {
        let version = self.get_matching_version(product, version_pattern).await?;
        self.get_latest(product, version.as_str(), qualifier, package_type).await
    }

    /// the most recent build of the given version that was last modified on `date`
    pub async fn get_as_of_date(&self, product: Product, version: &str, qualifier: Option<&str>, package_type: &PackageType, date: NaiveDate) -> Result<Artifact, ResolveError> {
        let artifacts = self.get_artifacts(product, version, qualifier, package_type).await?;
        pick_by_date(artifacts, date)
    }

    pub async fn get_highest_version(&self, product: Product) -> Result<VersionNumber, ResolveError> {
        self.get_versions(product).await?
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::NoArtifactFound(format!("No versions of {} could be found.", product)))
    }

    async fn get_matching_version(&self, product: Product, version_pattern: &str) -> Result<VersionNumber, ResolveError> {
        let versions = self.get_versions(product).await?;
        pick_by_pattern(&versions, version_pattern).cloned()
    }

    /// Runs a complete resolution: "latest" and patterns are first turned into a concrete
    ///  version, then the build is selected by date if one was requested, by recency otherwise.
    pub async fn resolve(&self, request: &ResolutionRequest) -> Result<Artifact, ResolveError> {
        let product = request.product;
        let qualifier = request.qualifier.as_deref();

        let version = match &request.version {
            VersionSpec::Latest => self.get_highest_version(product).await?.to_string(),
            VersionSpec::Pattern(pattern) => self.get_matching_version(product, pattern).await?.to_string(),
            VersionSpec::Exact(version) => version.clone(),
        };
        info!("resolved version {} of {} to {}", request.version, product, version);

        match request.as_of_date {
            Some(date) => self.get_as_of_date(product, &version, qualifier, &request.package_type, date).await,
            None => self.get_latest(product, &version, qualifier, &request.package_type).await,
        }
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;

    use crate::util::fetcher::FetchError;
    use super::*;

    const DS_ROOT: &str = "http://nexus/release/snapshots/content/com/unboundid/product/ds/directory/";

    /// serves canned listings and records what was asked for
    struct ListingFetcher {
        listings: HashMap<String, Result<String, FetchError>>,
        requested: Mutex<Vec<String>>,
    }
    impl ListingFetcher {
        fn new(listings: Vec<(String, Result<String, FetchError>)>) -> Arc<ListingFetcher> {
            Arc::new(ListingFetcher {
                listings: listings.into_iter().collect(),
                requested: Default::default(),
            })
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for ListingFetcher {
        async fn fetch(&self, uri: &str) -> Result<Bytes, FetchError> {
            self.requested.lock().unwrap().push(uri.to_string());
            match self.listings.get(uri) {
                Some(Ok(document)) => Ok(Bytes::from(document.clone())),
                Some(Err(e)) => Err(e.clone()),
                None => Err(FetchError::NotFound { uri: uri.to_string() }),
            }
        }
    }

    fn listing(items: &[(&str, &str)]) -> String {
        let items: String = items.iter()
            .map(|(name, last_modified)| format!(
                "<content-item><resourceURI>http://nexus/files/{}</resourceURI><text>{}</text><lastModified>{}</lastModified></content-item>",
                name, name, last_modified,
            ))
            .collect();
        format!("<content><data>{}</data></content>", items)
    }

    fn config() -> RepositoryConfig {
        RepositoryConfig {
            release_base_uri: "http://nexus/release".to_string(),
            eng_base_uri: "http://nexus/eng/".to_string(),
            ..Default::default()
        }
    }

    fn ds_fetcher() -> Arc<ListingFetcher> {
        ListingFetcher::new(vec![
            (DS_ROOT.to_string(), Ok(listing(&[
                ("4.7.0.2-SNAPSHOT", "2021-07-01 10:00:00.0 CDT"),
                ("4.7.0.10-SNAPSHOT", "2021-07-02 10:00:00.0 CDT"),
                ("4.7.1.0-SNAPSHOT", "2021-07-03 10:00:00.0 CDT"),
                ("maven-metadata.xml", "2021-07-03 10:00:00.0 CDT"),
            ]))),
            (format!("{}4.7.1.0-SNAPSHOT", DS_ROOT), Ok(listing(&[
                ("directory-4.7.1.0-20210801.zip", "2021-08-01 09:00:00.0 CDT"),
                ("directory-4.7.1.0-20210802a.zip", "2021-08-02 08:00:00.0 CDT"),
                ("directory-4.7.1.0-20210802b.zip", "2021-08-02 18:00:00.0 CDT"),
                ("directory-4.7.1.0-20210803-no-je.zip", "2021-08-03 18:00:00.0 CDT"),
                ("directory-4.7.1.0-20210803.pom", "2021-08-03 18:00:00.0 CDT"),
            ]))),
            (format!("{}4.7.0.10-SNAPSHOT", DS_ROOT), Ok(listing(&[
                ("directory-4.7.0.10.zip", "2021-07-02 10:00:00.0 CDT"),
            ]))),
        ])
    }

    fn ds_repo(fetcher: Arc<ListingFetcher>) -> Repository<ListingFetcher> {
        Repository::new(&config(), BuildType::Snapshot, RepositoryClass::Public, "UnboundID", fetcher)
    }

    fn ds_request(version: &str, as_of_date: Option<NaiveDate>) -> ResolutionRequest {
        ResolutionRequest::new("ds", "snapshot", version, None, "UnboundID", "zip", as_of_date).unwrap()
    }

    #[tokio::test]
    async fn test_get_versions() {
        let fetcher = ds_fetcher();
        let versions = ds_repo(fetcher.clone()).get_versions(Product::Ds).await.unwrap();
        let versions: Vec<String> = versions.iter().map(|v| v.to_string()).collect();
        assert_eq!(versions, vec!["4.7.1.0", "4.7.0.10", "4.7.0.2"]);
        assert_eq!(fetcher.requested(), vec![DS_ROOT.to_string()]);
    }

    #[tokio::test]
    async fn test_get_artifacts_filters_and_sorts() {
        let artifacts = ds_repo(ds_fetcher())
            .get_artifacts(Product::Ds, "4.7.1.0", None, &PackageType::zip())
            .await
            .unwrap();
        let names: Vec<&str> = artifacts.iter().map(|a| a.display_name.as_str()).collect();
        assert_eq!(names, vec![
            "directory-4.7.1.0-20210802b.zip",
            "directory-4.7.1.0-20210802a.zip",
            "directory-4.7.1.0-20210801.zip",
        ]);
        assert_eq!(artifacts[0].download_uri, "http://nexus/files/directory-4.7.1.0-20210802b.zip");
    }

    #[tokio::test]
    async fn test_resolve_latest() {
        let fetcher = ds_fetcher();
        let artifact = ds_repo(fetcher.clone()).resolve(&ds_request("latest", None)).await.unwrap();
        assert_eq!(artifact.display_name, "directory-4.7.1.0-20210802b.zip");
        assert_eq!(fetcher.requested(), vec![DS_ROOT.to_string(), format!("{}4.7.1.0-SNAPSHOT", DS_ROOT)]);
    }

    #[tokio::test]
    async fn test_resolve_pattern() {
        let fetcher = ds_fetcher();
        let artifact = ds_repo(fetcher.clone()).resolve(&ds_request("4.7.0.x", None)).await.unwrap();
        assert_eq!(artifact.display_name, "directory-4.7.0.10.zip");
        assert_eq!(fetcher.requested().len(), 2);
    }

    #[tokio::test]
    async fn test_get_latest_matching() {
        let artifact = ds_repo(ds_fetcher())
            .get_latest_matching(Product::Ds, "4.7.0.x", None, &PackageType::zip())
            .await
            .unwrap();
        assert_eq!(artifact.display_name, "directory-4.7.0.10.zip");
    }

    #[tokio::test]
    async fn test_pattern_without_match() {
        let fetcher = ds_fetcher();
        let result = ds_repo(fetcher.clone()).resolve(&ds_request("4.8.0.x", None)).await;
        assert_eq!(result, Err(ResolveError::NoArtifactFound("A build matching the pattern '4.8.0.x' could not be found.".to_string())));
        assert_eq!(fetcher.requested().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_exact_as_of_date() {
        let fetcher = ds_fetcher();
        let date = NaiveDate::from_ymd_opt(2021, 8, 2);
        let artifact = ds_repo(fetcher.clone()).resolve(&ds_request("4.7.1.0", date)).await.unwrap();
        assert_eq!(artifact.display_name, "directory-4.7.1.0-20210802b.zip");
        assert_eq!(fetcher.requested(), vec![format!("{}4.7.1.0-SNAPSHOT", DS_ROOT)]);

        let artifact = ds_repo(ds_fetcher())
            .get_as_of_date(Product::Ds, "4.7.1.0", None, &PackageType::zip(), NaiveDate::from_ymd_opt(2021, 8, 1).unwrap())
            .await
            .unwrap();
        assert_eq!(artifact.display_name, "directory-4.7.1.0-20210801.zip");
    }

    #[tokio::test]
    async fn test_as_of_date_without_build() {
        let date = NaiveDate::from_ymd_opt(2021, 8, 3);
        let result = ds_repo(ds_fetcher()).resolve(&ds_request("4.7.1.0", date)).await;
        assert!(matches!(result, Err(ResolveError::NoArtifactFound(_))));
    }

    #[tokio::test]
    async fn test_empty_version_listing() {
        let fetcher = ListingFetcher::new(vec![(DS_ROOT.to_string(), Ok(listing(&[])))]);
        let result = ds_repo(fetcher).resolve(&ds_request("latest", None)).await;
        assert_eq!(result, Err(ResolveError::NoArtifactFound("No versions of ds could be found.".to_string())));
    }

    #[tokio::test]
    async fn test_empty_artifact_listing() {
        let fetcher = ListingFetcher::new(vec![(format!("{}4.7.1.0-SNAPSHOT", DS_ROOT), Ok(listing(&[])))]);
        let result = ds_repo(fetcher).get_latest(Product::Ds, "4.7.1.0", None, &PackageType::zip()).await;
        assert!(matches!(result, Err(ResolveError::NoArtifactFound(_))));
    }

    #[tokio::test]
    async fn test_not_found() {
        let result = ds_repo(ds_fetcher()).get_latest(Product::Ds, "9.9.9.9", None, &PackageType::zip()).await;
        assert_eq!(result, Err(ResolveError::NotFound { uri: format!("{}9.9.9.9-SNAPSHOT", DS_ROOT) }));
    }

    #[tokio::test]
    async fn test_other_fetch_errors_are_passed_on() {
        let fetcher = ListingFetcher::new(vec![
            (DS_ROOT.to_string(), Err(FetchError::Status { code: 401, message: "Unauthorized".to_string() })),
        ]);
        let result = ds_repo(fetcher).get_versions(Product::Ds).await;
        assert_eq!(result, Err(ResolveError::Fetch { message: "401 Unauthorized".to_string() }));
    }

    #[tokio::test]
    async fn test_internal_jar_product() {
        let root = "http://nexus/eng/snapshots/content/com/unboundid/qa/florida/test-node-plugins/";
        let fetcher = ListingFetcher::new(vec![
            (root.to_string(), Ok(listing(&[("1.1", "2021-01-01 00:00:00.0 CST")]))),
            (format!("{}1.1-SNAPSHOT", root), Ok(listing(&[
                ("test-node-plugins-1.1.jar", "2021-01-02 00:00:00.0 CST"),
                ("test-node-plugins-1.1-jar-with-dependencies.jar", "2021-01-01 00:00:00.0 CST"),
            ]))),
        ]);

        let request = ResolutionRequest::new("test-node-plugins", "snapshot", "latest", None, "UnboundID", "zip", None).unwrap();
        assert_eq!(request.package_type, PackageType::jar());
        assert_eq!(request.repository_class, RepositoryClass::Internal);

        let artifact = Repository::for_request(&config(), &request, fetcher).resolve(&request).await.unwrap();
        assert_eq!(artifact.display_name, "test-node-plugins-1.1-jar-with-dependencies.jar");
    }

    #[test]
    fn test_request_validation() {
        assert_eq!(
            ResolutionRequest::new("foo", "snapshot", "latest", None, "UnboundID", "zip", None),
            Err(ResolveError::UnknownProduct("foo".to_string())),
        );
        assert_eq!(
            ResolutionRequest::new("ds", "nightly", "latest", None, "UnboundID", "zip", None),
            Err(ResolveError::InvalidBuildType("nightly".to_string())),
        );
        assert!(matches!(
            Repository::from_names(&config(), "snapshot", "staging", "UnboundID", ds_fetcher()),
            Err(ResolveError::InvalidRepositoryClass(_)),
        ));

        let request = ResolutionRequest::new("ds", "RELEASE", "4.7.0.x", Some(""), "ALU", "rpm", None).unwrap();
        assert_eq!(request.build_type, BuildType::Release);
        assert_eq!(request.version, VersionSpec::Pattern("4.7.0.x".to_string()));
        assert_eq!(request.qualifier, None);
        assert_eq!(request.package_type, PackageType::rpm());
    }

    #[tokio::test]
    async fn test_unknown_product_fetches_nothing() {
        let fetcher = ds_fetcher();
        let result = match ResolutionRequest::new("dss", "snapshot", "latest", None, "UnboundID", "zip", None) {
            Ok(request) => Repository::for_request(&config(), &request, fetcher.clone()).resolve(&request).await,
            Err(e) => Err(e),
        };
        assert_eq!(result, Err(ResolveError::UnknownProduct("dss".to_string())));
        assert!(fetcher.requested().is_empty());
    }

    #[tokio::test]
    async fn test_release_ldapsdk_uses_commercial_edition() {
        let root = "http://nexus/release/releases/content/com/unboundid/product/ldapsdk/";
        let fetcher = ListingFetcher::new(vec![
            (format!("{}4.0.0-ce", root), Ok(listing(&[("unboundid-ldapsdk-4.0.0-ce.zip", "2017-06-01 00:00:00.0 CDT")]))),
        ]);
        let repo = Repository::from_names(&config(), "release", "release", "UnboundID", fetcher.clone()).unwrap();

        let artifact = repo.get_latest(Product::LdapSdk, "4.0.0", None, &PackageType::zip()).await.unwrap();
        assert_eq!(artifact.display_name, "unboundid-ldapsdk-4.0.0-ce.zip");
        assert_eq!(fetcher.requested(), vec![format!("{}4.0.0-ce", root)]);
    }
}
