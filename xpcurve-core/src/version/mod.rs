use crate::domain::BuildVersion;
use crate::error::{CurveError, Result};
use tracing::debug;

pub mod bpsv;

use bpsv::Bpsv;

/// Supplies the build currently published for a product in a region.
pub trait VersionSource: Send + Sync {
    fn current(&self, product: &str, region: &str) -> Result<BuildVersion>;
}

/// Queries the patch server's `versions` endpoint.
pub struct PatchServer {
    /// `{region}` and `{product}` are substituted per request.
    url_template: String,
    client: reqwest::blocking::Client,
}

impl PatchServer {
    pub fn new(url_template: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("xpcurve/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            url_template: url_template.into(),
            client,
        })
    }

    fn url(&self, product: &str, region: &str) -> String {
        self.url_template
            .replace("{region}", region)
            .replace("{product}", product)
    }
}

impl VersionSource for PatchServer {
    fn current(&self, product: &str, region: &str) -> Result<BuildVersion> {
        let url = self.url(product, region);
        debug!(%url, "fetching versions");
        let body = self.client.get(&url).send()?.error_for_status()?.text()?;
        build_from_versions(&body, region)
    }
}

/// Pick the `BuildId` of `region` out of a versions table.
pub fn build_from_versions(body: &str, region: &str) -> Result<BuildVersion> {
    let table = Bpsv::parse(body)?;
    let id = table
        .lookup("Region", region, "BuildId")?
        .ok_or_else(|| CurveError::Precondition(format!("no versions entry for region {region}")))?;
    BuildVersion::new(id)
}

/// Always reports the same build.
#[derive(Clone, Debug)]
pub struct StaticVersion(pub BuildVersion);

impl VersionSource for StaticVersion {
    fn current(&self, _product: &str, _region: &str) -> Result<BuildVersion> {
        Ok(self.0.clone())
    }
}
