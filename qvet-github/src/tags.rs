//! Release tag lookup

use crate::{RepoHost, Result};
use qvet_core::ReleaseConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Tags requested per listing page
pub const TAGS_PER_PAGE: u8 = 100;

/// A repository tag and the commit it points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub commit_sha: String,
}

/// Naming convention for production release tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSelector {
    /// Tags must start with this prefix
    pub prefix: String,
    /// ...and must not start with this one
    pub excluded_prefix: String,
}

impl TagSelector {
    pub fn new(prefix: impl Into<String>, excluded_prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            excluded_prefix: excluded_prefix.into(),
        }
    }

    /// Whether a tag name marks a production release
    pub fn matches(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
            && (self.excluded_prefix.is_empty() || !name.starts_with(&self.excluded_prefix))
    }
}

impl Default for TagSelector {
    fn default() -> Self {
        Self::new("prod-", "prod-revert-")
    }
}

impl From<&ReleaseConfig> for TagSelector {
    fn from(config: &ReleaseConfig) -> Self {
        Self::new(&config.tag_prefix, &config.excluded_tag_prefix)
    }
}

/// Find the latest production tag
///
/// Walks the tag listing in host order (newest first on GitHub) and returns
/// the first tag accepted by `selector`. Pages are fetched lazily; the scan
/// stops at the first match or at the first short page.
pub async fn find_latest_prod_tag<H>(host: &H, selector: &TagSelector) -> Result<Option<Tag>>
where
    H: RepoHost + ?Sized,
{
    debug!(repo = %host.repo(), prefix = %selector.prefix, "Looking for latest release tag");

    let mut page = 1u32;
    loop {
        let tags = host.list_tags(page, TAGS_PER_PAGE).await?;
        let page_len = tags.len();

        if let Some(tag) = tags.into_iter().find(|t| selector.matches(&t.name)) {
            info!(tag = %tag.name, sha = %tag.commit_sha, page, "Found release tag");
            return Ok(Some(tag));
        }

        if page_len < usize::from(TAGS_PER_PAGE) {
            break;
        }
        page += 1;
    }

    info!(pages = page, "No release tag found");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeHost;

    fn tags(names: &[&str]) -> Vec<Tag> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Tag {
                name: name.to_string(),
                commit_sha: format!("sha{}", i),
            })
            .collect()
    }

    #[test]
    fn test_selector_matches() {
        let selector = TagSelector::default();
        assert!(selector.matches("prod-8"));
        assert!(!selector.matches("prod-revert-9"));
        assert!(!selector.matches("v1"));
        assert!(!selector.matches("staging-prod-1"));
    }

    #[test]
    fn test_selector_without_exclusion() {
        let selector = TagSelector::new("release-", "");
        assert!(selector.matches("release-1"));
    }

    #[tokio::test]
    async fn test_skips_revert_tags() {
        let host = FakeHost::new().with_tags(tags(&["prod-revert-9", "prod-8", "v1"]));

        let tag = find_latest_prod_tag(&host, &TagSelector::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tag.name, "prod-8");
        assert_eq!(tag.commit_sha, "sha1");
    }

    #[tokio::test]
    async fn test_returns_first_in_listing_order() {
        let host = FakeHost::new().with_tags(tags(&["v2", "prod-12", "prod-11"]));

        let tag = find_latest_prod_tag(&host, &TagSelector::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tag.name, "prod-12");
    }

    #[tokio::test]
    async fn test_no_matching_tag() {
        let host = FakeHost::new().with_tags(tags(&["prod-revert-1", "v1", "staging-3"]));

        let tag = find_latest_prod_tag(&host, &TagSelector::default())
            .await
            .unwrap();
        assert!(tag.is_none());
        assert_eq!(host.tag_pages_fetched(), 1);
    }

    #[tokio::test]
    async fn test_scans_later_pages() {
        let mut names: Vec<String> = (0..150).map(|i| format!("v{}", i)).collect();
        names[120] = "prod-3".to_string();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let host = FakeHost::new().with_tags(tags(&refs));

        let tag = find_latest_prod_tag(&host, &TagSelector::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tag.name, "prod-3");
        assert_eq!(host.tag_pages_fetched(), 2);
    }

    #[tokio::test]
    async fn test_stops_at_first_match() {
        let mut names: Vec<String> = (0..250).map(|i| format!("v{}", i)).collect();
        names[3] = "prod-99".to_string();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let host = FakeHost::new().with_tags(tags(&refs));

        find_latest_prod_tag(&host, &TagSelector::default())
            .await
            .unwrap();
        assert_eq!(host.tag_pages_fetched(), 1);
    }

    #[tokio::test]
    async fn test_listing_error_is_upstream() {
        let host = FakeHost::new().failing();

        let err = find_latest_prod_tag(&host, &TagSelector::default())
            .await
            .unwrap_err();
        assert!(err.is_upstream());
    }
}
