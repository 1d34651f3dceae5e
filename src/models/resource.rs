use crate::constants::*;

/// One asset fetched into the resource directory on first run
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSpec {
    pub file_name: String,
    pub url: String,
    pub sha256: Option<String>, // Pinned lowercase hex digest, if known
}

impl ResourceSpec {
    pub fn new(file_name: &str, url: String) -> Self {
        Self {
            file_name: file_name.to_string(),
            url,
            sha256: None,
        }
    }

    #[cfg(test)]
    pub fn with_sha256(mut self, digest: &str) -> Self {
        self.sha256 = Some(digest.to_ascii_lowercase());
        self
    }
}

/// Orb images, the sound archive and the window icon, served from `base_url`
pub fn default_resources(base_url: &str) -> Vec<ResourceSpec> {
    let base = base_url.trim_end_matches('/');
    [BLUE_ORB_FILE, RED_ORB_FILE, SOUNDS_ARCHIVE_FILE, FAVICON_FILE]
        .iter()
        .map(|name| ResourceSpec::new(name, format!("{}/{}", base, name)))
        .collect()
}
