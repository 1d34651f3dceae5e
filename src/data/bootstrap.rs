/// First-run resource bootstrap - downloads orb images, icon and sound archive
///
/// Every step is skipped when its target already exists, so a complete resource
/// folder costs zero network requests. Downloads land in a temp file and are
/// renamed into place; their SHA-256 is recorded in `manifest.json` and checked
/// on later runs so a damaged file gets fetched again.
use crate::constants::{DOWNLOAD_TIMEOUT_SECS, MANIFEST_FILE, SOUNDS_ARCHIVE_FILE, SOUNDS_DIR};
use crate::models::ResourceSpec;
use crate::utils::errors::BootstrapError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct BootstrapReport {
    pub downloaded: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
    pub extracted: bool,
    pub requests: usize,
}

/// SHA-256 of each file this bootstrap downloaded (or first saw on disk)
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ResourceManifest {
    pub files: BTreeMap<String, String>,
}

impl ResourceManifest {
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(MANIFEST_FILE);
        let Ok(raw) = fs::read_to_string(&path) else {
            return Self::default();
        };
        match serde_json::from_str(&raw) {
            Ok(manifest) => manifest,
            Err(e) => {
                log::warn!("[Bootstrap] Ignoring unreadable manifest {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, dir: &Path) -> Result<(), BootstrapError> {
        let path = dir.join(MANIFEST_FILE);
        let json = serde_json::to_vec_pretty(self).map_err(|e| {
            BootstrapError::io(&path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| BootstrapError::io(dir, e))?;
        tmp.write_all(&json).map_err(|e| BootstrapError::io(tmp.path(), e))?;
        tmp.persist(&path)
            .map_err(|e| BootstrapError::io(&path, e.error))?;
        Ok(())
    }
}

/// Make sure every resource in `specs` exists under `dir`, then unpack the
/// sound archive if the sounds folder is missing.
///
/// Only a failure to create `dir` itself is returned as an error; individual
/// download failures are logged with a manual fix and listed in the report.
pub fn ensure_resources(dir: &Path, specs: &[ResourceSpec]) -> Result<BootstrapReport, BootstrapError> {
    fs::create_dir_all(dir).map_err(|e| BootstrapError::io(dir, e))?;

    let mut report = BootstrapReport::default();
    let mut manifest = ResourceManifest::load(dir);
    let mut manifest_dirty = false;
    let mut client: Option<reqwest::blocking::Client> = None;

    for spec in specs {
        let target = dir.join(&spec.file_name);

        if target.exists() {
            match verify_existing(&target, spec, &manifest) {
                Ok(Existing::Intact(digest)) => {
                    if manifest.files.get(&spec.file_name) != Some(&digest) {
                        manifest.files.insert(spec.file_name.clone(), digest);
                        manifest_dirty = true;
                    }
                    report.skipped.push(spec.file_name.clone());
                    continue;
                }
                Ok(Existing::Corrupt { expected, actual }) => {
                    log::warn!(
                        "[Bootstrap] {} is damaged (expected {}, found {}), fetching again",
                        target.display(),
                        expected,
                        actual
                    );
                }
                Err(e) => {
                    log::warn!("[Bootstrap] Could not verify {}: {}", target.display(), e);
                    report.skipped.push(spec.file_name.clone());
                    continue;
                }
            }
        }

        if client.is_none() {
            match crate::utils::http::download_client(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS)) {
                Ok(c) => client = Some(c),
                Err(e) => {
                    log::error!("[Bootstrap] Failed to build HTTP client: {}", e);
                    report.failed.push(spec.file_name.clone());
                    continue;
                }
            }
        }
        let Some(http) = client.as_ref() else {
            continue;
        };

        report.requests += 1;
        match download(http, spec, dir, &target) {
            Ok(digest) => {
                log::info!("[Bootstrap] Downloaded {}", spec.file_name);
                manifest.files.insert(spec.file_name.clone(), digest);
                manifest_dirty = true;
                report.downloaded.push(spec.file_name.clone());
            }
            Err(e) => {
                log::error!(
                    "[Bootstrap] {}. Please download {} manually into {}",
                    e,
                    spec.url,
                    target.display()
                );
                report.failed.push(spec.file_name.clone());
            }
        }
    }

    if manifest_dirty {
        if let Err(e) = manifest.save(dir) {
            log::warn!("[Bootstrap] Could not write manifest: {}", e);
        }
    }

    match extract_sounds(dir) {
        Ok(extracted) => report.extracted = extracted,
        Err(e) => log::error!(
            "[Bootstrap] {}. Please unzip {} into {} manually",
            e,
            SOUNDS_ARCHIVE_FILE,
            dir.join(SOUNDS_DIR).display()
        ),
    }

    Ok(report)
}

enum Existing {
    Intact(String),
    Corrupt { expected: String, actual: String },
}

fn verify_existing(
    target: &Path,
    spec: &ResourceSpec,
    manifest: &ResourceManifest,
) -> Result<Existing, BootstrapError> {
    let actual = sha256_file(target)?;
    let expected = spec
        .sha256
        .as_ref()
        .or_else(|| manifest.files.get(&spec.file_name));

    match expected {
        Some(expected) if !expected.eq_ignore_ascii_case(&actual) => Ok(Existing::Corrupt {
            expected: expected.clone(),
            actual,
        }),
        _ => Ok(Existing::Intact(actual)),
    }
}

/// Stream `spec.url` into a temp file next to `target`, hashing on the way.
/// The target only appears once the body is complete and verified.
fn download(
    client: &reqwest::blocking::Client,
    spec: &ResourceSpec,
    dir: &Path,
    target: &Path,
) -> Result<String, BootstrapError> {
    let mut response = client.get(&spec.url).send().map_err(|e| BootstrapError::Download {
        url: spec.url.clone(),
        reason: e.to_string(),
    })?;

    if response.status() != reqwest::StatusCode::OK {
        return Err(BootstrapError::Status {
            url: spec.url.clone(),
            status: response.status().as_u16(),
        });
    }

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| BootstrapError::io(dir, e))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];

    loop {
        let n = response.read(&mut buf).map_err(|e| BootstrapError::Download {
            url: spec.url.clone(),
            reason: e.to_string(),
        })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        tmp.write_all(&buf[..n])
            .map_err(|e| BootstrapError::io(tmp.path(), e))?;
    }

    let digest = format!("{:x}", hasher.finalize());
    if let Some(expected) = &spec.sha256 {
        if !expected.eq_ignore_ascii_case(&digest) {
            return Err(BootstrapError::Checksum {
                file: spec.file_name.clone(),
                expected: expected.clone(),
                actual: digest,
            });
        }
    }

    tmp.persist(target)
        .map_err(|e| BootstrapError::io(target, e.error))?;
    Ok(digest)
}

pub fn sha256_file(path: &Path) -> Result<String, BootstrapError> {
    let mut file = fs::File::open(path).map_err(|e| BootstrapError::io(path, e))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(|e| BootstrapError::io(path, e))?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Unpack `sounds.zip` into `sounds/` if that folder does not exist yet.
/// Extraction happens in a staging folder that is renamed at the end, so an
/// interrupted run leaves no half-filled `sounds/` behind.
pub fn extract_sounds(dir: &Path) -> Result<bool, BootstrapError> {
    let sounds_dir = dir.join(SOUNDS_DIR);
    let archive_path = dir.join(SOUNDS_ARCHIVE_FILE);
    if sounds_dir.exists() || !archive_path.exists() {
        return Ok(false);
    }

    let archive_err = |reason: String| BootstrapError::Archive {
        path: archive_path.clone(),
        reason,
    };

    let file = fs::File::open(&archive_path).map_err(|e| BootstrapError::io(&archive_path, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| archive_err(e.to_string()))?;

    let staging = tempfile::Builder::new()
        .prefix("sounds.")
        .tempdir_in(dir)
        .map_err(|e| BootstrapError::io(dir, e))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| archive_err(e.to_string()))?;
        let Some(relative) = entry.enclosed_name() else {
            log::warn!("[Bootstrap] Skipping unsafe archive entry {}", entry.name());
            continue;
        };
        let out_path: PathBuf = staging.path().join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| BootstrapError::io(&out_path, e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| BootstrapError::io(parent, e))?;
        }
        let mut out = fs::File::create(&out_path).map_err(|e| BootstrapError::io(&out_path, e))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| archive_err(e.to_string()))?;
    }

    let staged = staging.keep();
    fs::rename(&staged, &sounds_dir).map_err(|e| BootstrapError::io(&sounds_dir, e))?;
    log::info!("[Bootstrap] Extracted sounds into {}", sounds_dir.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FileServer {
        base_url: String,
        hits: Arc<AtomicUsize>,
    }

    /// Serves `files` by name; anything else is a 404
    fn serve(files: HashMap<String, Vec<u8>>) -> FileServer {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = Arc::clone(&hits);

        std::thread::spawn(move || {
            for request in server.incoming_requests() {
                hits_clone.fetch_add(1, Ordering::SeqCst);
                let name = request.url().trim_start_matches('/').to_string();
                let response = match files.get(&name) {
                    Some(body) => tiny_http::Response::from_data(body.clone()),
                    None => tiny_http::Response::from_data(b"missing".to_vec()).with_status_code(404),
                };
                let _ = request.respond(response);
            }
        });

        FileServer {
            base_url: format!("http://127.0.0.1:{}", port),
            hits,
        }
    }

    fn sounds_zip() -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer.start_file("cmcsounds/boop.mp3", options).unwrap();
        writer.write_all(b"boop").unwrap();
        writer.start_file("gavinsounds/bonk.mp3", options).unwrap();
        writer.write_all(b"bonk").unwrap();
        writer.start_file("../escape.mp3", options).unwrap();
        writer.write_all(b"nope").unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn asset_files() -> HashMap<String, Vec<u8>> {
        let mut files = HashMap::new();
        files.insert("orb-blue.png".to_string(), b"blue-png".to_vec());
        files.insert("orb-red.png".to_string(), b"red-png".to_vec());
        files.insert("favicon.png".to_string(), b"icon-png".to_vec());
        files.insert("sounds.zip".to_string(), sounds_zip());
        files
    }

    fn sha256_hex(bytes: &[u8]) -> String {
        format!("{:x}", Sha256::digest(bytes))
    }

    #[test]
    fn first_run_downloads_and_extracts_everything() {
        let server = serve(asset_files());
        let dir = tempfile::tempdir().unwrap();
        let specs = crate::models::default_resources(&server.base_url);

        let report = ensure_resources(dir.path(), &specs).unwrap();

        assert_eq!(report.downloaded.len(), 4);
        assert!(report.failed.is_empty());
        assert!(report.extracted);
        assert_eq!(server.hits.load(Ordering::SeqCst), 4);
        assert_eq!(fs::read(dir.path().join("orb-red.png")).unwrap(), b"red-png");
        assert_eq!(
            fs::read(dir.path().join("sounds/cmcsounds/boop.mp3")).unwrap(),
            b"boop"
        );
        assert!(dir.path().join("sounds/gavinsounds/bonk.mp3").exists());
        assert!(!dir.path().join("escape.mp3").exists());

        let manifest = ResourceManifest::load(dir.path());
        assert_eq!(manifest.files["orb-blue.png"], sha256_hex(b"blue-png"));
    }

    #[test]
    fn second_run_makes_no_requests() {
        let server = serve(asset_files());
        let dir = tempfile::tempdir().unwrap();
        let specs = crate::models::default_resources(&server.base_url);

        ensure_resources(dir.path(), &specs).unwrap();
        let before = server.hits.load(Ordering::SeqCst);

        let report = ensure_resources(dir.path(), &specs).unwrap();
        assert_eq!(server.hits.load(Ordering::SeqCst), before);
        assert_eq!(report.requests, 0);
        assert_eq!(report.skipped.len(), 4);
        assert!(!report.extracted);
    }

    #[test]
    fn preexisting_files_are_trusted_without_network() {
        let server = serve(HashMap::new());
        let dir = tempfile::tempdir().unwrap();
        for name in ["orb-blue.png", "orb-red.png", "favicon.png", "sounds.zip"] {
            fs::write(dir.path().join(name), name.as_bytes()).unwrap();
        }
        fs::create_dir(dir.path().join("sounds")).unwrap();
        let specs = crate::models::default_resources(&server.base_url);

        let report = ensure_resources(dir.path(), &specs).unwrap();
        assert_eq!(server.hits.load(Ordering::SeqCst), 0);
        assert_eq!(report.skipped.len(), 4);
        assert_eq!(
            ResourceManifest::load(dir.path()).files["favicon.png"],
            sha256_hex(b"favicon.png")
        );
    }

    #[test]
    fn failed_download_is_reported_and_bootstrap_continues() {
        let mut files = asset_files();
        files.remove("orb-red.png");
        let server = serve(files);
        let dir = tempfile::tempdir().unwrap();
        let specs = crate::models::default_resources(&server.base_url);

        let report = ensure_resources(dir.path(), &specs).unwrap();
        assert_eq!(report.failed, vec!["orb-red.png".to_string()]);
        assert_eq!(report.downloaded.len(), 3);
        assert!(!dir.path().join("orb-red.png").exists());
        assert!(report.extracted);
    }

    #[test]
    fn pinned_checksum_mismatch_leaves_no_file() {
        let server = serve(asset_files());
        let dir = tempfile::tempdir().unwrap();
        let spec = ResourceSpec::new("orb-blue.png", format!("{}/orb-blue.png", server.base_url))
            .with_sha256(&sha256_hex(b"something else"));

        let report = ensure_resources(dir.path(), &[spec]).unwrap();
        assert_eq!(report.failed, vec!["orb-blue.png".to_string()]);
        assert!(!dir.path().join("orb-blue.png").exists());
        // No stray temp files and nothing recorded
        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn pinned_checksum_match_is_accepted() {
        let server = serve(asset_files());
        let dir = tempfile::tempdir().unwrap();
        let spec = ResourceSpec::new("orb-blue.png", format!("{}/orb-blue.png", server.base_url))
            .with_sha256(&sha256_hex(b"blue-png"));

        let report = ensure_resources(dir.path(), &[spec]).unwrap();
        assert_eq!(report.downloaded, vec!["orb-blue.png".to_string()]);
    }

    #[test]
    fn damaged_file_is_fetched_again() {
        let server = serve(asset_files());
        let dir = tempfile::tempdir().unwrap();
        let specs = crate::models::default_resources(&server.base_url);
        ensure_resources(dir.path(), &specs).unwrap();

        fs::write(dir.path().join("orb-blue.png"), b"trunc").unwrap();
        let before = server.hits.load(Ordering::SeqCst);

        let report = ensure_resources(dir.path(), &specs).unwrap();
        assert_eq!(report.downloaded, vec!["orb-blue.png".to_string()]);
        assert_eq!(server.hits.load(Ordering::SeqCst), before + 1);
        assert_eq!(fs::read(dir.path().join("orb-blue.png")).unwrap(), b"blue-png");
    }

    #[test]
    fn broken_archive_does_not_create_sounds_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("sounds.zip"), b"not a zip").unwrap();

        assert!(extract_sounds(dir.path()).is_err());
        assert!(!dir.path().join("sounds").exists());
    }
}
