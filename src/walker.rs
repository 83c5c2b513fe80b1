// Directory walker / orchestrator: finds the qualifying files under the
// local root and takes each one through folder creation, upload and
// persistence of its public link, one file at a time.

use crate::api::DiskApi;
use crate::error::{Error, Result};
use crate::folders::ensure_exists;
use crate::normalize::{remote_parent, remote_path_for};
use crate::retry::RetryPolicy;
use crate::store::ProgressStore;
use crate::ui::FailurePrompt;
use crate::upload::upload;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What to upload and where.
#[derive(Debug, Clone)]
pub struct Job {
    pub root: PathBuf,
    pub remote_base: String,
    /// Lowercased, without the leading dot.
    pub extensions: Vec<String>,
    /// Case-insensitive substring of the file name; empty matches all.
    pub name_filter: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub uploaded: usize,
    pub already_uploaded: usize,
    pub failed: usize,
}

/// A file that passed the extension and name filters.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub path: PathBuf,
    pub file_name: String,
    pub remote_path: String,
}

impl Job {
    /// Does `file_name` pass the extension and name filters?
    pub fn qualifies(&self, file_name: &str) -> bool {
        let ext = match Path::new(file_name).extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_lowercase(),
            None => return false,
        };
        self.extensions.iter().any(|e| *e == ext)
            && file_name
                .to_lowercase()
                .contains(&self.name_filter.to_lowercase())
    }

    /// Walk the root and list qualifying files in traversal order, with their
    /// remote destinations. Unreadable entries are logged and skipped.
    pub fn candidates(&self) -> Result<Vec<Candidate>> {
        if !self.root.is_dir() {
            return Err(Error::Config(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }
        let mut out = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("skipping unreadable entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !self.qualifies(&file_name) {
                continue;
            }
            let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            out.push(Candidate {
                remote_path: remote_path_for(relative, &self.remote_base),
                path: entry.path().to_path_buf(),
                file_name,
            });
        }
        Ok(out)
    }
}

/// Sequences the components for one run. Owns nothing global: the API client,
/// retry policy, store and failure policy are all handed in.
pub struct Uploader<'a, A: DiskApi + ?Sized, P: FailurePrompt> {
    api: &'a A,
    retry: RetryPolicy,
    store: ProgressStore,
    prompt: P,
    progress: ProgressBar,
}

impl<'a, A: DiskApi + ?Sized, P: FailurePrompt> Uploader<'a, A, P> {
    pub fn new(api: &'a A, retry: RetryPolicy, store: ProgressStore, prompt: P) -> Self {
        Uploader {
            api,
            retry,
            store,
            prompt,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Upload every qualifying file of `job` not yet in the mapping file.
    ///
    /// Each success is written to the mapping file before the next file
    /// starts. A failed file goes to the failure prompt; a "no" ends the
    /// run with [`Error::Aborted`]. Files are matched against the mapping by
    /// name only, so two files with the same name in different folders
    /// count as one.
    pub fn run(&mut self, job: &Job) -> Result<RunSummary> {
        let mut uploaded = self.store.load();
        let candidates = job.candidates()?;
        log::info!(
            "{} matching files under {}, {} already recorded in {}",
            candidates.len(),
            job.root.display(),
            uploaded.len(),
            self.store.path().display()
        );

        self.progress.set_length(candidates.len() as u64);
        let mut summary = RunSummary::default();
        for candidate in candidates {
            self.progress.set_message(candidate.file_name.clone());
            if uploaded.contains_key(&candidate.file_name) {
                log::info!("already uploaded: {}", candidate.file_name);
                summary.already_uploaded += 1;
                self.progress.inc(1);
                continue;
            }

            match self.process(&candidate) {
                Ok(public_url) => {
                    log::info!("uploaded {} -> {public_url}", candidate.file_name);
                    uploaded.insert(candidate.file_name.clone(), public_url.clone());
                    if let Err(e) = self.store.save(&uploaded) {
                        log::error!(
                            "link not saved to {}: {} -> {public_url}",
                            self.store.path().display(),
                            candidate.file_name
                        );
                        self.progress.abandon();
                        return Err(e);
                    }
                    summary.uploaded += 1;
                }
                Err(failure) => {
                    log::error!("{}: {failure}", candidate.path.display());
                    summary.failed += 1;
                    let prompt = &mut self.prompt;
                    if !self.progress.suspend(|| prompt.should_continue(&failure)) {
                        self.progress.abandon();
                        return Err(Error::Aborted);
                    }
                    log::warn!("skipping {}", candidate.file_name);
                }
            }
            self.progress.inc(1);
        }
        self.progress.finish_and_clear();
        Ok(summary)
    }

    fn process(&self, candidate: &Candidate) -> Result<String> {
        let folder = remote_parent(&candidate.remote_path);
        log::info!("ensuring remote folder {folder}");
        ensure_exists(self.api, &self.retry, folder)?;
        log::info!("uploading {} -> {}", candidate.path.display(), candidate.remote_path);
        upload(self.api, &self.retry, &candidate.path, &candidate.remote_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(filter: &str) -> Job {
        Job {
            root: PathBuf::from("."),
            remote_base: "/base".into(),
            extensions: vec!["jpg".into(), "png".into()],
            name_filter: filter.into(),
        }
    }

    #[test]
    fn extension_match_ignores_case() {
        let job = job("");
        assert!(job.qualifies("a.JPG"));
        assert!(job.qualifies("b.png"));
        assert!(!job.qualifies("c.gif"));
        assert!(!job.qualifies("jpg"));
    }

    #[test]
    fn name_filter_is_case_insensitive_substring() {
        let job = job("scan_img");
        assert!(job.qualifies("SCAN_IMG1.jpg"));
        assert!(job.qualifies("old_scan_img.png"));
        assert!(!job.qualifies("other.jpg"));
    }
}
