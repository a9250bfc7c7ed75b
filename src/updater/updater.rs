//! Updater that applies a new tag to the configured manifests.

use crate::config::{Config, ConfigError, ManifestConfig};
use crate::ledger::Ledger;
use crate::manifest::{create_manifest, Manifest, ManifestError};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// UpdateError is returned when a run cannot complete.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("environment '{0}' not found in the configuration")]
    EnvironmentNotFound(String),

    /// Processing one manifest failed; files handled before it keep their
    /// new content.
    #[error("{}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: ManifestError,
    },

    #[error("cannot write dry-run output: {0}")]
    Transcript(#[source] io::Error),
}

impl UpdateError {
    fn manifest(path: &Path) -> impl FnOnce(ManifestError) -> UpdateError + '_ {
        move |source| UpdateError::Manifest {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// UpdaterBuilder is a builder for creating an Updater.
#[derive(Default)]
pub struct UpdaterBuilder {
    dry_run: bool,
    transcript: Option<Box<dyn Write>>,
}

impl UpdaterBuilder {
    /// Creates a new UpdaterBuilder.
    pub fn new() -> Self {
        UpdaterBuilder::default()
    }

    /// Sets whether manifests are printed instead of written back.
    pub fn dry_run(mut self, value: bool) -> Self {
        self.dry_run = value;
        self
    }

    /// Sets where dry-run output goes. Defaults to standard output.
    pub fn transcript(mut self, transcript: Box<dyn Write>) -> Self {
        self.transcript = Some(transcript);
        self
    }

    /// Builds the Updater. Manifest paths in `config` are resolved against
    /// `workdir`.
    pub fn build(self, config: Config, workdir: impl Into<PathBuf>) -> Updater {
        Updater {
            config,
            workdir: workdir.into(),
            dry_run: self.dry_run,
            transcript: self
                .transcript
                .unwrap_or_else(|| Box::new(io::stdout())),
            ledger: Ledger::new(),
            examined: 0,
        }
    }

    /// Reads the configuration file at `path` and builds an Updater working
    /// in the file's directory.
    pub fn load(self, path: impl AsRef<Path>) -> Result<Updater, UpdateError> {
        let path = path.as_ref();
        let config = Config::load(path)?;
        let workdir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        debug!(config = %path.display(), workdir = %workdir.display(), "Loaded configuration");
        Ok(self.build(config, workdir))
    }
}

/// Updater runs tag updates over the manifests of a configuration.
///
/// Every run appends to one ledger, so a single Updater can apply several
/// updates and report them together.
pub struct Updater {
    config: Config,
    workdir: PathBuf,
    dry_run: bool,
    transcript: Box<dyn Write>,
    ledger: Ledger,
    examined: usize,
}

impl Updater {
    /// Creates a new UpdaterBuilder.
    pub fn builder() -> UpdaterBuilder {
        UpdaterBuilder::new()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the directory manifest paths are resolved against.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns every modification made so far.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Returns how many manifests have been processed so far.
    pub fn examined(&self) -> usize {
        self.examined
    }

    /// Sets `repository` to `tag` in every selected manifest and returns how
    /// many manifests were examined.
    ///
    /// Manifests come from the named environment, or from all environments
    /// when `environment` is `None`. A manifest is skipped when its
    /// repository list does not name `repository`, or when it lacks one of
    /// the requested `labels`. Manifests are processed in configuration
    /// order and the first failure ends the run.
    pub fn update_manifests(
        &mut self,
        repository: &str,
        tag: &str,
        environment: Option<&str>,
        labels: &[String],
    ) -> Result<usize, UpdateError> {
        info!(repository, tag, environment, dry_run = self.dry_run, "Updating manifests");
        let selected = self.select(repository, environment, labels)?;

        for manifest_config in &selected {
            self.update_manifest(manifest_config, repository, tag)?;
        }
        Ok(selected.len())
    }

    fn select(
        &self,
        repository: &str,
        environment: Option<&str>,
        labels: &[String],
    ) -> Result<Vec<ManifestConfig>, UpdateError> {
        let environments = match environment {
            Some(name) => vec![self
                .config
                .environment(name)
                .ok_or_else(|| UpdateError::EnvironmentNotFound(name.to_string()))?],
            None => self.config.environments.iter().collect(),
        };

        let mut selected = Vec::new();
        for env in environments {
            for manifest in &env.manifests {
                if !manifest.accepts_repository(repository) {
                    debug!(environment = %env.name, path = %manifest.path.display(), "Skipping manifest: repository not listed");
                } else if !manifest.has_labels(labels) {
                    debug!(environment = %env.name, path = %manifest.path.display(), "Skipping manifest: labels do not match");
                } else {
                    selected.push(manifest.clone());
                }
            }
        }
        Ok(selected)
    }

    fn update_manifest(
        &mut self,
        manifest_config: &ManifestConfig,
        repository: &str,
        tag: &str,
    ) -> Result<(), UpdateError> {
        let path = self.workdir.join(&manifest_config.path);
        let mut manifest = create_manifest(&manifest_config.kind, &path)
            .map_err(UpdateError::manifest(&path))?;
        manifest.load_file().map_err(UpdateError::manifest(&path))?;
        manifest
            .modify(repository, tag)
            .map_err(UpdateError::manifest(&path))?;

        if manifest.modifications().is_empty() {
            warn!(path = %path.display(), repository, "No image of the repository in manifest");
        }

        if self.dry_run {
            self.print_manifest(&*manifest)?;
        } else {
            manifest.write_file().map_err(UpdateError::manifest(&path))?;
        }

        self.ledger.extend(manifest.modifications().iter().cloned());
        self.examined += 1;
        Ok(())
    }

    fn print_manifest(&mut self, manifest: &dyn Manifest) -> Result<(), UpdateError> {
        let mut buffer = Vec::new();
        manifest
            .write(&mut buffer)
            .map_err(UpdateError::manifest(manifest.path()))?;
        if !buffer.ends_with(b"\n") {
            buffer.push(b'\n');
        }

        writeln!(self.transcript, "# {}", manifest.path().display())
            .and_then(|()| self.transcript.write_all(&buffer))
            .and_then(|()| self.transcript.flush())
            .map_err(UpdateError::Transcript)
    }
}
