//! Artifact store: owns the active vectorizer/classifier pair
//!
//! The pair lives in one `Arc<Artifacts>` behind a read/write lock. Readers
//! clone the `Arc` and release the lock before running inference; a load
//! builds the complete new pair first and swaps it in under the write lock,
//! so nobody can observe a vectorizer from one load next to a classifier
//! from another.

use crate::artifact::{decode_classifier, decode_vectorizer};
use crate::classifier::{Classifier, Vectorizer};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use reviewpulse_core::{
    ArtifactKind, FileDiagnostics, LoadAttempt, LoadError, ServiceState, StoreStatus,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Fixed locations of the two artifact files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub vectorizer: PathBuf,
    pub classifier: PathBuf,
}

impl ArtifactPaths {
    pub fn new(vectorizer: impl Into<PathBuf>, classifier: impl Into<PathBuf>) -> Self {
        Self {
            vectorizer: vectorizer.into(),
            classifier: classifier.into(),
        }
    }

    /// Both files inside `base_dir`
    pub fn in_dir(base_dir: impl AsRef<Path>, vectorizer_file: &str, classifier_file: &str) -> Self {
        let base = base_dir.as_ref();
        Self::new(base.join(vectorizer_file), base.join(classifier_file))
    }

    pub fn get(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Vectorizer => &self.vectorizer,
            ArtifactKind::Classifier => &self.classifier,
        }
    }
}

/// A loaded, mutually compatible vectorizer/classifier pair
pub struct Artifacts {
    vectorizer: Box<dyn Vectorizer>,
    classifier: Box<dyn Classifier>,
    generation: u64,
    loaded_at: DateTime<Utc>,
}

impl Artifacts {
    /// Pair a vectorizer with a classifier, checking their widths agree
    pub fn new(
        vectorizer: Box<dyn Vectorizer>,
        classifier: Box<dyn Classifier>,
    ) -> Result<Self, LoadError> {
        if vectorizer.n_features() != classifier.n_features() {
            return Err(LoadError::Incompatible(format!(
                "{} vectorizer emits {} features but {} classifier expects {}",
                vectorizer.kind(),
                vectorizer.n_features(),
                classifier.kind(),
                classifier.n_features()
            )));
        }
        Ok(Self {
            vectorizer,
            classifier,
            generation: 0,
            loaded_at: Utc::now(),
        })
    }

    pub fn vectorizer(&self) -> &dyn Vectorizer {
        self.vectorizer.as_ref()
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Which successful load produced this pair (1 for the first)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

impl std::fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifacts")
            .field("vectorizer", &self.vectorizer.kind())
            .field("classifier", &self.classifier.kind())
            .field("n_features", &self.vectorizer.n_features())
            .field("generation", &self.generation)
            .finish()
    }
}

/// Produces a fresh artifact pair from the configured paths
pub trait ArtifactLoader: Send + Sync {
    fn load(&self, paths: &ArtifactPaths) -> Result<Artifacts, LoadError>;
}

/// Loads the JSON artifact container from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonArtifactLoader;

impl JsonArtifactLoader {
    fn read(kind: ArtifactKind, path: &Path) -> Result<Vec<u8>, LoadError> {
        std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LoadError::ArtifactMissing {
                    artifact: kind,
                    path: path.to_path_buf(),
                }
            } else {
                LoadError::Io {
                    artifact: kind,
                    path: path.to_path_buf(),
                    source,
                }
            }
        })
    }
}

impl ArtifactLoader for JsonArtifactLoader {
    fn load(&self, paths: &ArtifactPaths) -> Result<Artifacts, LoadError> {
        // Check both files before decoding either
        for kind in [ArtifactKind::Classifier, ArtifactKind::Vectorizer] {
            let diag = FileDiagnostics::probe(paths.get(kind));
            if !diag.exists {
                error!(artifact = %kind, path = %diag.path.display(), "artifact file not found");
                return Err(LoadError::ArtifactMissing {
                    artifact: kind,
                    path: diag.path,
                });
            }
            info!(artifact = %kind, size_bytes = diag.size_bytes, "artifact file exists");
        }

        debug!("decoding vectorizer");
        let bytes = Self::read(ArtifactKind::Vectorizer, &paths.vectorizer)?;
        let vectorizer = decode_vectorizer(&bytes, &paths.vectorizer)?;
        info!(
            vectorizer_type = vectorizer.kind(),
            n_features = vectorizer.n_features(),
            "vectorizer decoded"
        );

        debug!("decoding classifier");
        let bytes = Self::read(ArtifactKind::Classifier, &paths.classifier)?;
        let classifier = decode_classifier(&bytes, &paths.classifier)?;
        info!(
            classifier_type = classifier.kind(),
            classes = ?classifier.classes(),
            "classifier decoded"
        );

        Artifacts::new(vectorizer, classifier)
    }
}

#[derive(Default)]
struct StoreState {
    current: Option<Arc<Artifacts>>,
    generation: u64,
    last_attempt: Option<LoadAttempt>,
}

/// Owner of the active artifact pair
pub struct ArtifactStore {
    paths: ArtifactPaths,
    loader: Arc<dyn ArtifactLoader>,
    state: RwLock<StoreState>,
    /// Serializes loads so concurrent reloads run one after another
    load_lock: Mutex<()>,
}

impl ArtifactStore {
    /// Store reading the JSON container format from `paths`
    pub fn new(paths: ArtifactPaths) -> Self {
        Self::with_loader(paths, Arc::new(JsonArtifactLoader))
    }

    pub fn with_loader(paths: ArtifactPaths, loader: Arc<dyn ArtifactLoader>) -> Self {
        Self {
            paths,
            loader,
            state: RwLock::new(StoreState::default()),
            load_lock: Mutex::new(()),
        }
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// Load both artifacts and swap them in together.
    ///
    /// On failure the active pair, if any, is kept as is; only the recorded
    /// last attempt changes.
    pub fn load(&self) -> Result<(), LoadError> {
        let _serialized = self.load_lock.lock();
        let started = Instant::now();
        info!(
            vectorizer = %self.paths.vectorizer.display(),
            classifier = %self.paths.classifier.display(),
            "loading artifacts"
        );

        match self.loader.load(&self.paths) {
            Ok(mut artifacts) => {
                let mut state = self.state.write();
                state.generation += 1;
                artifacts.generation = state.generation;
                state.current = Some(Arc::new(artifacts));
                state.last_attempt = Some(LoadAttempt::succeeded());
                let generation = state.generation;
                drop(state);

                info!(
                    generation,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "artifacts loaded"
                );
                Ok(())
            }
            Err(e) => {
                let mut state = self.state.write();
                state.last_attempt = Some(LoadAttempt::failed(e.to_string()));
                let kept_previous = state.current.is_some();
                drop(state);

                error!(
                    error = %e,
                    kind = e.kind(),
                    kept_previous,
                    "artifact load failed"
                );
                Err(e)
            }
        }
    }

    /// Active pair, if a load has succeeded
    pub fn current(&self) -> Option<Arc<Artifacts>> {
        self.state.read().current.clone()
    }

    /// Whether a complete pair is active
    pub fn is_loaded(&self) -> bool {
        self.state.read().current.is_some()
    }

    /// Whether any load attempt has finished
    pub fn has_attempted(&self) -> bool {
        self.state.read().last_attempt.is_some()
    }

    /// Ready/degraded/uninitialized from a single read of the state
    pub fn service_state(&self) -> ServiceState {
        let state = self.state.read();
        ServiceState::from_flags(state.current.is_some(), state.last_attempt.is_some())
    }

    /// Loaded flag plus fresh filesystem facts about both files
    pub fn status(&self) -> StoreStatus {
        let (current, generation, last_attempt) = {
            let state = self.state.read();
            (
                state.current.clone(),
                state.generation,
                state.last_attempt.clone(),
            )
        };

        StoreStatus {
            loaded: current.is_some(),
            generation,
            vectorizer_type: current
                .as_ref()
                .map(|a| a.vectorizer().kind().to_string()),
            classifier_type: current
                .as_ref()
                .map(|a| a.classifier().kind().to_string()),
            loaded_at: current.as_ref().map(|a| a.loaded_at()),
            vectorizer: FileDiagnostics::probe(&self.paths.vectorizer),
            classifier: FileDiagnostics::probe(&self.paths.classifier),
            last_attempt,
        }
    }
}

impl std::fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("paths", &self.paths)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
