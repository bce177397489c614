use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::image_io::{load_image, write_png};
use super::palette_io::write_palette;
use super::pipeline::PaletteExtractionPipeline;
use crate::error::{BatchError, ExtractError};
use crate::models::{ExtractionConfig, PaletteRecord};
use crate::parallel::map_ordered;

/// How an input file is handled, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Video,
    Other,
}

impl FileKind {
    pub fn of(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png" | "jpg" | "jpeg" | "bmp") => FileKind::Image,
            Some("mp4" | "mpg" | "mpeg" | "flv") => FileKind::Video,
            _ => FileKind::Other,
        }
    }
}

/// `path` itself if it is a file, otherwise every file below it, sorted.
///
/// Symbolic links to files are included; links to directories are not
/// followed, so link cycles cannot trap the walk.
pub fn find_files(path: &Path) -> Result<Vec<PathBuf>, BatchError> {
    if !path.exists() {
        return Err(BatchError::NotFound(path.to_path_buf()));
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    let mut pending = vec![path.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let entry_path = entry.path();
            if file_type.is_dir() {
                pending.push(entry_path);
            } else if file_type.is_symlink() && entry_path.is_dir() {
                tracing::debug!(path = %entry_path.display(), "Not following directory link");
            } else {
                files.push(entry_path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Seed for the file at `index`, so every file gets its own stream while
/// the batch as a whole stays reproducible. Index 0 keeps the base seed.
pub fn file_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Output location of `path` relative to the output directory, without
/// suffix. Subdirectories below `root` are mirrored so equal file names in
/// different directories stay apart.
pub fn output_name(root: &Path, path: &Path) -> PathBuf {
    let relative = path
        .strip_prefix(root)
        .unwrap_or_else(|_| path.file_name().map_or(Path::new(""), Path::new));
    let stem = relative.file_stem().unwrap_or_default();
    match relative.parent() {
        Some(parent) => parent.join(stem),
        None => PathBuf::from(stem),
    }
}

struct Job {
    index: usize,
    path: PathBuf,
    name: PathBuf,
}

/// Files written for one input image.
#[derive(Debug, Clone, PartialEq)]
pub struct FileOutput {
    pub input: PathBuf,
    pub palette: PathBuf,
    pub thumbnail: PathBuf,
    pub colors: usize,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outputs: Vec<FileOutput>,
    /// Inputs that were not images, including videos
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, BatchError)>,
}

/// Extracts palettes for every image below an input path.
///
/// Files are independent and run in parallel with the `threads` feature. A
/// failing file is recorded in the report and does not stop the others.
#[derive(Debug)]
pub struct BatchProcessor {
    config: ExtractionConfig,
    output_dir: PathBuf,
    processed: AtomicUsize,
    total: AtomicUsize,
}

impl BatchProcessor {
    pub fn new(config: ExtractionConfig, output_dir: impl Into<PathBuf>) -> Result<Self, ExtractError> {
        config.validate()?;
        Ok(Self {
            config,
            output_dir: output_dir.into(),
            processed: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Fraction of the current batch's files that are done, 0.0 before a
    /// batch starts.
    pub fn progress(&self) -> f32 {
        let total = self.total.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        self.processed.load(Ordering::Relaxed) as f32 / total as f32
    }

    pub fn run(&self, input: &Path) -> Result<BatchReport, BatchError> {
        let files = find_files(input)?;
        std::fs::create_dir_all(&self.output_dir)?;
        let root = if input.is_dir() {
            input
        } else {
            input.parent().unwrap_or(Path::new(""))
        };

        self.total.store(files.len(), Ordering::Relaxed);
        tracing::info!(input = %input.display(), files = files.len(), "Starting batch");

        // Images sharing an output name (photo.png next to photo.jpg) would
        // overwrite each other; only the first in sorted order is processed.
        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
        let mut collisions: Vec<(PathBuf, Result<FileOutput, BatchError>)> = Vec::new();
        let mut jobs = Vec::with_capacity(files.len());
        for (index, path) in files.into_iter().enumerate() {
            let name = output_name(root, &path);
            if FileKind::of(&path) == FileKind::Image {
                if let Some(first) = claimed.get(&name) {
                    let error = BatchError::OutputCollision {
                        input: path.clone(),
                        first: first.clone(),
                    };
                    collisions.push((path, Err(error)));
                    continue;
                }
                claimed.insert(name.clone(), path.clone());
            }
            jobs.push(Job { index, path, name });
        }
        self.processed.store(collisions.len(), Ordering::Relaxed);

        let results = map_ordered(&jobs, |job| {
            let result = self.process_file(job);
            self.processed.fetch_add(1, Ordering::Relaxed);
            (job.path.clone(), result)
        });

        let mut report = BatchReport::default();
        for (path, result) in results.into_iter().chain(collisions) {
            match result {
                Ok(output) => report.outputs.push(output),
                Err(BatchError::UnsupportedVideo(path)) => {
                    tracing::warn!(path = %path.display(), "Skipping video, no frame decoder available");
                    report.skipped.push(path);
                }
                Err(BatchError::NotAnImage(path)) => {
                    tracing::debug!(path = %path.display(), "Skipping non-image file");
                    report.skipped.push(path);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Palette extraction failed");
                    report.failures.push((path, e));
                }
            }
        }

        tracing::info!(
            extracted = report.outputs.len(),
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            "Batch finished"
        );
        Ok(report)
    }

    fn process_file(&self, job: &Job) -> Result<FileOutput, BatchError> {
        let path = job.path.as_path();
        match FileKind::of(path) {
            FileKind::Image => {}
            FileKind::Video => return Err(BatchError::UnsupportedVideo(path.to_path_buf())),
            FileKind::Other => return Err(BatchError::NotAnImage(path.to_path_buf())),
        }

        let config = ExtractionConfig {
            seed: file_seed(self.config.seed, job.index),
            ..self.config.clone()
        };
        let pipeline = PaletteExtractionPipeline::new(config)?;

        let grid = load_image(path)?;
        let analysed = grid.downsample(self.config.max_resolution);
        let extraction = pipeline.extract(&analysed)?;

        let dir = self.output_dir.join(job.name.parent().unwrap_or(Path::new("")));
        std::fs::create_dir_all(&dir)?;
        let name = job
            .name
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("file{}", job.index));
        let record = PaletteRecord::from_palette(&extraction.palette)
            .with_source(path.display().to_string())
            .with_method(self.config.clustering.name(), extraction.chosen_k);
        let palette = write_palette(&record, &dir, &name)?;

        let thumbnail = dir.join(format!("{name}.thumb.png"));
        write_png(&analysed, &thumbnail)?;

        tracing::info!(
            path = %path.display(),
            colors = extraction.palette.len(),
            "Extracted palette"
        );

        Ok(FileOutput {
            input: path.to_path_buf(),
            palette,
            thumbnail,
            colors: extraction.palette.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_by_extension() {
        assert_eq!(FileKind::of(Path::new("a/b.png")), FileKind::Image);
        assert_eq!(FileKind::of(Path::new("b.PNG")), FileKind::Image);
        assert_eq!(FileKind::of(Path::new("x.jpg")), FileKind::Image);
        assert_eq!(FileKind::of(Path::new("x.JPEG")), FileKind::Image);
        assert_eq!(FileKind::of(Path::new("x.bmp")), FileKind::Image);
        assert_eq!(FileKind::of(Path::new("clip.mp4")), FileKind::Video);
        assert_eq!(FileKind::of(Path::new("clip.FLV")), FileKind::Video);
        assert_eq!(FileKind::of(Path::new("notes.txt")), FileKind::Other);
        assert_eq!(FileKind::of(Path::new("README")), FileKind::Other);
    }

    #[test]
    fn test_find_files_recursive_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        std::fs::write(dir.path().join("b.png"), b"").unwrap();
        std::fs::write(dir.path().join("sub/a.png"), b"").unwrap();
        std::fs::write(dir.path().join("sub/deeper/c.mp4"), b"").unwrap();

        let files = find_files(dir.path()).unwrap();
        let relative: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("b.png"),
                PathBuf::from("sub/a.png"),
                PathBuf::from("sub/deeper/c.mp4"),
            ]
        );
    }

    #[test]
    fn test_find_files_single_file_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("x.png");
        std::fs::write(&file, b"").unwrap();
        assert_eq!(find_files(&file).unwrap(), vec![file]);

        assert!(matches!(
            find_files(&dir.path().join("missing")),
            Err(BatchError::NotFound(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_find_files_skips_directory_links() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/a.png"), b"").unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("sub/loop")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("sub/a.png"), dir.path().join("b.png"))
            .unwrap();

        let files = find_files(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("b.png"), dir.path().join("sub/a.png")]
        );
    }

    #[test]
    fn test_output_name_mirrors_subdirectories() {
        let root = Path::new("/in");
        assert_eq!(
            output_name(root, Path::new("/in/a/photo.png")),
            PathBuf::from("a/photo")
        );
        assert_eq!(
            output_name(root, Path::new("/in/b/photo.png")),
            PathBuf::from("b/photo")
        );
        assert_eq!(output_name(root, Path::new("/in/x.tar.png")), PathBuf::from("x.tar"));
        // Single file input: root is its parent
        assert_eq!(output_name(Path::new(""), Path::new("x.png")), PathBuf::from("x"));
    }

    #[test]
    fn test_file_seed_differs_per_index() {
        assert_eq!(file_seed(42, 0), 42);
        assert_ne!(file_seed(42, 1), file_seed(42, 2));
    }

    #[test]
    fn test_progress_before_run() {
        let processor = BatchProcessor::new(ExtractionConfig::default(), "/tmp/unused").unwrap();
        assert_eq!(processor.progress(), 0.0);
    }
}
