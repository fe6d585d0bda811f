use crate::error::{ErrorKind, Result};
use crate::ingest::{Options, Summary, ingest};
use crate::markers;
use crate::progress::{ImportEvent, Reporter};
use exn::ResultExt;
use inpxer_config::Config;
use inpxer_index::{Index, IndexStore};
use inpxer_inpx::Collection;
use std::path::Path;
use std::time::Instant;
use tracing::instrument;

/// Import the INPX archive at `archive_path` into the index described by
/// `config`.
///
/// Without [`Options::partial`] the index directory is removed first and
/// rebuilt from scratch. The archive and the index are released before
/// returning, whatever the outcome.
#[instrument(skip_all, fields(archive = %archive_path.as_ref().display(), partial = options.partial))]
pub async fn run<R>(config: &Config, archive_path: impl AsRef<Path>, options: Options, reporter: &mut R) -> Result<Summary>
where
    R: Reporter + ?Sized,
{
    let result = run_inner(config, archive_path.as_ref(), options, reporter).await;
    if result.is_err() {
        reporter.report(ImportEvent::Failed);
    }
    result
}

async fn run_inner<R>(config: &Config, archive_path: &Path, options: Options, reporter: &mut R) -> Result<Summary>
where
    R: Reporter + ?Sized,
{
    let started = Instant::now();
    reporter.report(ImportEvent::Started);

    let mut collection =
        Collection::open(archive_path).or_raise(|| ErrorKind::OpenArchive(archive_path.display().to_string()))?;
    tracing::info!(
        collection = %collection.info().name,
        version = collection.version(),
        "Opened archive"
    );

    let index_path = &config.index_path;
    if !options.partial
        && let Err(err) = remove_index(index_path).await
    {
        collection.close();
        return Err(err);
    }
    let index = match Index::create(index_path, config.language.as_str(), config.storage).await {
        Ok(index) => index,
        Err(err) => {
            collection.close();
            return Err(err).or_raise(|| ErrorKind::OpenIndex(index_path.display().to_string()));
        },
    };

    let result = import(&mut collection, &index, config, options, started, reporter).await;
    index.close().await;
    collection.close();
    result
}

async fn remove_index(path: &Path) -> Result<()> {
    let error = || ErrorKind::RemoveIndex(path.display().to_string());
    if tokio::fs::try_exists(path).await.or_raise(error)? {
        tracing::info!(path = %path.display(), "Removing existing index");
        tokio::fs::remove_dir_all(path).await.or_raise(error)?;
    }
    Ok(())
}

/// Stream every record of an open `collection` into `store`, then write the
/// freshness markers under the configured index path.
///
/// Neither the collection nor the store is released here.
pub async fn import<S, R>(
    collection: &mut Collection,
    store: &S,
    config: &Config,
    options: Options,
    started: Instant,
    reporter: &mut R,
) -> Result<Summary>
where
    S: IndexStore + ?Sized,
    R: Reporter + ?Sized,
{
    let accumulator = ingest(collection.stream(), store, options, config.batch_size, reporter).await?;
    let summary = accumulator.summary(started.elapsed());

    if let Some(err) = collection.take_error() {
        tracing::error!(
            seen = accumulator.seen(),
            duplicates = accumulator.duplicates(),
            deleted = accumulator.deleted(),
            "Import stopped early"
        );
        return Err(err.raise(ErrorKind::Parse(collection.path().display().to_string())));
    }

    reporter.report(ImportEvent::Complete(summary));
    tracing::info!(
        seen = summary.seen,
        imported = summary.imported,
        duplicates = summary.duplicates,
        deleted = summary.deleted,
        elapsed = ?summary.elapsed,
        "Import complete"
    );

    write_markers(&config.index_path, collection.path(), collection.version(), reporter).await;
    Ok(summary)
}

async fn write_markers<R>(index_path: &Path, archive_path: &Path, version: &str, reporter: &mut R)
where
    R: Reporter + ?Sized,
{
    let mut warn = |err: markers::Error| {
        tracing::warn!(error = ?err, "Could not write freshness marker");
        reporter.report(ImportEvent::Warning(err.to_string()));
    };
    match markers::write_updated(index_path, archive_path).await {
        Ok(timestamp) => tracing::debug!(timestamp, "Recorded catalog timestamp"),
        Err(err) => warn(err),
    }
    if let Err(err) = markers::write_version(index_path, version).await {
        warn(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::{UPDATED_MARKER, VERSION_MARKER};
    use crate::progress::Silent;
    use inpxer_index::{Book, DATABASE_FILE, MockIndex, Storage};
    use inpxer_inpx::RawRecord;
    use inpxer_inpx::fixture::{ArchiveBuilder, record_line};
    use std::fs;
    use std::path::PathBuf;

    struct Fixture {
        _dir: tempfile::TempDir,
        archive: PathBuf,
        config: Config,
    }

    fn fixture(builder: ArchiveBuilder) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("library.inpx");
        builder.write(&archive).unwrap();
        let config = Config {
            index_path: dir.path().join("index"),
            ..Config::default()
        };
        Fixture {
            _dir: dir,
            archive,
            config,
        }
    }

    fn lines(ids: &[u64]) -> Vec<String> {
        ids.iter().map(|&id| record_line(id, &format!("Book {id}"), false)).collect()
    }

    async fn open_index(config: &Config) -> Index {
        Index::create(&config.index_path, "en", Storage::Disk).await.unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end() {
        let f = fixture(
            ArchiveBuilder::new()
                .version("20240315")
                .version_modified_at(1_710_504_000)
                .listing("fb2-000001-000100.inp", lines(&[1, 1, 2]))
                .listing("fb2-000101-000200.inp", lines(&[3, 3])),
        );
        let mut events = Vec::new();
        let summary = run(&f.config, &f.archive, Options::default(), &mut |event: ImportEvent| events.push(event))
            .await
            .unwrap();
        assert_eq!((summary.seen, summary.imported, summary.duplicates, summary.deleted), (5, 3, 2, 0));
        assert_eq!(events.first(), Some(&ImportEvent::Started));
        assert_eq!(events[1], ImportEvent::Flushed { processed: 5 });
        assert_eq!(events.last(), Some(&ImportEvent::Complete(summary)));

        let index = open_index(&f.config).await;
        assert_eq!(index.count().await.unwrap(), 3);
        let book = index.get(3).await.unwrap().unwrap();
        assert_eq!(book.file.folder, "fb2-000101-000200.zip");
        index.close().await;

        let updated = fs::read_to_string(f.config.index_path.join(UPDATED_MARKER)).unwrap();
        assert_eq!(updated, "1710504000");
        let version = fs::read_to_string(f.config.index_path.join(VERSION_MARKER)).unwrap();
        assert_eq!(version, "20240315");
    }

    #[tokio::test]
    async fn test_full_rebuild_is_idempotent() {
        let f = fixture(ArchiveBuilder::new().listing("a.inp", lines(&[1, 2, 2, 3])));
        let first = run(&f.config, &f.archive, Options::default(), &mut Silent).await.unwrap();
        let second = run(&f.config, &f.archive, Options::default(), &mut Silent).await.unwrap();
        assert_eq!(
            (first.seen, first.imported, first.duplicates, first.deleted),
            (second.seen, second.imported, second.duplicates, second.deleted)
        );
        let index = open_index(&f.config).await;
        assert_eq!(index.count().await.unwrap(), 3);
        index.close().await;
    }

    #[tokio::test]
    async fn test_full_rebuild_removes_stale_books() {
        let f = fixture(ArchiveBuilder::new().listing("a.inp", lines(&[1, 2])));
        let stale = Book::from(RawRecord {
            lib_id: 99,
            ..RawRecord::default()
        });
        let index = open_index(&f.config).await;
        index.add_books(&[stale], false).await.unwrap();
        index.close().await;
        fs::write(f.config.index_path.join("stray"), "x").unwrap();

        run(&f.config, &f.archive, Options::default(), &mut Silent).await.unwrap();
        let index = open_index(&f.config).await;
        assert_eq!(index.get(99).await.unwrap(), None);
        assert_eq!(index.count().await.unwrap(), 2);
        index.close().await;
        assert!(!f.config.index_path.join("stray").exists());
    }

    #[tokio::test]
    async fn test_partial_updates_in_place() {
        let first = fixture(ArchiveBuilder::new().listing("a.inp", lines(&[1, 2])));
        run(&first.config, &first.archive, Options::default(), &mut Silent).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let update = dir.path().join("update.inpx");
        ArchiveBuilder::new()
            .listing("a.inp", [record_line(2, "Two, revised", false), record_line(3, "Three", false)])
            .write(&update)
            .unwrap();
        let options = Options {
            partial: true,
            ..Options::default()
        };
        run(&first.config, &update, options, &mut Silent).await.unwrap();

        let index = open_index(&first.config).await;
        assert_eq!(index.count().await.unwrap(), 3);
        assert_eq!(index.get(2).await.unwrap().unwrap().title, "Two, revised");
        index.close().await;
    }

    #[tokio::test]
    async fn test_missing_archive_fails_before_touching_index() {
        let f = fixture(ArchiveBuilder::new().listing("a.inp", lines(&[1])));
        fs::create_dir_all(&f.config.index_path).unwrap();
        fs::write(f.config.index_path.join("keep"), "x").unwrap();
        let mut events = Vec::new();
        let missing = f.archive.with_file_name("missing.inpx");
        let err = run(&f.config, &missing, Options::default(), &mut |event: ImportEvent| events.push(event))
            .await
            .unwrap_err();
        assert!(matches!(*err, ErrorKind::OpenArchive(_)));
        assert!(f.config.index_path.join("keep").exists());
        assert_eq!(events, vec![ImportEvent::Started, ImportEvent::Failed]);
    }

    #[tokio::test]
    async fn test_unremovable_index_path() {
        let f = fixture(ArchiveBuilder::new().listing("a.inp", lines(&[1])));
        // A regular file is not a directory that can be removed recursively.
        fs::write(&f.config.index_path, "").unwrap();
        let err = run(&f.config, &f.archive, Options::default(), &mut Silent).await.unwrap_err();
        assert_eq!(*err, ErrorKind::RemoveIndex(f.config.index_path.display().to_string()));
    }

    #[tokio::test]
    async fn test_parse_error_aborts_without_markers() {
        let f = fixture(
            ArchiveBuilder::new()
                .version("20240315")
                .listing("a.inp", lines(&[1, 2]))
                .listing("b.inp", ["not a record".to_string()]),
        );
        let mut events = Vec::new();
        let err = run(&f.config, &f.archive, Options::default(), &mut |event: ImportEvent| events.push(event))
            .await
            .unwrap_err();
        assert_eq!(*err, ErrorKind::Parse(f.archive.display().to_string()));
        assert_eq!(events.last(), Some(&ImportEvent::Failed));
        assert!(!events.iter().any(|event| matches!(event, ImportEvent::Complete(_))));
        assert!(!f.config.index_path.join(UPDATED_MARKER).exists());
        assert!(!f.config.index_path.join(VERSION_MARKER).exists());

        // Records read before the malformed line were still stored.
        let index = open_index(&f.config).await;
        assert_eq!(index.count().await.unwrap(), 2);
        index.close().await;
    }

    #[tokio::test]
    async fn test_import_batches_into_any_store() {
        let f = fixture(ArchiveBuilder::new().listing("a.inp", (1..=2001).map(|id| record_line(id, "Book", false))));
        let mut collection = Collection::open(&f.archive).unwrap();
        let store = MockIndex::new();
        let summary = import(&mut collection, &store, &f.config, Options::default(), Instant::now(), &mut Silent)
            .await
            .unwrap();
        assert_eq!(summary.imported, 2001);
        assert_eq!(store.batch_sizes().await, vec![1001, 1000]);
        collection.close();
    }

    #[tokio::test]
    async fn test_flush_failure_aborts_import() {
        let f = fixture(ArchiveBuilder::new().listing("a.inp", (1..=5).map(|id| record_line(id, "Book", false))));
        let config = Config {
            batch_size: 1,
            ..f.config.clone()
        };
        let mut collection = Collection::open(&f.archive).unwrap();
        let store = MockIndex::failing_on(2);
        let err = import(&mut collection, &store, &config, Options::default(), Instant::now(), &mut Silent)
            .await
            .unwrap_err();
        assert_eq!(*err, ErrorKind::Flush);
        assert_eq!(store.lib_ids().await, vec![1, 2]);
        assert!(!config.index_path.join(UPDATED_MARKER).exists());
        collection.close();
    }

    #[tokio::test]
    async fn test_marker_failure_is_only_a_warning() {
        let f = fixture(ArchiveBuilder::new().version("7").listing("a.inp", lines(&[1])));
        // Markers cannot be written below a regular file.
        let blocked = f.config.index_path.with_file_name("blocked");
        fs::write(&blocked, "").unwrap();
        let config = Config {
            index_path: blocked,
            ..f.config.clone()
        };
        let mut collection = Collection::open(&f.archive).unwrap();
        let store = MockIndex::new();
        let mut events = Vec::new();
        let summary = import(
            &mut collection,
            &store,
            &config,
            Options::default(),
            Instant::now(),
            &mut |event: ImportEvent| events.push(event),
        )
        .await
        .unwrap();
        assert_eq!(summary.imported, 1);
        let warnings = events.iter().filter(|event| matches!(event, ImportEvent::Warning(_))).count();
        assert_eq!(warnings, 2);
        collection.close();
    }

    #[tokio::test]
    async fn test_memory_storage_leaves_no_database_file() {
        let f = fixture(ArchiveBuilder::new().listing("a.inp", lines(&[1, 2])));
        let config = Config {
            storage: Storage::Memory,
            ..f.config.clone()
        };
        let summary = run(&config, &f.archive, Options::default(), &mut Silent).await.unwrap();
        assert_eq!(summary.imported, 2);
        assert!(!config.index_path.join(DATABASE_FILE).exists());
        assert!(config.index_path.join(UPDATED_MARKER).exists());
    }
}
