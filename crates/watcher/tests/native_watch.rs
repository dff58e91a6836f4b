//! End-to-end tests against the platform's native backend
//!
//! Every test returns early when no native backend is present.

use devwatch_watcher::WatchSession;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

/// Upper bound for a drain that expects changes (returns as soon as they land)
const WAIT: Duration = Duration::from_millis(1000);
/// Window for a drain that expects nothing
const QUIET: Duration = Duration::from_millis(100);

struct Fixture {
    _dir: TempDir,
    junk: TempDir,
    root: PathBuf,
    session: WatchSession,
}

impl Fixture {
    fn new() -> Option<Self> {
        if !WatchSession::is_available() {
            return None;
        }

        let dir = TempDir::new().unwrap();
        let junk = TempDir::new().unwrap();
        let session = WatchSession::new([dir.path()])
            .unwrap()
            .with_settle(Duration::from_millis(50));
        let root = session.roots()[0].clone();

        Some(Self {
            _dir: dir,
            junk,
            root,
            session,
        })
    }

    fn junk(&self) -> PathBuf {
        self.junk.path().canonicalize().unwrap()
    }

    fn create_file(&self, relative: &str) -> PathBuf {
        let path = self.root.join(relative);
        fs::File::create(&path).unwrap();
        path
    }

    fn create_dir(&self, relative: &str) -> PathBuf {
        let path = self.root.join(relative);
        fs::create_dir(&path).unwrap();
        path
    }

    fn changes(&self) -> HashSet<PathBuf> {
        self.session.drain(WAIT)
    }

    fn quiet(&self) -> HashSet<PathBuf> {
        self.session.drain(QUIET)
    }
}

fn set<P: AsRef<Path>>(paths: &[P]) -> HashSet<PathBuf> {
    paths.iter().map(|p| p.as_ref().to_path_buf()).collect()
}

/// Let timestamps and pre-start events settle
fn sync() {
    thread::sleep(Duration::from_millis(100));
}

#[test]
fn test_file_created() {
    let Some(mut fx) = Fixture::new() else { return };
    fx.session.start().unwrap();

    let path = fx.create_file("test");
    assert_eq!(fx.changes(), set(&[&path]));
}

#[test]
fn test_watcher_ignore_pattern() {
    let Some(mut fx) = Fixture::new() else { return };
    fx.session.set_watcher_ignore_pattern(Some("^.*ignored-watcher")).unwrap();
    fx.session.start().unwrap();

    fx.create_file("ignored-watcher");
    assert_eq!(fx.quiet(), HashSet::new());

    let subdir = fx.create_dir("subdir");
    assert_eq!(fx.changes(), set(&[&subdir]));

    fx.create_file("subdir/ignored-watcher");
    assert_eq!(fx.quiet(), HashSet::new());
}

#[test]
fn test_skip_files_pattern() {
    let Some(mut fx) = Fixture::new() else { return };
    fx.session.set_skip_files_pattern(Some("^.*skipped_file")).unwrap();
    fx.session.start().unwrap();

    fx.create_file("skipped_file");
    assert_eq!(fx.quiet(), HashSet::new());

    let subdir = fx.create_dir("subdir");
    assert_eq!(fx.changes(), set(&[&subdir]));

    fx.create_file("subdir/skipped_file");
    assert_eq!(fx.quiet(), HashSet::new());
}

#[test]
fn test_skipped_directory_is_transitive() {
    let Some(mut fx) = Fixture::new() else { return };
    fx.session.set_skip_files_pattern(Some(".*skipped_dir")).unwrap();
    fx.session.start().unwrap();

    fx.create_dir("skipped_dir");
    assert_eq!(fx.quiet(), HashSet::new());

    fx.create_dir("skipped_dir/subdir");
    assert_eq!(fx.quiet(), HashSet::new());

    let subdir = fx.create_dir("subdir");
    assert_eq!(fx.changes(), set(&[&subdir]));

    fx.create_dir("subdir/skipped_dir");
    assert_eq!(fx.quiet(), HashSet::new());
}

#[test]
fn test_file_modified() {
    let Some(mut fx) = Fixture::new() else { return };
    let path = fx.create_file("test");
    sync();
    fx.session.start().unwrap();

    fs::write(&path, b"testing").unwrap();
    assert_eq!(fx.changes(), set(&[&path]));
}

#[test]
fn test_file_read_is_not_a_change() {
    let Some(mut fx) = Fixture::new() else { return };
    let path = fx.create_file("test");
    fs::write(&path, b"testing").unwrap();
    sync();
    fx.session.start().unwrap();

    let _ = fs::read(&path).unwrap();
    assert_eq!(fx.quiet(), HashSet::new());
}

#[test]
fn test_file_deleted() {
    let Some(mut fx) = Fixture::new() else { return };
    let path = fx.create_file("test");
    sync();
    fx.session.start().unwrap();

    fs::remove_file(&path).unwrap();
    assert_eq!(fx.changes(), set(&[&path]));
}

#[test]
fn test_file_renamed_reports_both_ends() {
    let Some(mut fx) = Fixture::new() else { return };
    let source = fx.create_file("test");
    let target = fx.root.join("test2");
    sync();
    fx.session.start().unwrap();

    fs::rename(&source, &target).unwrap();
    assert_eq!(fx.changes(), set(&[&source, &target]));
}

#[test]
fn test_rename_lands_in_one_drain_with_default_session() {
    if !WatchSession::is_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let mut session = WatchSession::new([dir.path()]).unwrap();
    let root = session.roots()[0].clone();
    let source = root.join("test");
    let target = root.join("test2");
    fs::File::create(&source).unwrap();
    sync();
    session.start().unwrap();

    fs::rename(&source, &target).unwrap();
    assert_eq!(session.drain(WAIT), set(&[&source, &target]));
}

#[test]
fn test_create_directory() {
    let Some(mut fx) = Fixture::new() else { return };
    fx.session.start().unwrap();

    let path = fx.create_dir("test");
    assert_eq!(fx.changes(), set(&[&path]));
}

#[test]
fn test_file_created_in_directory_reports_only_file() {
    let Some(mut fx) = Fixture::new() else { return };
    fx.create_dir("test");
    sync();
    fx.session.start().unwrap();

    let path = fx.create_file("test/file");
    assert_eq!(fx.changes(), set(&[&path]));
}

#[test]
fn test_move_directory() {
    let Some(mut fx) = Fixture::new() else { return };
    let source = fx.create_dir("test");
    let target = fx.root.join("test2");
    sync();
    fx.session.start().unwrap();

    fs::rename(&source, &target).unwrap();
    assert_eq!(fx.changes(), set(&[&source, &target]));
}

#[test]
fn test_move_directory_out_of_watched() {
    let Some(mut fx) = Fixture::new() else { return };
    let source = fx.create_dir("test");
    let target = fx.junk().join("test");
    sync();
    fx.session.start().unwrap();

    fs::rename(&source, &target).unwrap();
    assert_eq!(fx.changes(), set(&[&source]));
}

#[test]
fn test_move_directory_into_watched() {
    let Some(mut fx) = Fixture::new() else { return };
    let source = fx.junk().join("source");
    let target = fx.root.join("target");
    fs::create_dir(&source).unwrap();
    sync();
    fx.session.start().unwrap();

    fs::rename(&source, &target).unwrap();
    assert_eq!(fx.changes(), set(&[&target]));

    let file = target.join("file");
    fs::File::create(&file).unwrap();
    assert_eq!(fx.changes(), set(&[&file]));
}

#[test]
fn test_directory_deleted() {
    let Some(mut fx) = Fixture::new() else { return };
    let path = fx.create_dir("test");
    sync();
    fx.session.start().unwrap();

    fs::remove_dir(&path).unwrap();
    assert_eq!(fx.changes(), set(&[&path]));
}

#[test]
fn test_rapid_writes_collapse() {
    let Some(mut fx) = Fixture::new() else { return };
    let path = fx.create_file("hot.py");
    sync();
    fx.session.start().unwrap();

    for i in 0..20 {
        fs::write(&path, format!("v{}", i)).unwrap();
    }
    let changed = fx.changes();
    assert_eq!(changed, set(&[&path]));

    // Late duplicates from the same burst may trail into one more drain
    let rest = fx.quiet();
    assert!(rest.is_empty() || rest == set(&[&path]));
    assert_eq!(fx.quiet(), HashSet::new());
}

#[test]
fn test_multiple_roots() {
    if !WatchSession::is_available() {
        return;
    }
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    let mut session = WatchSession::new([a.path(), b.path()])
        .unwrap()
        .with_settle(Duration::from_millis(50));
    session.set_skip_files_pattern(Some("^vendor$")).unwrap();
    let (root_a, root_b) = (session.roots()[0].clone(), session.roots()[1].clone());
    session.start().unwrap();

    let in_a = root_a.join("a.py");
    let in_b = root_b.join("b.py");
    fs::File::create(&in_a).unwrap();
    fs::File::create(&in_b).unwrap();

    let mut seen = HashSet::new();
    for _ in 0..10 {
        seen.extend(session.drain(WAIT));
        if seen.len() >= 2 {
            break;
        }
    }
    assert_eq!(seen, set(&[&in_a, &in_b]));
    assert!(seen.iter().all(|p| p.starts_with(&root_a) != p.starts_with(&root_b)));

    // Rules apply to every root
    fs::create_dir(root_b.join("vendor")).unwrap();
    assert_eq!(session.drain(QUIET), HashSet::new());

    session.quit();
}

#[test]
fn test_quit_stops_delivery() {
    let Some(mut fx) = Fixture::new() else { return };
    fx.session.start().unwrap();
    fx.session.quit();
    fx.session.quit();

    fx.create_file("after-quit");
    assert_eq!(fx.quiet(), HashSet::new());
}
