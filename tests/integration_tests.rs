use filesorter::cli::{CliError, OrganizeCommand, RunStatus, run_cli_with_config};
/// Integration tests for filesorter
///
/// These tests drive the library the way the command-line front-end does,
/// against real temporary directories.
///
/// Test categories:
/// 1. Basic organization workflows
/// 2. Repeat runs and idempotence
/// 3. Dry-run mode verification
/// 4. Conflicts and failures
/// 5. Configuration and the activity log file
/// 6. Precondition errors
use filesorter::{ConflictPolicy, MemoryLogSink, Organizer, OrganizerConfig, PreconditionError};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

const DEFAULT_LABELS: [&str; 7] = [
    "Images",
    "Documents",
    "Music",
    "Videos",
    "Compressed",
    "Executables",
    "Others",
];

/// A test fixture with a directory to organize and a separate directory for
/// configuration and the activity log, so neither ends up being sorted.
struct TestFixture {
    temp_dir: TempDir,
    support_dir: TempDir,
}

impl TestFixture {
    /// Create a new test fixture with empty temporary directories.
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let support_dir = TempDir::new().expect("Failed to create support directory");
        TestFixture {
            temp_dir,
            support_dir,
        }
    }

    /// Get the path to the directory being organized.
    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Where the activity log of this fixture is written.
    fn log_path(&self) -> PathBuf {
        self.support_dir.path().join("logs").join("organizer.log")
    }

    /// Write a config file with the given body plus a `log_file` pointing into
    /// the support directory, and return its path.
    fn write_config(&self, body: &str) -> PathBuf {
        let config_path = self.support_dir.path().join("filesorter.toml");
        let content = format!(
            "log_file = {:?}\n{}",
            self.log_path().to_string_lossy(),
            body
        );
        fs::write(&config_path, content).expect("Failed to write config");
        config_path
    }

    /// Create a file with content in the test directory.
    fn create_file(&self, name: &str, content: &[u8]) {
        let file_path = self.path().join(name);
        let mut file = File::create(&file_path).expect("Failed to create file");
        file.write_all(content)
            .expect("Failed to write file content");
    }

    /// Create a file with specific content (string version).
    fn create_text_file(&self, name: &str, content: &str) {
        self.create_file(name, content.as_bytes());
    }

    /// Create several files whose content is their own name.
    fn create_files(&self, names: &[&str]) {
        for name in names {
            self.create_text_file(name, name);
        }
    }

    /// Create a subdirectory in the test directory.
    fn create_subdir(&self, name: &str) {
        fs::create_dir(self.path().join(name)).expect("Failed to create subdirectory");
    }

    /// Organize the fixture directory using the fixture's config.
    fn organize(&self) -> RunStatus {
        let config = self.write_config("");
        run_cli_with_config(
            OrganizeCommand::Organize { dry_run: false },
            Some(self.path()),
            Some(&config),
        )
        .expect("Organization failed")
    }

    /// Read the activity log written so far.
    fn log_lines(&self) -> Vec<String> {
        fs::read_to_string(self.log_path())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Assert that a directory exists at the given relative path.
    fn assert_dir_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_dir(), "Directory should exist: {}", path.display());
    }

    /// Assert that a file exists at the given relative path.
    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    /// Assert that nothing exists at the given relative path.
    fn assert_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "Should not exist: {}", path.display());
    }

    /// Names of the top-level entries, sorted.
    fn top_level(&self) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(self.path())
            .expect("Failed to read directory")
            .map(|e| e.expect("Bad entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

fn sorted_labels() -> Vec<String> {
    let mut labels: Vec<_> = DEFAULT_LABELS.iter().map(|s| s.to_string()).collect();
    labels.sort();
    labels
}

// ============================================================================
// 1. Basic organization workflows
// ============================================================================

#[test]
fn test_organize_empty_directory() {
    let fixture = TestFixture::new();

    assert_eq!(fixture.organize(), RunStatus::Completed);

    for label in DEFAULT_LABELS {
        fixture.assert_dir_exists(label);
    }
    assert_eq!(fixture.top_level(), sorted_labels());
}

#[test]
fn test_organize_mixed_file_types() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.jpg", "b.pdf", "c.mp3", "d.xyz"]);

    assert_eq!(fixture.organize(), RunStatus::Completed);

    fixture.assert_file_exists("Images/a.jpg");
    fixture.assert_file_exists("Documents/b.pdf");
    fixture.assert_file_exists("Music/c.mp3");
    fixture.assert_file_exists("Others/d.xyz");
    assert_eq!(fixture.top_level(), sorted_labels());
}

#[test]
fn test_organize_mixed_case_extensions() {
    let fixture = TestFixture::new();
    fixture.create_files(&["Photo.JPG", "clip.MoV", "Setup.EXE", "Data.Csv"]);

    fixture.organize();

    fixture.assert_file_exists("Images/Photo.JPG");
    fixture.assert_file_exists("Videos/clip.MoV");
    fixture.assert_file_exists("Executables/Setup.EXE");
    fixture.assert_file_exists("Documents/Data.Csv");
}

#[test]
fn test_files_without_extension_go_to_others() {
    let fixture = TestFixture::new();
    fixture.create_files(&["README", "file.", "archive.tar.gz"]);

    fixture.organize();

    fixture.assert_file_exists("Others/README");
    fixture.assert_file_exists("Others/file.");
    fixture.assert_file_exists("Others/archive.tar.gz");
}

#[test]
fn test_organize_preserves_file_content() {
    let fixture = TestFixture::new();
    fixture.create_file("song.flac", &[0x66, 0x4c, 0x61, 0x43, 0x00, 0xff]);

    fixture.organize();

    let content = fs::read(fixture.path().join("Music/song.flac")).unwrap();
    assert_eq!(content, [0x66, 0x4c, 0x61, 0x43, 0x00, 0xff]);
}

#[test]
fn test_organize_special_characters_in_filename() {
    let fixture = TestFixture::new();
    fixture.create_files(&["my photo (1).png", "résumé final.docx"]);

    fixture.organize();

    fixture.assert_file_exists("Images/my photo (1).png");
    fixture.assert_file_exists("Documents/résumé final.docx");
}

#[test]
fn test_subdirectories_are_not_entered() {
    let fixture = TestFixture::new();
    fixture.create_subdir("projects");
    fixture.create_text_file("projects/plan.pdf", "nested");
    fixture.create_text_file("top.pdf", "top");

    fixture.organize();

    fixture.assert_file_exists("projects/plan.pdf");
    fixture.assert_not_exists("Documents/plan.pdf");
    fixture.assert_file_exists("Documents/top.pdf");
}

// ============================================================================
// 2. Repeat runs and idempotence
// ============================================================================

#[test]
fn test_organize_idempotent() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.jpg", "b.txt"]);

    fixture.organize();
    let first_run = fixture.log_lines().len();
    fixture.organize();
    let lines = fixture.log_lines();

    let second_run = &lines[first_run..];
    assert_eq!(second_run.len(), 2);
    assert!(second_run[0].contains("Starting organization of:"));
    assert!(second_run[1].ends_with(" - Organization completed."));
    assert!(!second_run.iter().any(|l| l.contains("Folder created:")));
    assert!(!second_run.iter().any(|l| l.contains("Moved:")));
}

#[test]
fn test_organize_then_add_files_then_organize_again() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.jpg"]);
    fixture.organize();

    fixture.create_files(&["b.zip", "c.wav"]);
    fixture.organize();

    fixture.assert_file_exists("Images/a.jpg");
    fixture.assert_file_exists("Compressed/b.zip");
    fixture.assert_file_exists("Music/c.wav");
    let moved: Vec<_> = fixture
        .log_lines()
        .into_iter()
        .filter(|l| l.contains(" - Moved: "))
        .collect();
    assert_eq!(moved.len(), 3);
}

#[test]
fn test_organize_with_existing_category_directories() {
    let fixture = TestFixture::new();
    fixture.create_subdir("Images");
    fixture.create_files(&["a.gif"]);

    fixture.organize();

    fixture.assert_file_exists("Images/a.gif");
    let created: Vec<_> = fixture
        .log_lines()
        .into_iter()
        .filter(|l| l.contains("Folder created:"))
        .collect();
    assert_eq!(created.len(), 6);
    assert!(!created.iter().any(|l| l.ends_with("Images")));
}

// ============================================================================
// 3. Dry-run mode verification
// ============================================================================

#[test]
fn test_dry_run_doesnt_move_files() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.jpg", "b.pdf"]);
    let config = fixture.write_config("");

    let status = run_cli_with_config(
        OrganizeCommand::Organize { dry_run: true },
        Some(fixture.path()),
        Some(&config),
    )
    .unwrap();

    assert_eq!(status, RunStatus::DryRun);
    assert_eq!(fixture.top_level(), ["a.jpg", "b.pdf"]);
    assert!(!fixture.log_path().exists());
}

#[test]
fn test_dry_run_vs_actual_organization() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.jpg", "b.pdf", "c"]);

    let plan = Organizer::default().plan(fixture.path()).unwrap();
    fixture.organize();

    for planned in &plan.moves {
        assert!(
            planned.destination.is_file(),
            "{} should be at {}",
            planned.name,
            planned.destination.display()
        );
    }
}

// ============================================================================
// 4. Conflicts and failures
// ============================================================================

#[test]
fn test_conflict_skipped_by_default() {
    let fixture = TestFixture::new();
    fixture.create_subdir("Documents");
    fixture.create_text_file("Documents/notes.txt", "old");
    fixture.create_text_file("notes.txt", "new");
    fixture.create_text_file("other.txt", "other");
    let config = fixture.write_config("");

    let status = run_cli_with_config(
        OrganizeCommand::Organize { dry_run: false },
        Some(fixture.path()),
        Some(&config),
    )
    .unwrap();

    assert_eq!(status, RunStatus::CompletedWithFailures);
    assert_eq!(status.exit_code(), 1);
    assert_eq!(
        fs::read_to_string(fixture.path().join("notes.txt")).unwrap(),
        "new"
    );
    assert_eq!(
        fs::read_to_string(fixture.path().join("Documents/notes.txt")).unwrap(),
        "old"
    );
    fixture.assert_file_exists("Documents/other.txt");

    let lines = fixture.log_lines();
    assert!(lines.iter().any(|l| l.contains("Failed to move: notes.txt -> Documents")));
    assert!(lines.iter().any(|l| l.ends_with(" - 1 file(s) could not be moved.")));
    assert!(lines.last().unwrap().ends_with(" - Organization completed."));
}

#[test]
fn test_conflict_overwrite_from_config() {
    let fixture = TestFixture::new();
    fixture.create_subdir("Documents");
    fixture.create_text_file("Documents/notes.txt", "old");
    fixture.create_text_file("notes.txt", "new");
    let config = fixture.write_config("on_conflict = \"overwrite\"\n");

    let status = run_cli_with_config(
        OrganizeCommand::Organize { dry_run: false },
        Some(fixture.path()),
        Some(&config),
    )
    .unwrap();

    assert_eq!(status, RunStatus::Completed);
    fixture.assert_not_exists("notes.txt");
    assert_eq!(
        fs::read_to_string(fixture.path().join("Documents/notes.txt")).unwrap(),
        "new"
    );
}

#[test]
fn test_category_name_taken_by_file_aborts_run() {
    let fixture = TestFixture::new();
    fixture.create_text_file("Images", "I am a file");
    fixture.create_files(&["a.pdf"]);
    let config = fixture.write_config("");

    let result = run_cli_with_config(
        OrganizeCommand::Organize { dry_run: false },
        Some(fixture.path()),
        Some(&config),
    );

    let error = result.unwrap_err();
    assert!(matches!(error, CliError::Organize(_)));
    assert_eq!(error.exit_code(), 1);
    fixture.assert_file_exists("a.pdf");
    fixture.assert_file_exists("Images");

    let lines = fixture.log_lines();
    assert!(lines[0].contains("Starting organization of:"));
    assert!(lines.last().unwrap().contains("Failed to create folder:"));
}

// ============================================================================
// 5. Configuration and the activity log file
// ============================================================================

#[test]
fn test_log_file_lines() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.jpg"]);

    fixture.organize();

    let lines = fixture.log_lines();
    assert_eq!(lines.len(), 1 + 7 + 1 + 1);
    for line in &lines {
        let (stamp, _) = line.split_once(" - ").expect("missing separator");
        assert!(
            chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S,%3f").is_ok(),
            "bad timestamp in {line}"
        );
    }
    assert!(lines[0].ends_with(&format!(
        " - Starting organization of: {}",
        fixture.path().display()
    )));
    assert!(lines[1].ends_with(&format!(
        " - Folder created: {}",
        fixture.path().join("Images").display()
    )));
    assert!(lines[8].ends_with(" - Moved: a.jpg -> Images"));
    assert!(lines[9].ends_with(" - Organization completed."));
}

#[test]
fn test_custom_category_table() {
    let fixture = TestFixture::new();
    fixture.create_files(&["main.rs", "lib.RS", "photo.jpg"]);
    let config = fixture.write_config(
        r#"
[[categories]]
label = "Code"
extensions = ["rs"]

[[categories]]
label = "Misc"
extensions = []
"#,
    );

    run_cli_with_config(
        OrganizeCommand::Organize { dry_run: false },
        Some(fixture.path()),
        Some(&config),
    )
    .unwrap();

    fixture.assert_file_exists("Code/main.rs");
    fixture.assert_file_exists("Code/lib.RS");
    fixture.assert_file_exists("Misc/photo.jpg");
    assert_eq!(fixture.top_level(), ["Code", "Misc"]);
}

#[test]
fn test_config_and_log_inside_target_stay_put() {
    let fixture = TestFixture::new();
    let config_path = fixture.path().join(".filesorterrc.toml");
    let log_path = fixture.path().join("organizer.log");
    fs::write(
        &config_path,
        format!(
            r#"log_file = {:?}

[[categories]]
label = "Code"
extensions = ["rs"]

[[categories]]
label = "Misc"
"#,
            log_path.to_string_lossy()
        ),
    )
    .unwrap();
    fixture.create_files(&["a.rs", "notes.txt"]);

    for new_file in ["b.rs", "c.md"] {
        let status = run_cli_with_config(
            OrganizeCommand::Organize { dry_run: false },
            Some(fixture.path()),
            Some(&config_path),
        )
        .unwrap();
        assert_eq!(status, RunStatus::Completed);
        fixture.create_files(&[new_file]);
    }
    run_cli_with_config(
        OrganizeCommand::Organize { dry_run: false },
        Some(fixture.path()),
        Some(&config_path),
    )
    .unwrap();

    assert_eq!(
        fixture.top_level(),
        [".filesorterrc.toml", "Code", "Misc", "organizer.log"]
    );
    fixture.assert_file_exists("Code/a.rs");
    fixture.assert_file_exists("Code/b.rs");
    fixture.assert_file_exists("Misc/notes.txt");
    fixture.assert_file_exists("Misc/c.md");

    let log = fs::read_to_string(&log_path).unwrap();
    assert_eq!(log.matches("Folder created:").count(), 2);
    assert!(!log.contains("Moved: .filesorterrc.toml"));
    assert!(!log.contains("Moved: organizer.log"));
}

#[test]
fn test_dry_run_with_blocked_category_folder() {
    let fixture = TestFixture::new();
    fixture.create_text_file("Images", "I am a file");
    fixture.create_files(&["a.pdf"]);
    let config = fixture.write_config("");

    let status = run_cli_with_config(
        OrganizeCommand::Organize { dry_run: true },
        Some(fixture.path()),
        Some(&config),
    )
    .unwrap();

    assert_eq!(status, RunStatus::DryRun);
    assert_eq!(fixture.top_level(), ["Images", "a.pdf"]);

    let plan = Organizer::default().plan(fixture.path()).unwrap();
    assert_eq!(plan.blocked_folders, [fixture.path().join("Images")]);
}

#[test]
fn test_invalid_config_rejected_before_any_change() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.jpg"]);
    let config = fixture.write_config(
        r#"
[[categories]]
label = "Images"
extensions = ["jpg"]
"#,
    );

    let error = run_cli_with_config(
        OrganizeCommand::Organize { dry_run: false },
        Some(fixture.path()),
        Some(&config),
    )
    .unwrap_err();

    assert!(matches!(error, CliError::Config(_)));
    assert_eq!(fixture.top_level(), ["a.jpg"]);
}

#[test]
fn test_config_loaded_directly() {
    let fixture = TestFixture::new();
    let config_path = fixture.write_config("on_conflict = \"overwrite\"\n");

    let config = OrganizerConfig::load(Some(&config_path)).unwrap();
    assert_eq!(config.on_conflict, ConflictPolicy::Overwrite);
    assert_eq!(config.log_file, fixture.log_path());
}

// ============================================================================
// 6. Precondition errors
// ============================================================================

#[test]
fn test_no_folder_selected() {
    let fixture = TestFixture::new();
    let config = fixture.write_config("");

    let error = run_cli_with_config(
        OrganizeCommand::Organize { dry_run: false },
        None,
        Some(&config),
    )
    .unwrap_err();

    assert!(matches!(error, CliError::Precondition(_)));
    assert_eq!(error.exit_code(), 2);
    assert!(!fixture.log_path().exists());
}

#[test]
fn test_missing_folder_causes_no_changes() {
    let fixture = TestFixture::new();
    let missing = fixture.path().join("does-not-exist");
    let config = fixture.write_config("");

    let error = run_cli_with_config(
        OrganizeCommand::Organize { dry_run: false },
        Some(&missing),
        Some(&config),
    )
    .unwrap_err();

    assert!(matches!(error, CliError::Precondition(_)));
    assert!(!missing.exists());
    assert!(fixture.top_level().is_empty());
    assert!(!fixture.log_path().exists());
}

#[test]
fn test_library_precondition_error() {
    let fixture = TestFixture::new();
    let file_path = fixture.path().join("plain.txt");
    fixture.create_text_file("plain.txt", "x");

    let mut log = MemoryLogSink::new();
    let result = Organizer::default().organize(&file_path, &mut log);

    match result {
        Err(filesorter::OrganizeError::Precondition(PreconditionError::NotADirectory(path))) => {
            assert_eq!(path, file_path)
        }
        other => panic!("expected NotADirectory, got {other:?}"),
    }
    assert!(log.records().is_empty());
}
