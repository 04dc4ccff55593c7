use serde::{Deserialize, Serialize};
use tempfile::tempdir;
use tracked_file::{CustomFile, PersistenceConfig, TrackedFile};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Playlist {
    title: String,
    tracks: Vec<String>,
}

struct PlaylistFile {
    file: TrackedFile<Playlist>,
    plays: u32,
}

impl CustomFile for PlaylistFile {
    type Data = Playlist;

    fn file(&self) -> &TrackedFile<Playlist> {
        &self.file
    }

    fn file_mut(&mut self) -> &mut TrackedFile<Playlist> {
        &mut self.file
    }
}

impl PlaylistFile {
    fn open(path: &std::path::Path) -> Self {
        Self {
            file: TrackedFile::open_with_config(path, PersistenceConfig::default())
                .expect("open playlist"),
            plays: 0,
        }
    }

    fn add_track(&mut self, track: &str) {
        self.makes_changes(|this| {
            this.file.mutate(|data| {
                data.get_or_insert_with(Playlist::default)
                    .tracks
                    .push(track.to_string())
            })
        });
    }

    fn rename(&mut self, title: &str) -> Result<(), String> {
        self.makes_changes(|this| {
            if title.is_empty() {
                return Err("title cannot be empty".to_string());
            }
            this.file.mutate(|data| {
                data.get_or_insert_with(Playlist::default).title = title.to_string()
            });
            Ok(())
        })
    }

    fn track_count(&self) -> usize {
        self.get_data().map(|p| p.tracks.len()).unwrap_or(0)
    }

    fn play(&mut self) {
        self.plays += 1;
    }
}

#[test]
fn custom_methods_mark_changes() {
    let dir = tempdir().expect("tempdir");
    let mut playlist = PlaylistFile::open(&dir.path().join("road.playlist"));
    assert!(!playlist.has_unsaved_changes());

    playlist.add_track("Intro");
    assert!(playlist.has_unsaved_changes());
    assert_eq!(playlist.track_count(), 1);
}

#[test]
fn failing_mutator_still_marks_changes() {
    let dir = tempdir().expect("tempdir");
    let mut playlist = PlaylistFile::open(&dir.path().join("bad.playlist"));

    assert!(playlist.rename("").is_err());
    assert!(playlist.has_unsaved_changes());
    assert!(playlist.get_data().is_none());
}

#[test]
fn unmarked_methods_leave_file_clean() {
    let dir = tempdir().expect("tempdir");
    let mut playlist = PlaylistFile::open(&dir.path().join("quiet.playlist"));
    playlist.play();
    assert_eq!(playlist.track_count(), 0);
    assert!(!playlist.has_unsaved_changes());
}

#[test]
fn custom_file_persists_through_trait_surface() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("mix.playlist");

    let mut playlist = PlaylistFile::open(&path);
    playlist.rename("Mix").expect("rename");
    playlist.add_track("One");
    playlist.add_track("Two");
    playlist.save().expect("save");
    assert!(!playlist.has_unsaved_changes());
    assert_eq!(playlist.absolute_path(), Some(path.clone()));

    let reopened = PlaylistFile::open(&path);
    assert_eq!(
        reopened.get_data(),
        Some(&Playlist {
            title: "Mix".into(),
            tracks: vec!["One".into(), "Two".into()],
        })
    );
}

#[test]
fn set_data_through_trait_replaces_payload() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("other.playlist");
    let mut playlist = PlaylistFile::open(&path);
    playlist.set_data(Playlist {
        title: "Fresh".into(),
        tracks: vec![],
    });
    assert!(playlist.has_unsaved_changes());

    playlist.save_as(dir.path().join("renamed.playlist")).expect("save as");
    assert!(!path.exists());
    playlist.load().expect("load");
    assert_eq!(playlist.get_data().map(|p| p.title.as_str()), Some("Fresh"));
}
