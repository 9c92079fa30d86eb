use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::models::{Utterance, mor, tokenize};

/// Skip counts accumulated over a corpus run; reported at the end so no
/// error disappears silently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub files_read: usize,
    pub files_skipped: usize,
    pub lines_skipped: usize,
}

impl WalkStats {
    pub fn merge(&mut self, other: WalkStats) {
        self.files_read += other.files_read;
        self.files_skipped += other.files_skipped;
        self.lines_skipped += other.lines_skipped;
    }
}

/// All `.cha` transcript files under `root`, sorted for reproducibility.
pub fn transcript_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "cha"))
        .collect();
    files.sort();
    files
}

/// Read one transcript into utterances, tolerating decoding errors.
///
/// Returns `None` (and counts the skip) when the file cannot be read;
/// speaker lines without a `:` delimiter are skipped individually. The
/// %mor tier is located by scanning the annotation lines that follow each
/// speaker line.
pub fn read_transcript(path: &Path, root: &Path, stats: &mut WalkStats) -> Option<Vec<Utterance>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("skipping unreadable file {:?}: {}", path, err);
            stats.files_skipped += 1;
            return None;
        }
    };
    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text.lines().collect();
    let rel = path.strip_prefix(root).unwrap_or(path).to_path_buf();

    let mut utterances = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if !line.starts_with('*') {
            continue;
        }
        let Some((prefix, content)) = line.split_once(':') else {
            stats.lines_skipped += 1;
            continue;
        };
        let speaker = prefix.trim_start_matches('*').trim().to_uppercase();

        let mut mor_entries = Vec::new();
        let mut j = i + 1;
        while j < lines.len() && lines[j].starts_with('%') {
            if let Some(rest) = lines[j].strip_prefix("%mor:") {
                mor_entries = mor::parse_mor_tier(rest);
                break;
            }
            j += 1;
        }

        utterances.push(Utterance {
            speaker,
            text: content.trim().to_string(),
            tokens: tokenize(content),
            mor: mor_entries,
            file: rel.clone(),
            line_no: i + 1,
        });
    }
    stats.files_read += 1;
    Some(utterances)
}

/// Lazy iterator over every utterance in a corpus, file by file in sorted
/// order. Skip counts stay available on `stats` after iteration.
#[derive(Debug)]
pub struct CorpusWalker {
    root: PathBuf,
    files: Vec<PathBuf>,
    next_file: usize,
    pending: std::vec::IntoIter<Utterance>,
    pub stats: WalkStats,
}

impl CorpusWalker {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            files: transcript_files(root),
            next_file: 0,
            pending: Vec::new().into_iter(),
            stats: WalkStats::default(),
        }
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

impl Iterator for CorpusWalker {
    type Item = Utterance;

    fn next(&mut self) -> Option<Utterance> {
        loop {
            if let Some(utt) = self.pending.next() {
                return Some(utt);
            }
            if self.next_file >= self.files.len() {
                return None;
            }
            let path = self.files[self.next_file].clone();
            self.next_file += 1;
            if let Some(utts) = read_transcript(&path, &self.root, &mut self.stats) {
                self.pending = utts.into_iter();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        path
    }

    #[test]
    fn test_walk_reads_utterances_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "b.cha",
            "@Begin\n*MOT:\tI saw mom .\n%mor:\tpro:sub|I v|see&PAST n|mom .\n*CHI:\thi Mommy !\n@End\n",
        );
        write_file(dir.path(), "a.cha", "*FAT:\twhere is dad ?\n");

        let mut walker = CorpusWalker::new(dir.path());
        let utts: Vec<Utterance> = walker.by_ref().collect();

        assert_eq!(utts.len(), 3);
        // sorted file order: a.cha before b.cha
        assert_eq!(utts[0].speaker, "FAT");
        assert_eq!(utts[1].speaker, "MOT");
        assert_eq!(utts[1].mor.len(), 3);
        assert_eq!(utts[2].speaker, "CHI");
        assert!(utts[2].is_child());
        assert!(utts[2].mor.is_empty());
        assert_eq!(walker.stats.files_read, 2);
        assert_eq!(walker.stats.files_skipped, 0);
    }

    #[test]
    fn test_malformed_speaker_line_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a.cha", "*MOT no delimiter here\n*CHI:\tokay .\n");

        let mut walker = CorpusWalker::new(dir.path());
        let utts: Vec<Utterance> = walker.by_ref().collect();

        assert_eq!(utts.len(), 1);
        assert_eq!(utts[0].speaker, "CHI");
        assert_eq!(walker.stats.lines_skipped, 1);
    }

    #[test]
    fn test_invalid_utf8_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.cha");
        std::fs::write(&path, b"*MOT:\tI saw mom \xff.\n").unwrap();

        let mut walker = CorpusWalker::new(dir.path());
        let utts: Vec<Utterance> = walker.by_ref().collect();

        assert_eq!(utts.len(), 1);
        assert_eq!(walker.stats.files_read, 1);
    }

    #[test]
    fn test_non_cha_files_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "notes.txt", "*MOT:\tshould not be read\n");
        write_file(dir.path(), "a.cha", "*MOT:\tI saw mom .\n");

        let walker = CorpusWalker::new(dir.path());
        assert_eq!(walker.file_count(), 1);
    }

    #[test]
    fn test_mor_tier_found_after_other_tiers() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "a.cha",
            "*MOT:\tI saw mom .\n%com:\tsomething\n%mor:\tpro:sub|I v|see&PAST n|mom .\n",
        );

        let utts: Vec<Utterance> = CorpusWalker::new(dir.path()).collect();
        assert_eq!(utts[0].mor.len(), 3);
    }
}
