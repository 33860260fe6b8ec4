use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::sample::Sample;
use crate::util::{parse_tokens, write_tokens};
use log::{debug, warn};
use rand::Rng;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Name of the file holding the per-label sample counts.
pub const INDEX_FILE: &str = "Numbers";

/// Labelled samples on disk, one append-only file per label named after the
/// label itself (`<dir>/0`, `<dir>/1`, ...).
///
/// The per-label counts bound random draws. They are kept in memory and
/// written to [`INDEX_FILE`] by [`SampleStore::flush`] and on drop.
#[derive(Debug)]
pub struct SampleStore {
    dir: PathBuf,
    counts: Vec<usize>,
}

impl SampleStore {
    pub fn open<P: AsRef<Path>>(dir: P, num_labels: usize) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let counts = match read_index(&dir.join(INDEX_FILE), num_labels) {
            Ok(Some(counts)) => counts,
            Ok(None) => recount(&dir, num_labels)?,
            Err(err) => {
                warn!("ignoring unreadable sample index in {}: {err}", dir.display());
                recount(&dir, num_labels)?
            }
        };
        debug!("opened sample store {} with counts {counts:?}", dir.display());
        Ok(SampleStore { dir, counts })
    }

    /// Appends a sample to its label's file.
    pub fn save<T: DType>(&mut self, sample: &Sample<T>) -> Result<()> {
        self.check_label(sample.label)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.label_path(sample.label))?;
        writeln!(file, "{sample}")?;
        self.counts[sample.label] += 1;
        Ok(())
    }

    /// The `index`-th stored sample of `label`.
    pub fn get<T: DType>(&self, label: usize, index: usize) -> Result<Sample<T>> {
        self.check_label(label)?;
        let reader = BufReader::new(File::open(self.label_path(label))?);
        let mut seen = 0;
        let mut line_no = 0;
        for line in reader.lines() {
            let line = line?;
            line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            if seen == index {
                return Sample::parse(&line, line_no);
            }
            seen += 1;
        }
        Err(Error::parse(line_no, format!("label {label} has no sample {index}")))
    }

    /// A sample of `label` chosen uniformly among the counted ones.
    pub fn get_random<T: DType, R: Rng>(&self, label: usize, rng: &mut R) -> Result<Sample<T>> {
        self.check_label(label)?;
        let count = self.counts[label];
        if count == 0 {
            return Err(Error::EmptyLabel(label));
        }
        self.get(label, rng.gen_range(0..count))
    }

    pub fn load_label<T: DType>(&self, label: usize) -> Result<Vec<Sample<T>>> {
        self.check_label(label)?;
        let path = self.label_path(label);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut samples = Vec::new();
        for (i, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if !line.trim().is_empty() {
                samples.push(Sample::parse(&line, i + 1)?);
            }
        }
        Ok(samples)
    }

    pub fn flush(&self) -> Result<()> {
        let mut writer = BufWriter::new(File::create(self.dir.join(INDEX_FILE))?);
        write_tokens(&mut writer, self.counts.iter())?;
        writer.flush()?;
        Ok(())
    }

    fn check_label(&self, label: usize) -> Result<()> {
        if label >= self.counts.len() {
            return Err(Error::LabelOutOfRange {
                label,
                classes: self.counts.len(),
            });
        }
        Ok(())
    }

    fn label_path(&self, label: usize) -> PathBuf {
        self.dir.join(label.to_string())
    }

    #[inline]
    pub fn count(&self, label: usize) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    #[inline]
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Total number of stored samples.
    pub fn len(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn num_labels(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Drop for SampleStore {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            warn!("could not write sample index in {}: {err}", self.dir.display());
        }
    }
}

fn read_index(path: &Path, num_labels: usize) -> Result<Option<Vec<usize>>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let mut line = String::new();
    BufReader::new(file).read_line(&mut line)?;
    let counts: Vec<usize> = parse_tokens(line.split_whitespace(), 1)?;
    if counts.len() != num_labels {
        return Err(Error::parse(
            1,
            format!("expected {num_labels} counts, found {}", counts.len()),
        ));
    }
    Ok(Some(counts))
}

fn recount(dir: &Path, num_labels: usize) -> Result<Vec<usize>> {
    (0..num_labels)
        .map(|label| match File::open(dir.join(label.to_string())) {
            Ok(file) => {
                let mut count = 0;
                for line in BufReader::new(file).lines() {
                    if !line?.trim().is_empty() {
                        count += 1;
                    }
                }
                Ok(count)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(0),
            Err(err) => Err(err.into()),
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::{INDEX_FILE, SampleStore};
    use crate::error::Error;
    use crate::sample::Sample;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::fs;

    fn pixels(seed: usize) -> Vec<f64> {
        (0..9).map(|i| ((i + seed) % 4) as f64 / 4.0).collect()
    }

    #[test]
    fn test_save_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SampleStore::open(dir.path(), 10).unwrap();
        assert!(store.is_empty());

        for i in 0..3 {
            store.save(&Sample::new(4, pixels(i))).unwrap();
        }
        store.save(&Sample::new(9, pixels(7))).unwrap();

        assert_eq!(store.count(4), 3);
        assert_eq!(store.count(9), 1);
        assert_eq!(store.count(0), 0);
        assert_eq!(store.len(), 4);

        let text = fs::read_to_string(dir.path().join("4")).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("4 0 0.25 0.5 0.75 0 "));

        let second: Sample<f64> = store.get(4, 1).unwrap();
        assert_eq!(second, Sample::new(4, pixels(1)));
        assert!(matches!(store.get::<f64>(4, 3), Err(Error::Parse { .. })));

        let all: Vec<Sample<f64>> = store.load_label(4).unwrap();
        assert_eq!(all.len(), 3);
        assert!(store.load_label::<f64>(2).unwrap().is_empty());
    }

    #[test]
    fn test_random_draws() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SampleStore::open(dir.path(), 3).unwrap();
        let mut rng = StdRng::seed_from_u64(0x77);

        assert!(matches!(store.get_random::<f64, _>(1, &mut rng), Err(Error::EmptyLabel(1))));

        for i in 0..4 {
            store.save(&Sample::new(1, pixels(i))).unwrap();
        }
        let mut seen = [false; 4];
        for _ in 0..200 {
            let sample: Sample<f64> = store.get_random(1, &mut rng).unwrap();
            assert_eq!(sample.label, 1);
            let i = (0..4).position(|i| pixels(i) == sample.features).unwrap();
            seen[i] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_label_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SampleStore::open(dir.path(), 2).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            store.save(&Sample::new(2, pixels(0))),
            Err(Error::LabelOutOfRange { label: 2, classes: 2 })
        ));
        assert!(store.get_random::<f64, _>(5, &mut rng).is_err());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_counts_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = SampleStore::open(dir.path(), 10).unwrap();
            store.save(&Sample::new(0, pixels(0))).unwrap();
            store.save(&Sample::new(0, pixels(1))).unwrap();
            store.save(&Sample::new(3, pixels(2))).unwrap();
        }
        let index = fs::read_to_string(dir.path().join(INDEX_FILE)).unwrap();
        assert_eq!(index.trim(), "2 0 0 1 0 0 0 0 0 0");

        let store = SampleStore::open(dir.path(), 10).unwrap();
        assert_eq!(store.counts(), &[2, 0, 0, 1, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_stale_index_draws() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1"), "1 0.5 0.5\n").unwrap();
        fs::write(dir.path().join(INDEX_FILE), "0 5\n").unwrap();

        let store = SampleStore::open(dir.path(), 2).unwrap();
        assert_eq!(store.counts(), &[0, 5]);

        let mut rng = StdRng::seed_from_u64(0x5eed);
        let (mut hits, mut misses) = (0, 0);
        for _ in 0..50 {
            match store.get_random::<f64, _>(1, &mut rng) {
                Ok(sample) => {
                    assert_eq!(sample, Sample::new(1, vec![0.5, 0.5]));
                    hits += 1;
                }
                Err(Error::Parse { line, .. }) => {
                    assert_eq!(line, 1);
                    misses += 1;
                }
                Err(err) => panic!("unexpected error {err}"),
            }
        }
        assert!(hits > 0);
        assert!(misses > 0);
    }

    #[test]
    fn test_malformed_sample_draw() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("0"), "0 0.5 oops\n").unwrap();

        let store = SampleStore::open(dir.path(), 2).unwrap();
        assert_eq!(store.counts(), &[1, 0]);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            store.get_random::<f64, _>(0, &mut rng),
            Err(Error::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_recount_without_index() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1"), "1 0.5 0.5\n\n1 0 1\n").unwrap();
        fs::write(dir.path().join(INDEX_FILE), "garbage").unwrap();

        let store = SampleStore::open(dir.path(), 2).unwrap();
        assert_eq!(store.counts(), &[0, 2]);
        let sample: Sample<f64> = store.get(1, 1).unwrap();
        assert_eq!(sample.features, vec![0.0, 1.0]);
    }
}
