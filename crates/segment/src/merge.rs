use std::fs::{rename, File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, Write};
use std::path::{Path, PathBuf};

use crate::format::{encode_record, parse_record};
use crate::key::StoreKey;
use crate::sparse::SparseIndex;
use crate::Result;

/// One open input file and its next unread record, or `None` once exhausted.
///
/// An input that is empty from the start is simply born exhausted, which is
/// how a zero-length segment ends up behaving as if it were absent.
struct MergeCursor<K> {
    reader: BufReader<File>,
    current: Option<(K, String)>,
}

impl<K: StoreKey> MergeCursor<K> {
    fn open(path: &Path) -> Result<Self> {
        let mut cursor = Self {
            reader: BufReader::new(File::open(path)?),
            current: None,
        };
        cursor.advance()?;
        Ok(cursor)
    }

    /// Reads the next record, marking the cursor exhausted at end of file.
    /// A malformed line or undecodable key aborts the whole merge.
    fn advance(&mut self) -> Result<()> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line)?;
        self.current = if n == 0 {
            None
        } else {
            let (key_text, value) = parse_record(&line)?;
            Some((K::decode(key_text)?, value.to_string()))
        };
        Ok(())
    }

    fn holds(&self, key: &K) -> bool {
        matches!(&self.current, Some((k, _)) if k == key)
    }
}

/// Streams `inputs` (each individually sorted ascending, ordered newest
/// first) into one sorted, duplicate-free segment file at `out`.
///
/// On a key collision the record comes from the lowest-index (newest) input
/// holding that key; every other copy is consumed without being emitted.
/// The output is sampled with the same countdown rule a flush uses, so the
/// returned [`SparseIndex`] makes it a registerable segment.
///
/// Output goes to a temporary file that is only renamed into place once the
/// merge completes, so an aborted merge commits nothing.
///
/// # Errors
///
/// Any malformed line or key that fails to decode as `K` is fatal and aborts
/// the operation.
pub fn merge_segments<K: StoreKey>(
    inputs: &[PathBuf],
    out: &Path,
    index_every: usize,
) -> Result<SparseIndex<K>> {
    let mut cursors = inputs
        .iter()
        .map(|path| MergeCursor::open(path))
        .collect::<Result<Vec<MergeCursor<K>>>>()?;

    let tmp_path = out.with_extension("seg.tmp");
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp_path)?;

    let mut index = SparseIndex::new();
    let mut countdown = index_every;
    let mut written = 0usize;

    loop {
        // Minimum key among the non-exhausted inputs.
        let min = cursors
            .iter()
            .filter_map(|c| c.current.as_ref().map(|(k, _)| k))
            .min()
            .cloned();
        let Some(min) = min else { break };

        // The first (newest) input holding the minimum supplies the value.
        let mut value = None;
        for cursor in &cursors {
            if let Some((k, v)) = &cursor.current {
                if *k == min {
                    value = Some(v.clone());
                    break;
                }
            }
        }
        let Some(value) = value else { break };

        if countdown == 0 {
            index.insert(min.clone(), file.stream_position()?);
            countdown = index_every;
        }
        file.write_all(encode_record(&min.encode(), &value).as_bytes())?;
        countdown = countdown.saturating_sub(1);
        written += 1;

        // Drop every copy of the key just written, stale duplicates included.
        loop {
            let mut advanced = false;
            for cursor in &mut cursors {
                if cursor.holds(&min) {
                    cursor.advance()?;
                    advanced = true;
                }
            }
            if !advanced {
                break;
            }
        }
    }

    file.flush()?;
    file.sync_all()?;
    rename(&tmp_path, out)?;

    tracing::debug!(
        out = %out.display(),
        inputs = inputs.len(),
        records = written,
        "merged segments"
    );

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::SegmentReader;
    use anyhow::Result;
    use tempfile::tempdir;

    fn write_lines(path: &Path, records: &[(i64, &str)]) -> Result<()> {
        let mut contents = String::new();
        for (key, value) in records {
            contents.push_str(&encode_record(&key.to_string(), value));
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    // -------------------- Duplicate resolution --------------------

    #[test]
    fn newest_file_wins_on_duplicate_keys() -> Result<()> {
        let dir = tempdir()?;
        let newest = dir.path().join("segment-000001.seg");
        let oldest = dir.path().join("segment-000000.seg");
        let out = dir.path().join("segment-000002.seg");

        write_lines(
            &newest,
            &[(1, "one-new"), (2, "two-new"), (3, "three"), (4, "four-new"), (5, "five")],
        )?;
        write_lines(
            &oldest,
            &[(1, "one-old"), (2, "two-old"), (4, "four-old"), (7, "seven"), (8, "eight")],
        )?;

        merge_segments::<i64>(&[newest, oldest], &out, 100)?;

        let merged = std::fs::read_to_string(&out)?;
        assert_eq!(
            merged,
            "1: one-new\n2: two-new\n3: three\n4: four-new\n5: five\n7: seven\n8: eight\n"
        );
        Ok(())
    }

    #[test]
    fn three_way_merge_takes_the_newest_copy() -> Result<()> {
        let dir = tempdir()?;
        let a = dir.path().join("a.seg");
        let b = dir.path().join("b.seg");
        let c = dir.path().join("c.seg");
        let out = dir.path().join("out.seg");

        write_lines(&a, &[(2, "two-a")])?;
        write_lines(&b, &[(1, "one-b"), (2, "two-b")])?;
        write_lines(&c, &[(1, "one-c"), (3, "three-c")])?;

        merge_segments::<i64>(&[a, b, c], &out, 100)?;

        let merged = std::fs::read_to_string(&out)?;
        assert_eq!(merged, "1: one-b\n2: two-a\n3: three-c\n");
        Ok(())
    }

    // -------------------- Degenerate inputs --------------------

    #[test]
    fn empty_input_behaves_as_if_absent() -> Result<()> {
        let dir = tempdir()?;
        let empty = dir.path().join("empty.seg");
        let full = dir.path().join("full.seg");
        let out = dir.path().join("out.seg");

        std::fs::write(&empty, "")?;
        write_lines(&full, &[(1, "one"), (2, "two")])?;

        merge_segments::<i64>(&[empty, full], &out, 100)?;
        assert_eq!(std::fs::read_to_string(&out)?, "1: one\n2: two\n");
        Ok(())
    }

    #[test]
    fn single_input_reproduces_itself() -> Result<()> {
        let dir = tempdir()?;
        let input = dir.path().join("input.seg");
        let out = dir.path().join("out.seg");

        write_lines(&input, &[(1, "one"), (5, "five"), (9, "nine")])?;
        merge_segments::<i64>(&[input.clone()], &out, 100)?;

        assert_eq!(
            std::fs::read_to_string(&out)?,
            std::fs::read_to_string(&input)?
        );
        Ok(())
    }

    // -------------------- Output is a registerable segment --------------------

    #[test]
    fn merged_output_is_sampled_like_a_flush() -> Result<()> {
        let dir = tempdir()?;
        let a = dir.path().join("a.seg");
        let b = dir.path().join("b.seg");
        let out = dir.path().join("out.seg");

        write_lines(&a, &[(0, "zero"), (2, "two"), (4, "four"), (6, "six")])?;
        write_lines(&b, &[(1, "one"), (3, "three"), (5, "five"), (7, "seven")])?;

        let index = merge_segments::<i64>(&[a, b], &out, 3)?;

        // Eight merged records: countdown sampling lands on the 4th and 7th.
        let sampled: Vec<&i64> = index.keys().collect();
        assert_eq!(sampled, vec![&3, &6]);

        let reader = SegmentReader::new(out, 2, index);
        assert_eq!(reader.get(&5)?.as_deref(), Some("five"));
        assert_eq!(reader.get(&8)?, None);
        Ok(())
    }

    // -------------------- Error paths --------------------

    #[test]
    fn malformed_line_aborts_without_committing_output() -> Result<()> {
        let dir = tempdir()?;
        let good = dir.path().join("good.seg");
        let bad = dir.path().join("bad.seg");
        let out = dir.path().join("out.seg");

        write_lines(&good, &[(1, "one"), (2, "two")])?;
        std::fs::write(&bad, "3: three\nbroken line\n")?;

        let result = merge_segments::<i64>(&[good, bad], &out, 100);
        assert!(result.is_err());
        assert!(!out.exists());
        Ok(())
    }

    #[test]
    fn mixed_key_types_are_a_type_mismatch() -> Result<()> {
        let dir = tempdir()?;
        let ints = dir.path().join("ints.seg");
        let texts = dir.path().join("texts.seg");
        let out = dir.path().join("out.seg");

        write_lines(&ints, &[(1, "one")])?;
        std::fs::write(&texts, "Bulgaria: Sofia\n")?;

        let err = merge_segments::<i64>(&[ints, texts], &out, 100).unwrap_err();
        assert!(matches!(err, crate::Error::KeyMismatch(_)));
        Ok(())
    }
}
