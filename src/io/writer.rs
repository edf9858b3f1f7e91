//! Per-vertex count files: one `id<TAB>count` line per vertex

use super::reader::is_skippable;
use super::{IoError, IoResult};
use crate::algo::LocalCounts;
use crate::graph::VertexId;
use std::io::{BufRead, Write};

/// Write local estimates sorted by vertex id.
///
/// With `dense` every id from 0 to the largest present one is written,
/// absent ids as 0.
pub fn write_local_estimates<W: Write>(
    writer: &mut W,
    counts: &LocalCounts,
    dense: bool,
) -> IoResult<()> {
    let mut vertices: Vec<VertexId> = counts.keys().copied().collect();
    vertices.sort_unstable();

    if dense {
        if let Some(&max) = vertices.last() {
            for v in 0..=max {
                let count = counts.get(&v).copied().unwrap_or(0.0);
                writeln!(writer, "{}\t{}", v, count)?;
            }
        }
    } else {
        for v in vertices {
            writeln!(writer, "{}\t{}", v, counts[&v])?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Read an `id count` file (tab or whitespace separated) of exact counts
pub fn read_local_counts<R: BufRead>(reader: R) -> IoResult<LocalCounts> {
    let mut counts = LocalCounts::default();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if is_skippable(trimmed) {
            continue;
        }
        let mut fields = trimmed.split_whitespace();
        let parsed = match (fields.next(), fields.next()) {
            (Some(id), Some(count)) => id.parse::<VertexId>().ok().zip(count.parse::<f64>().ok()),
            _ => None,
        };
        let Some((vertex, count)) = parsed else {
            return Err(IoError::Malformed {
                line: idx + 1,
                content: trimmed.to_string(),
            });
        };
        counts.insert(vertex, count);
    }
    Ok(counts)
}
