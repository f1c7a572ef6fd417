use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use log::info;
use parquet::data_type::{ByteArray, ByteArrayType, Int64Type};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::file::writer::{SerializedColumnWriter, SerializedFileWriter};
use parquet::record::Field;
use parquet::schema::parser::parse_message_type;
use tempfile::NamedTempFile;

use crate::http_client::{fetch_bytes, is_remote};
use crate::stats::{
    COL_OPPONENT, COL_PLAYER, COL_ROUND, COL_STAT, COL_TEAM, COL_VALUE, MISSING_MARKER, RawStatRow,
};

/// Layout the scraper writes: a melted frame with its pandas index column.
const RAW_STATS_SCHEMA: &str = "
message raw_stats {
    REQUIRED INT64 index;
    REQUIRED BYTE_ARRAY player (UTF8);
    REQUIRED BYTE_ARRAY team (UTF8);
    REQUIRED INT64 round;
    OPTIONAL BYTE_ARRAY opponents (UTF8);
    REQUIRED BYTE_ARRAY stat (UTF8);
    REQUIRED BYTE_ARRAY value (UTF8);
}
";

/// `{prefix}{year}.parquet`
pub fn year_data_location(prefix: &str, year: i32) -> String {
    format!("{prefix}{year}.parquet")
}

/// Reads the raw stats for a year from a local file or an http(s) URL.
pub fn load_raw_stats(location: &str) -> Result<Vec<RawStatRow>> {
    info!("fetching raw stats from {location}");
    if is_remote(location) {
        let local = download_to_temp(location)?;
        return read_raw_stats(local.path());
    }
    read_raw_stats(Path::new(location))
}

/// Every row must carry player, team, round and stat. A row that cannot be
/// decoded fails the whole file so no year is scored from a partial table.
pub fn read_raw_stats(path: &Path) -> Result<Vec<RawStatRow>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = SerializedFileReader::new(file).context("open parquet reader raw stats")?;
    let iter = reader.get_row_iter(None).context("iterate raw stat rows")?;

    let mut out = Vec::new();
    for (idx, row) in iter.enumerate() {
        let row =
            row.with_context(|| format!("decode raw stat row {idx} in {}", path.display()))?;

        let mut player = None;
        let mut team = None;
        let mut round = None;
        let mut opponent = None;
        let mut stat = None;
        let mut value = None;
        for (name, field) in row.get_column_iter() {
            match name.as_str() {
                COL_PLAYER => player = field_string(field),
                COL_TEAM => team = field_string(field),
                COL_ROUND => round = field_u32(field),
                COL_OPPONENT => opponent = field_string(field),
                COL_STAT => stat = field_string(field),
                COL_VALUE => value = field_string(field),
                _ => {}
            }
        }

        let missing = |column: &str| {
            anyhow!(
                "raw stat row {idx} in {} has no usable {column}",
                path.display()
            )
        };
        out.push(RawStatRow {
            player: player.ok_or_else(|| missing(COL_PLAYER))?,
            team: team.ok_or_else(|| missing(COL_TEAM))?,
            round: round.ok_or_else(|| missing(COL_ROUND))?,
            opponent,
            stat: stat.ok_or_else(|| missing(COL_STAT))?,
            // A null cell is the same as the scraper's missing marker.
            value: value.unwrap_or_else(|| MISSING_MARKER.to_string()),
        });
    }

    info!("read {} raw stat rows from {}", out.len(), path.display());
    Ok(out)
}

/// Writes rows in the scraper's layout.
pub fn write_raw_stats(path: &Path, rows: &[RawStatRow]) -> Result<()> {
    let schema = Arc::new(parse_message_type(RAW_STATS_SCHEMA).context("parse raw stats schema")?);
    let props = Arc::new(WriterProperties::builder().build());
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer =
        SerializedFileWriter::new(file, schema, props).context("open parquet writer")?;

    let index: Vec<i64> = (0..rows.len() as i64).collect();
    let rounds: Vec<i64> = rows.iter().map(|r| i64::from(r.round)).collect();
    let opponents: Vec<ByteArray> = rows
        .iter()
        .filter_map(|r| r.opponent.as_deref().map(ByteArray::from))
        .collect();
    let opponent_levels: Vec<i16> = rows
        .iter()
        .map(|r| i16::from(r.opponent.is_some()))
        .collect();
    let strings = |f: fn(&RawStatRow) -> &str| -> Vec<ByteArray> {
        rows.iter().map(|r| ByteArray::from(f(r))).collect()
    };

    let mut row_group = writer.next_row_group().context("start row group")?;
    let mut col = 0usize;
    while let Some(mut column) = row_group.next_column().context("next column")? {
        match col {
            0 => write_longs(&mut column, &index)?,
            1 => write_strings(&mut column, &strings(|r| r.player.as_str()), None)?,
            2 => write_strings(&mut column, &strings(|r| r.team.as_str()), None)?,
            3 => write_longs(&mut column, &rounds)?,
            4 => write_strings(&mut column, &opponents, Some(&opponent_levels))?,
            5 => write_strings(&mut column, &strings(|r| r.stat.as_str()), None)?,
            _ => write_strings(&mut column, &strings(|r| r.value.as_str()), None)?,
        }
        column.close().context("close column")?;
        col += 1;
    }
    row_group.close().context("close row group")?;
    writer.close().context("close parquet writer")?;
    Ok(())
}

fn write_longs(column: &mut SerializedColumnWriter<'_>, values: &[i64]) -> Result<()> {
    column
        .typed::<Int64Type>()
        .write_batch(values, None, None)
        .context("write int64 column")?;
    Ok(())
}

fn write_strings(
    column: &mut SerializedColumnWriter<'_>,
    values: &[ByteArray],
    def_levels: Option<&[i16]>,
) -> Result<()> {
    column
        .typed::<ByteArrayType>()
        .write_batch(values, def_levels, None)
        .context("write string column")?;
    Ok(())
}

/// Removed again when the returned handle drops.
fn download_to_temp(url: &str) -> Result<NamedTempFile> {
    let bytes = fetch_bytes(url)?;
    let mut file = tempfile::Builder::new()
        .prefix("brownlow_votes_")
        .suffix(".parquet")
        .tempfile()
        .context("create temp file for download")?;
    file.write_all(&bytes)
        .with_context(|| format!("write {}", file.path().display()))?;
    Ok(file)
}

fn field_string(field: &Field) -> Option<String> {
    match field {
        Field::Str(s) => Some(s.clone()),
        Field::Int(v) => Some(v.to_string()),
        Field::Long(v) => Some(v.to_string()),
        Field::Float(v) => Some(v.to_string()),
        Field::Double(v) => Some(v.to_string()),
        _ => None,
    }
}

fn field_u32(field: &Field) -> Option<u32> {
    match field {
        Field::Short(v) => u32::try_from(*v).ok(),
        Field::Int(v) => u32::try_from(*v).ok(),
        Field::Long(v) => u32::try_from(*v).ok(),
        Field::UInt(v) => Some(*v),
        Field::Double(v) if v.fract() == 0.0 && *v >= 0.0 => Some(*v as u32),
        Field::Str(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{field_u32, year_data_location};
    use parquet::record::Field;

    #[test]
    fn builds_year_location() {
        assert_eq!(
            year_data_location("s3-cache/afl_gbg_", 2024),
            "s3-cache/afl_gbg_2024.parquet"
        );
    }

    #[test]
    fn reads_rounds_from_any_numeric_field() {
        assert_eq!(field_u32(&Field::Long(4)), Some(4));
        assert_eq!(field_u32(&Field::Double(7.0)), Some(7));
        assert_eq!(field_u32(&Field::Double(7.5)), None);
        assert_eq!(field_u32(&Field::Str(" 3 ".to_string())), Some(3));
        assert_eq!(field_u32(&Field::Int(-1)), None);
    }
}
