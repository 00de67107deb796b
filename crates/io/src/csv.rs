// CSV/TSV import

use std::io::Read;
use std::path::Path;

use crate::Cell;

/// Read a delimited file into rows of cells. `.tsv` forces tab; anything
/// else is sniffed.
pub fn import(path: &Path) -> Result<Vec<Vec<Cell>>, String> {
    let content = read_file_as_utf8(path)?;
    let is_tsv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
    let delimiter = if is_tsv { b'\t' } else { sniff_delimiter(&content) };
    import_from_string(&content, delimiter)
}

/// Pick the delimiter for a file whose extension doesn't say.
///
/// The header line decides how many columns a candidate yields; a candidate
/// scores that column count times the number of sampled lines agreeing with
/// it. Header lines that don't split disqualify the candidate. Comma wins
/// when nothing splits, and earlier candidates win ties.
fn sniff_delimiter(content: &str) -> u8 {
    const CANDIDATES: [u8; 4] = [b'\t', b';', b',', b'|'];
    let sample: Vec<&str> = content.lines().take(10).collect();

    let mut chosen = (b',', 0usize);
    for delim in CANDIDATES {
        let widths: Vec<usize> = sample.iter().map(|line| field_count(line, delim)).collect();
        let Some(&header_width) = widths.first() else {
            break;
        };
        if header_width < 2 {
            continue;
        }
        let agreeing = widths.iter().filter(|&&w| w == header_width).count();
        let score = agreeing * header_width;
        if score > chosen.1 {
            chosen = (delim, score);
        }
    }
    chosen.0
}

fn field_count(line: &str, delim: u8) -> usize {
    ::csv::ReaderBuilder::new()
        .delimiter(delim)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(Result::ok)
        .map_or(1, |record| record.len())
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    // Excel writes a BOM on "CSV UTF-8" exports
    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

fn import_from_string(content: &str, delimiter: u8) -> Result<Vec<Vec<Cell>>, String> {
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(rows)
}
