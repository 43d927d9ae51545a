use std::collections::HashSet;

/// Read station names from CSV content
///
/// The first column of each row holds a station name. A leading header row
/// (first field exactly "name" or "station", any case) is skipped, as are blank
/// names and repeats of a name already seen. Rows that fail to parse are
/// ignored.
#[must_use]
pub fn parse_station_names(content: &str) -> Vec<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for (row_index, record) in reader.records().enumerate() {
        let Ok(row) = record else { continue };

        if row_index == 0 && looks_like_header(&row) {
            continue;
        }

        let Some(name) = row.get(0).filter(|name| !name.is_empty()) else {
            continue;
        };

        if seen.insert(name.to_string()) {
            names.push(name.to_string());
        }
    }

    names
}

/// Check if a row looks like a header
fn looks_like_header(row: &csv::StringRecord) -> bool {
    row.get(0)
        .is_some_and(|first| first.eq_ignore_ascii_case("name") || first.eq_ignore_ascii_case("station"))
}
