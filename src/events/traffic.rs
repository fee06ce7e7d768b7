//! NDJSON traffic logs: one JSON object per observed request.

use super::TrafficRecord;
use std::io::BufRead;
use tracing::warn;

/// Records decoded from one NDJSON stream.
#[derive(Debug, Default)]
pub struct NdjsonBatch {
    pub records: Vec<TrafficRecord>,
    /// Lines that were not valid traffic objects
    pub skipped: usize,
}

/// Decode every non-blank line; malformed lines are counted and logged, never fatal.
pub fn read_traffic_ndjson<R: BufRead>(reader: R) -> std::io::Result<NdjsonBatch> {
    let mut batch = NdjsonBatch::default();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<TrafficRecord>(&line) {
            Ok(r) => batch.records.push(r),
            Err(e) => {
                warn!(line = idx + 1, error = %e, "skipping malformed traffic line");
                batch.skipped += 1;
            }
        }
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_lines_with_defaults_and_aliases() {
        let input = concat!(
            r#"{"timestamp": 1.5, "source_ip": "10.0.0.1", "terminal_id": "T1", "response_time_ms": 50, "status": 200}"#,
            "\n\n",
            r#"{"timestamp": 2.0}"#,
            "\n",
            "not json\n",
        );
        let batch = read_traffic_ndjson(input.as_bytes()).unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.skipped, 1);
        assert_eq!(batch.records[0].status_code, 200);
        assert_eq!(batch.records[0].response_time_ms, 50.0);
        assert_eq!(batch.records[1].status_code, 0);
        assert_eq!(batch.records[1].source_ip, "");
    }

    #[test]
    fn status_decoding_is_lenient() {
        let input = concat!(
            r#"{"timestamp": 1.0, "status": "503"}"#,
            "\n",
            r#"{"timestamp": 2.0, "status": 200.0}"#,
            "\n",
            r#"{"timestamp": 3.0, "status": 502, "status_code": 504, "source": "a", "source_ip": "b"}"#,
            "\n",
            r#"{"timestamp": 4.0, "status_code": "oops", "status": 500}"#,
            "\n",
            r#"{"timestamp": 5.0, "status": [503], "response_time_ms": 12.5}"#,
            "\n",
            r#"{"timestamp": 6.0, "status": 70000}"#,
            "\n",
        );
        let batch = read_traffic_ndjson(input.as_bytes()).unwrap();
        assert_eq!(batch.skipped, 0);
        let codes: Vec<u16> = batch.records.iter().map(|r| r.status_code).collect();
        assert_eq!(codes, vec![503, 200, 504, 500, 0, 0]);
        assert_eq!(batch.records[2].source_ip, "b");
        assert_eq!(batch.records[4].response_time_ms, 12.5);
        assert!(batch.records[0].is_server_error());
    }
}
