//! Record framing for the event-stream response body.
//!
//! Each content record is a `data: `-prefixed line carrying a JSON envelope
//! or the `[DONE]` sentinel. Anything else on the wire is protocol noise:
//! keep-alives, comment lines, and partial records split across a read
//! boundary are all skipped without error and never surfaced to the caller.

use serde::Deserialize;

pub(crate) const DATA_PREFIX: &str = "data: ";
pub(crate) const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Record {
    Delta(String),
    Done,
}

/// Per-stream framing counters, logged once at stream end.
#[derive(Debug, Default)]
pub(crate) struct RecordStats {
    pub lines: u64,
    pub deltas: u64,
    pub dropped: u64,
}

// Only `choices[0].delta.content` is read; every other envelope field is
// ignored by serde's default unknown-field handling.
#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Default)]
struct Choice {
    #[serde(default)]
    delta: DeltaBody,
}

#[derive(Deserialize, Default)]
struct DeltaBody {
    content: Option<String>,
}

/// Split newly-received bytes into records. Scanning stops at the `[DONE]`
/// sentinel; the sentinel itself is never forwarded as content.
pub(crate) fn parse_records(new_bytes: &[u8], stats: &mut RecordStats) -> Vec<Record> {
    let text = String::from_utf8_lossy(new_bytes);
    let mut out = Vec::new();

    for line in text.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        stats.lines += 1;

        let payload = match line.strip_prefix(DATA_PREFIX) {
            Some(p) => p.trim(),
            // Tolerate the no-space `data:` form some backends emit.
            None => match line.strip_prefix("data:") {
                Some(p) => p.trim(),
                None => {
                    tracing::debug!(line_len = line.len(), "ignoring non-data line");
                    continue;
                }
            },
        };

        if payload == DONE_SENTINEL {
            out.push(Record::Done);
            break;
        }

        match serde_json::from_str::<Envelope>(payload) {
            Ok(env) => match env.choices.into_iter().next().and_then(|c| c.delta.content) {
                Some(content) => {
                    stats.deltas += 1;
                    out.push(Record::Delta(content));
                }
                None => {
                    // Valid JSON without a content delta (role announcements,
                    // usage frames). Not an error.
                    stats.dropped += 1;
                }
            },
            Err(err) => {
                stats.dropped += 1;
                tracing::debug!(error = %err, "skipping malformed record");
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(input: &str) -> Vec<Record> {
        let mut stats = RecordStats::default();
        parse_records(input.as_bytes(), &mut stats)
    }

    #[test]
    fn content_deltas_in_order() {
        let recs = records(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\
             data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\
             data: [DONE]\n",
        );
        assert_eq!(
            recs,
            vec![
                Record::Delta("Hel".into()),
                Record::Delta("lo".into()),
                Record::Done,
            ]
        );
    }

    #[test]
    fn malformed_record_is_skipped_silently() {
        let recs = records(
            "data: {not json\n\
             data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n",
        );
        assert_eq!(recs, vec![Record::Delta("ok".into())]);
    }

    #[test]
    fn noise_lines_are_ignored() {
        let recs = records(
            ": keep-alive\n\
             event: message\n\
             data: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\n",
        );
        assert_eq!(recs, vec![Record::Delta("x".into())]);
    }

    #[test]
    fn no_space_prefix_is_tolerated() {
        let recs = records("data:{\"choices\":[{\"delta\":{\"content\":\"y\"}}]}\n");
        assert_eq!(recs, vec![Record::Delta("y".into())]);
    }

    #[test]
    fn records_after_done_are_not_scanned() {
        let recs = records(
            "data: [DONE]\n\
             data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n",
        );
        assert_eq!(recs, vec![Record::Done]);
    }

    #[test]
    fn delta_without_content_is_dropped() {
        let mut stats = RecordStats::default();
        let recs = parse_records(
            b"data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n",
            &mut stats,
        );
        assert!(recs.is_empty());
        assert_eq!(stats.dropped, 1);
    }
}
