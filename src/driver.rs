use crate::dataset::load_conversations;
use crate::extract::{ extract_all, ExtractionRecord };
use crate::history::render_history_for_display;
use crate::reply::ReplyGenerator;
use log::{ error, info };
use std::error::Error;
use std::fs;
use std::io::{ self, Write };
use std::path::Path;

const SEPARATOR_WIDTH: usize = 50;

/// Missing or malformed input is logged and yields no records.
pub fn extract_from_file<P: AsRef<Path>>(path: P) -> Vec<ExtractionRecord> {
    match load_conversations(&path) {
        Ok(conversations) => {
            let records = extract_all(&conversations);
            info!(
                "Extracted {} records from {} conversations",
                records.len(),
                conversations.len()
            );
            records
        }
        Err(e) => {
            error!("{}", e);
            Vec::new()
        }
    }
}

/// Client turn and reversed history of one record, without the reply.
pub fn render_sample(index: usize, record: &ExtractionRecord) -> String {
    let mut out = format!("--- Sample {} ---\n", index + 1);

    out.push_str("CLIENT:\n");
    for msg in &record.client_sequence {
        out.push_str(&msg.text);
        out.push('\n');
    }
    out.push('\n');

    out.push_str("CHAT HISTORY:\n");
    for line in render_history_for_display(&record.history) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');
    out
}

pub fn render_reply(reply: &str) -> String {
    format!("AI REPLY: {}\n\n{}\n", reply, "=".repeat(SEPARATOR_WIDTH))
}

/// Prints the first `limit` records with a generated reply each. Returns the
/// number of samples processed.
pub async fn run_samples<W: Write>(
    records: &[ExtractionRecord],
    generator: &ReplyGenerator,
    limit: usize,
    out: &mut W
) -> io::Result<usize> {
    writeln!(out, "Total extracted pairs: {}\n", records.len())?;

    let mut processed = 0;
    for (idx, record) in records.iter().take(limit).enumerate() {
        write!(out, "{}", render_sample(idx, record))?;
        let reply = generator.generate_reply(&record.client_sequence, &record.history).await;
        writeln!(out, "{}", render_reply(&reply))?;
        processed += 1;
    }

    writeln!(
        out,
        "Stopped after {} sample(s) to avoid rate limits during verification.",
        processed
    )?;
    Ok(processed)
}

pub fn write_records(
    records: &[ExtractionRecord],
    output: Option<&Path>
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let json = serde_json::to_string_pretty(records)?;
    match output {
        Some(path) => {
            fs::write(path, json + "\n")?;
            info!("Wrote {} records to {}", records.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", json)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Message;

    fn record() -> ExtractionRecord {
        ExtractionRecord {
            history: vec![Message::outbound("welcome", 1.0), Message::inbound("hey", 2.0)],
            client_sequence: vec![Message::inbound("hi", 3.0), Message::inbound("there", 4.0)],
            consultant_reply_sequence: vec![Message::outbound("hello", 5.0)],
        }
    }

    #[test]
    fn sample_lists_client_then_reversed_history() {
        let rendered = render_sample(0, &record());
        assert_eq!(
            rendered,
            "--- Sample 1 ---\nCLIENT:\nhi\nthere\n\nCHAT HISTORY:\n(CLIENT) hey\n(CONSULTANT) welcome\n\n"
        );
    }

    #[test]
    fn missing_file_yields_no_records() {
        assert!(extract_from_file("/no/such/conversations.json").is_empty());
    }

    #[tokio::test]
    async fn samples_are_bounded_by_limit() {
        let records = vec![record(), record(), record()];
        let generator = ReplyGenerator::new(None, "SYSTEM", None);
        let mut out = Vec::new();
        let processed = run_samples(&records, &generator, 1, &mut out).await.unwrap();
        assert_eq!(processed, 1);

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Total extracted pairs: 3\n"));
        assert!(text.contains("--- Sample 1 ---"));
        assert!(!text.contains("--- Sample 2 ---"));
        assert!(text.contains("AI REPLY: Error: API Key missing"));
        assert!(text.ends_with("Stopped after 1 sample(s) to avoid rate limits during verification.\n"));
    }
}
