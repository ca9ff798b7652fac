/*!
 * N-gram selection for font-property extraction.
 *
 * Reads a frequency table (`<token> <count>` per line) and keeps the most
 * frequent tokens until they cover a fixed share of all occurrences. The
 * result is rendered once per font so the renderer can measure font
 * properties on representative text.
 */

use anyhow::{anyhow, Result};
use log::{debug, info};
use std::path::Path;

use crate::context::RunContext;
use crate::file_utils::FileManager;

/// Share of the total count the selected n-grams must cover
pub const DEFAULT_COVERAGE: f64 = 0.99;

/// One line of a frequency table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyRecord {
    pub token: String,
    pub count: u64,
}

/// Parse a frequency table. Lines with fewer than two fields are skipped.
pub fn parse_frequency_table(content: &str) -> Result<Vec<FrequencyRecord>> {
    let mut records = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let mut fields = line.split_whitespace();
        let (Some(token), Some(count)) = (fields.next(), fields.next()) else {
            continue;
        };
        let count = count
            .parse::<u64>()
            .map_err(|e| anyhow!("Line {}: invalid count '{}': {}", line_no + 1, count, e))?;
        records.push(FrequencyRecord {
            token: token.to_string(),
            count,
        });
    }

    Ok(records)
}

/// Pick tokens in descending count order (file order on ties) until their
/// cumulative count exceeds `coverage` of the total
pub fn select_ngrams(records: &[FrequencyRecord], coverage: f64) -> Vec<&str> {
    let total: u128 = records.iter().map(|r| u128::from(r.count)).sum();
    let threshold = coverage * total as f64;
    if threshold <= 0.0 {
        return Vec::new();
    }

    let mut sorted: Vec<&FrequencyRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.count.cmp(&a.count));

    let mut selected = Vec::new();
    let mut cumulative = 0u128;
    for record in sorted {
        if cumulative as f64 > threshold {
            break;
        }
        selected.push(record.token.as_str());
        cumulative += u128::from(record.count);
    }

    selected
}

/// Space-separated n-gram text, each token followed by a space
pub fn format_ngrams(tokens: &[&str]) -> String {
    tokens.iter().map(|t| format!("{} ", t)).collect()
}

/// Sample `freqs_file` into `output`, returning the number of tokens written
pub fn write_train_ngrams(freqs_file: &Path, output: &Path, coverage: f64) -> Result<usize> {
    let content = FileManager::read_to_string(freqs_file)?;
    let records = parse_frequency_table(&content)
        .map_err(|e| anyhow!("Failed to parse {}: {}", freqs_file.display(), e))?;
    let selected = select_ngrams(&records, coverage);

    FileManager::write_to_file(output, &format_ngrams(&selected))?;
    debug!(
        "Selected {} of {} n-grams from {}",
        selected.len(),
        records.len(),
        freqs_file.display()
    );

    Ok(selected.len())
}

/// Produce the n-gram training text when font properties are wanted and a
/// frequency table exists. Only a non-empty result is recorded in the context
pub fn prepare_train_ngrams(ctx: &mut RunContext) -> Result<()> {
    if !ctx.flags.extract_font_properties {
        debug!("Font property extraction disabled, skipping n-gram sampling");
        return Ok(());
    }

    if !ctx.bigram_freqs_file.exists() {
        info!(
            "No frequency table at {}, font properties will not be extracted",
            ctx.bigram_freqs_file.display()
        );
        return Ok(());
    }

    let output = ctx.train_ngrams_target();
    let count = write_train_ngrams(&ctx.bigram_freqs_file, &output, DEFAULT_COVERAGE)?;
    if !FileManager::is_non_empty(&output) {
        info!(
            "Frequency table {} selected no n-grams, font properties will not be extracted",
            ctx.bigram_freqs_file.display()
        );
        return Ok(());
    }
    info!("Wrote {} n-grams to {}", count, output.display());

    ctx.train_ngrams_file = Some(output);
    Ok(())
}
