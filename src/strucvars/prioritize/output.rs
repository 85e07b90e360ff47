//! Writing of ranked results to TSV.

use std::io::Write;

use csv::QuoteStyle;
use serde::{Deserialize, Serialize};

use crate::strucvars::schema::{
    input::{VariantRecord, VariantRow},
    CallInfo, SvType,
};

use super::{ranking::Ranking, scorer::Contribution};

/// Information written into the JSON `payload` column.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ResultPayload {
    pub chromosome2: Option<String>,
    pub pos2: Option<i64>,
    pub ref_allele: String,
    pub alt_allele: String,
    pub call_info: CallInfo,
    pub contributions: Vec<Contribution>,
}

/// One row of the output file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResultRecord {
    /// 1-based rank, empty for failures.
    pub rank: Option<usize>,
    pub variant_id: String,
    pub chromosome: String,
    /// Empty for unparseable input rows, as are `end` and `sv_type`.
    pub begin: Option<i64>,
    pub end: Option<i64>,
    pub sv_type: Option<SvType>,
    /// Score, empty for failures.
    pub score: Option<f64>,
    /// Error message, empty for scored variants.
    pub error: Option<String>,
    /// JSON-serialized `ResultPayload`.
    pub payload: String,
}

/// Summary of `write_ranking`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteStats {
    pub count_ranked: usize,
    pub count_failed: usize,
    pub count_truncated: usize,
}

fn payload(
    record: &VariantRecord,
    contributions: Vec<Contribution>,
) -> Result<String, anyhow::Error> {
    Ok(serde_json::to_string(&ResultPayload {
        chromosome2: record.chromosome2.clone(),
        pos2: record.pos2,
        ref_allele: record.ref_allele.clone(),
        alt_allele: record.alt_allele.clone(),
        call_info: CallInfo {
            read_depth: record.read_depth,
            ref_count: record.ref_count,
            alt_count: record.alt_count,
        },
        contributions,
    })?)
}

/// Output row for the input `row`, without rank, score, and error.
fn result_record(
    row: &VariantRow,
    variant_id: &str,
    contributions: Vec<Contribution>,
) -> Result<ResultRecord, anyhow::Error> {
    let (chromosome, begin, end, sv_type, payload) = match row {
        Ok(record) => (
            record.chromosome.clone(),
            Some(record.begin),
            Some(record.end),
            Some(record.sv_type),
            payload(record, contributions)?,
        ),
        Err(rejected) => (
            rejected.chromosome.clone(),
            None,
            None,
            None,
            serde_json::to_string(&ResultPayload::default())?,
        ),
    };
    Ok(ResultRecord {
        rank: None,
        variant_id: variant_id.to_owned(),
        chromosome,
        begin,
        end,
        sv_type,
        score: None,
        error: None,
        payload,
    })
}

/// Write `ranking` to `writer`; `rows` are the inputs in input order.
///
/// At most `max_results` ranked records are written, failures always are.
pub fn write_ranking<W: Write>(
    writer: W,
    ranking: &Ranking,
    rows: &[VariantRow],
    max_results: Option<usize>,
) -> Result<WriteStats, anyhow::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(true)
        .delimiter(b'\t')
        .quote_style(QuoteStyle::Never)
        .from_writer(writer);
    let mut stats = WriteStats::default();

    for ranked in &ranking.ranked {
        if max_results.map_or(false, |max_results| stats.count_ranked >= max_results) {
            stats.count_truncated = ranking.ranked.len() - stats.count_ranked;
            tracing::warn!(
                "stopping after {} records but there are {} more results!",
                stats.count_ranked,
                stats.count_truncated
            );
            break;
        }
        let priority = &ranked.priority;
        csv_writer.serialize(&ResultRecord {
            rank: Some(ranked.rank),
            score: Some(priority.score),
            ..result_record(
                &rows[ranked.index],
                &priority.variant_id,
                priority.contributions.clone(),
            )?
        })?;
        stats.count_ranked += 1;
    }

    for failure in &ranking.failures {
        csv_writer.serialize(&ResultRecord {
            error: Some(failure.reason.to_string()),
            ..result_record(&rows[failure.index], &failure.variant_id, Vec::new())?
        })?;
        stats.count_failed += 1;
    }

    csv_writer.flush()?;
    Ok(stats)
}
