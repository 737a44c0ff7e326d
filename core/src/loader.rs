//! Readers for the line-oriented evaluation inputs.
//!
//! Every reader trims each line and skips blank ones. Records that cannot be
//! parsed fail the whole load with [`EvalError::MalformedInput`]; scoring
//! against partially loaded ground truth would be meaningless.

use crate::error::{EvalError, Result};
use crate::index::Document;
use crate::qrels::RelevanceJudgments;
use crate::{DocId, QueryId};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub const QUERY_SEPARATOR: char = '\t';
pub const QREL_SEPARATOR: char = ';';
pub const DOC_SEPARATOR: char = ',';
pub const DOCUMENT_FIELD_SEPARATOR: char = '\t';

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| EvalError::Io { path: path.to_path_buf(), source })
}

// Feeds each trimmed, non-blank line to `parse_line` along with its 1-based line number.
fn for_each_line<R, F>(reader: R, source_name: &str, mut parse_line: F) -> Result<()>
where
    R: BufRead,
    F: FnMut(usize, &str) -> Result<()>,
{
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| EvalError::Io { path: source_name.into(), source })?;
        let line = line.trim();
        if line.is_empty() { continue; }
        parse_line(i + 1, line)?;
    }
    Ok(())
}

fn malformed(source_name: &str, line: usize, reason: impl Into<String>) -> EvalError {
    EvalError::MalformedInput { source_name: source_name.to_string(), line, reason: reason.into() }
}

/// Query texts in file order. The second tab-separated field is the text; the
/// first is ignored.
pub fn parse_queries<R: BufRead>(reader: R, source_name: &str) -> Result<Vec<String>> {
    let mut queries = Vec::new();
    for_each_line(reader, source_name, |line_no, line| {
        let text = line
            .split(QUERY_SEPARATOR)
            .nth(1)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| malformed(source_name, line_no, "missing query text field"))?;
        queries.push(text.to_string());
        Ok(())
    })?;
    Ok(queries)
}

/// Relevance judgments, one `queryId;doc,doc,...` record per line.
pub fn parse_judgments<R: BufRead>(reader: R, source_name: &str) -> Result<RelevanceJudgments> {
    let mut pairs: Vec<(QueryId, Vec<DocId>)> = Vec::new();
    for_each_line(reader, source_name, |line_no, line| {
        let (query, docs) = line
            .split_once(QREL_SEPARATOR)
            .ok_or_else(|| malformed(source_name, line_no, format!("expected `query{QREL_SEPARATOR}docs`")))?;
        let query_id: QueryId = query
            .trim()
            .parse()
            .map_err(|e| malformed(source_name, line_no, format!("query id `{}`: {e}", query.trim())))?;
        if query_id == 0 {
            return Err(malformed(source_name, line_no, "query ids start at 1"));
        }
        let docs = docs
            .split(DOC_SEPARATOR)
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| d.parse::<DocId>().map_err(|e| malformed(source_name, line_no, format!("document id `{d}`: {e}"))))
            .collect::<Result<Vec<_>>>()?;
        pairs.push((query_id, docs));
        Ok(())
    })?;
    Ok(RelevanceJudgments::from_pairs(pairs))
}

/// One word per line, passed through to the analyzer as stop words.
pub fn parse_common_words<R: BufRead>(reader: R, source_name: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    for_each_line(reader, source_name, |_, line| {
        words.push(line.to_string());
        Ok(())
    })?;
    Ok(words)
}

/// Documents as `id<TAB>authors<TAB>title[<TAB>summary]`.
pub fn parse_documents<R: BufRead>(reader: R, source_name: &str) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    for_each_line(reader, source_name, |line_no, line| {
        let mut fields = line.split(DOCUMENT_FIELD_SEPARATOR);
        let id_field = fields.next().unwrap_or_default().trim();
        let id: DocId = id_field
            .parse()
            .map_err(|e| malformed(source_name, line_no, format!("document id `{id_field}`: {e}")))?;
        let authors = fields.next().unwrap_or_default().trim().to_string();
        let title = fields
            .next()
            .map(str::trim)
            .ok_or_else(|| malformed(source_name, line_no, "missing title field"))?
            .to_string();
        let summary = fields.next().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        documents.push(Document { id, authors, title, summary });
        Ok(())
    })?;
    Ok(documents)
}

fn source_name(path: &Path) -> String {
    path.display().to_string()
}

pub fn read_queries(path: &Path) -> Result<Vec<String>> {
    parse_queries(open(path)?, &source_name(path))
}

pub fn read_judgments(path: &Path) -> Result<RelevanceJudgments> {
    parse_judgments(open(path)?, &source_name(path))
}

pub fn read_common_words(path: &Path) -> Result<Vec<String>> {
    parse_common_words(open(path)?, &source_name(path))
}

pub fn read_documents(path: &Path) -> Result<Vec<Document>> {
    parse_documents(open(path)?, &source_name(path))
}
