//! CSV ingest of the yearly proposition exports.
//!
//! This module turns an export (downloaded or on disk) into `Proposition`s.
//!
//! Design goals:
//! - **Tolerant schema**: every column except `Codigo` is optional
//! - **Row-level validation**: rows that cannot be keyed are skipped and reported
//! - **No semantic checks**: dates stay textual; aggregation validates them

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{PROPOSITION_COLUMNS, Proposition};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: decoded propositions + row errors.
#[derive(Debug, Clone)]
pub struct IngestedBatch {
    pub source_year: i32,
    pub propositions: Vec<Proposition>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Decode an export held in memory.
pub fn parse_propositions(text: &str, source_year: i32) -> Result<IngestedBatch, AppError> {
    parse_propositions_from_reader(text.as_bytes(), source_year)
}

/// Decode an export stored on disk (e.g. `2020.csv`).
pub fn read_propositions_file(path: &Path, source_year: i32) -> Result<IngestedBatch, AppError> {
    let file = std::fs::File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    log::debug!("Reading {} as {source_year} export", path.display());
    parse_propositions_from_reader(file, source_year)
}

/// Guess the export year from a file name such as `2020.csv`.
///
/// The stem must hold exactly one run of four digits; scattered digits
/// (`a1b2c3d4`) or longer numbers do not count.
pub fn year_from_path(path: &Path) -> Option<i32> {
    let stem = path.file_stem()?.to_str()?;
    let mut runs = stem
        .split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty());
    let year = runs.next()?;
    if year.len() != 4 || runs.next().is_some() {
        return None;
    }
    year.parse().ok()
}

fn parse_propositions_from_reader<R: Read>(input: R, source_year: i32) -> Result<IngestedBatch, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    if !header_map.contains_key(&normalize_header_name("Codigo")) {
        return Err(AppError::new(2, "Missing required column: `Codigo`"));
    }

    let missing: Vec<&str> = PROPOSITION_COLUMNS
        .iter()
        .copied()
        .filter(|c| !header_map.contains_key(&normalize_header_name(c)))
        .collect();
    if !missing.is_empty() {
        log::warn!("Export {source_year} lacks columns: {}", missing.join(", "));
    }

    let mut propositions = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1, records() starts right after it.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map, source_year) {
            Ok(p) => propositions.push(p),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    log::info!(
        "Parsed {source_year} export: {} rows read, {} kept, {} skipped",
        rows_read,
        propositions.len(),
        row_errors.len()
    );

    Ok(IngestedBatch {
        source_year,
        propositions,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

/// Header lookup key: trimmed, BOM stripped, ASCII lower case.
fn normalize_header_name(name: &str) -> String {
    // Spreadsheet tools sometimes emit a BOM before the first header.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>, source_year: i32) -> Result<Proposition, String> {
    let get = |name: &str| get_optional(record, header_map, name).map(str::to_string);

    let codigo = get("Codigo").ok_or_else(|| "Missing required value: `Codigo`".to_string())?;

    Ok(Proposition {
        codigo,
        tipo_proposicao: get("TipoProposicao"),
        sigla_tipo_proposicao: get("SiglaTipoProposicao"),
        numero: get("Numero"),
        ano: get("Ano"),
        ementa: get("Ementa"),
        indexacao: get("Indexacao"),
        situacao: get("Situacao"),
        data_publicacao: get("DataPublicacao"),
        data_atualizacao: get("DataAtualizacao"),
        data_ultima_acao: get("DataUltimaAcao"),
        regime: get("Regime"),
        resumo: get("Resumo"),
        origem: get("Origem"),
        local: get("Local"),
        nome_fase_atual: get("NomeFaseAtual"),
        legislatura: get("Legislatura"),
        autores: get("Autores"),
        link_textos: get("LinkTextos"),
        ano_arquivo: source_year,
    })
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(&normalize_header_name(name))?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\u{feff}Codigo,TipoProposicao,Numero,Ano,DataPublicacao,Autores\n\
        PL1,Projeto de Lei,1,2020,01/01/2020,\"[{\"\"nome\"\":\"\"Fulano\"\"}]\"\n\
        ,Requerimento,2,2020,02/01/2020,\n\
        RQN3, Requerimento ,3,2020,05/01/2020,\n";

    #[test]
    fn decodes_rows_and_skips_unkeyed_ones() {
        let batch = parse_propositions(EXPORT, 2020).unwrap();
        assert_eq!(batch.rows_read, 3);
        assert_eq!(batch.propositions.len(), 2);
        assert_eq!(batch.row_errors.len(), 1);
        assert_eq!(batch.row_errors[0].line, 3);

        let first = &batch.propositions[0];
        assert_eq!(first.codigo, "PL1");
        assert_eq!(first.data_publicacao.as_deref(), Some("01/01/2020"));
        assert_eq!(first.autores.as_deref(), Some(r#"[{"nome":"Fulano"}]"#));
        assert_eq!(first.situacao, None);
        assert_eq!(first.ano_arquivo, 2020);

        assert_eq!(batch.propositions[1].tipo_proposicao.as_deref(), Some("Requerimento"));
    }

    #[test]
    fn missing_key_column_is_fatal() {
        let err = parse_propositions("Numero,Ano\n1,2020\n", 2020).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn year_is_read_from_file_stem() {
        assert_eq!(year_from_path(Path::new("data/2021.csv")), Some(2021));
        assert_eq!(year_from_path(Path::new("proposicoes_1999.csv")), Some(1999));
        assert_eq!(year_from_path(Path::new("export.csv")), None);
    }

    #[test]
    fn scattered_or_long_digit_runs_are_not_years() {
        assert_eq!(year_from_path(Path::new("a1b2c3d4.csv")), None);
        assert_eq!(year_from_path(Path::new("20201.csv")), None);
        assert_eq!(year_from_path(Path::new("2020_v2.csv")), None);
        assert_eq!(year_from_path(Path::new("2019-2020.csv")), None);
    }

    #[test]
    fn header_names_match_regardless_of_case() {
        let batch = parse_propositions(" CODIGO ,tipoproposicao,DATAPUBLICACAO\nPL9,Veto,03/03/2023\n", 2023).unwrap();
        let p = &batch.propositions[0];
        assert_eq!(p.codigo, "PL9");
        assert_eq!(p.tipo_proposicao.as_deref(), Some("Veto"));
        assert_eq!(p.data_publicacao.as_deref(), Some("03/03/2023"));
    }
}
