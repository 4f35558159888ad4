//! SQLite persistence for propositions and legislatures.
//!
//! Tables are created on open if missing; there is no migration step.
//! Propositions are keyed by `Codigo`, so re-importing a year replaces the
//! previous rows for the same codes.

use std::ops::RangeInclusive;
use std::path::Path;

use rusqlite::{Connection, Row, params, params_from_iter};

use crate::domain::{Legislature, PROPOSITION_COLUMNS, Proposition};
use crate::error::AppError;

const CREATE_PROPOSITIONS: &str = "CREATE TABLE IF NOT EXISTS proposicoes (
    Codigo TEXT PRIMARY KEY,
    TipoProposicao TEXT,
    SiglaTipoProposicao TEXT,
    Numero TEXT,
    Ano TEXT,
    Ementa TEXT,
    Indexacao TEXT,
    Situacao TEXT,
    DataPublicacao TEXT,
    DataAtualizacao TEXT,
    DataUltimaAcao TEXT,
    Regime TEXT,
    Resumo TEXT,
    Origem TEXT,
    Local TEXT,
    NomeFaseAtual TEXT,
    Legislatura TEXT,
    Autores TEXT,
    LinkTextos TEXT,
    ano_arquivo INTEGER
)";

const CREATE_LEGISLATURES: &str = "CREATE TABLE IF NOT EXISTS legislaturas (
    id INTEGER PRIMARY KEY,
    dataInicio TEXT,
    dataTermino TEXT,
    dataEleicao TEXT
)";

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::new(4, format!("Failed to create database directory {}: {e}", parent.display()))
            })?;
        }

        let conn = Connection::open(path)
            .map_err(|e| AppError::new(4, format!("Failed to open database '{}': {e}", path.display())))?;
        let store = Self { conn };
        store.init_schema()?;

        log::debug!("Opened SQLite database {}", path.display());
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), AppError> {
        self.conn.execute(CREATE_PROPOSITIONS, [])?;
        self.conn.execute(CREATE_LEGISLATURES, [])?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_proposicoes_ano_arquivo ON proposicoes(ano_arquivo)",
            [],
        )?;
        Ok(())
    }

    /// Insert or replace propositions in a single transaction.
    pub fn upsert_propositions(&mut self, propositions: &[Proposition]) -> Result<usize, AppError> {
        let sql = format!(
            "INSERT OR REPLACE INTO proposicoes ({}, ano_arquivo) VALUES ({})",
            PROPOSITION_COLUMNS.join(", "),
            (1..=PROPOSITION_COLUMNS.len() + 1)
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for p in propositions {
                let v = p.column_values();
                stmt.execute(params![
                    v[0], v[1], v[2], v[3], v[4], v[5], v[6], v[7], v[8], v[9], v[10], v[11], v[12], v[13],
                    v[14], v[15], v[16], v[17], v[18], p.ano_arquivo,
                ])?;
            }
        }
        tx.commit()?;

        log::debug!("Upserted {} propositions", propositions.len());
        Ok(propositions.len())
    }

    /// Load propositions, optionally restricted to a range of export years.
    pub fn load_propositions(&self, years: Option<RangeInclusive<i32>>) -> Result<Vec<Proposition>, AppError> {
        let columns = PROPOSITION_COLUMNS.join(", ");
        let (sql, bounds) = match years {
            Some(range) => (
                format!(
                    "SELECT {columns}, ano_arquivo FROM proposicoes \
                     WHERE ano_arquivo BETWEEN ?1 AND ?2 ORDER BY Codigo"
                ),
                vec![*range.start(), *range.end()],
            ),
            None => (
                format!("SELECT {columns}, ano_arquivo FROM proposicoes ORDER BY Codigo"),
                Vec::new(),
            ),
        };

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bounds.iter()), proposition_from_row)?;
        let propositions = rows.collect::<Result<Vec<_>, _>>()?;

        log::debug!("Loaded {} propositions", propositions.len());
        Ok(propositions)
    }

    pub fn count_propositions(&self) -> Result<usize, AppError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM proposicoes", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// Export years present in the table, ascending.
    pub fn source_years(&self) -> Result<Vec<i32>, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT ano_arquivo FROM proposicoes WHERE ano_arquivo IS NOT NULL ORDER BY ano_arquivo",
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<i32>, _>>()?)
    }

    pub fn upsert_legislatures(&mut self, legislatures: &[Legislature]) -> Result<usize, AppError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO legislaturas (id, dataInicio, dataTermino, dataEleicao)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for l in legislatures {
                stmt.execute(params![l.id, l.data_inicio, l.data_termino, l.data_eleicao])?;
            }
        }
        tx.commit()?;

        log::debug!("Upserted {} legislatures", legislatures.len());
        Ok(legislatures.len())
    }

    pub fn list_legislatures(&self) -> Result<Vec<Legislature>, AppError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, dataInicio, dataTermino, dataEleicao FROM legislaturas ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Legislature {
                id: row.get(0)?,
                data_inicio: row.get(1)?,
                data_termino: row.get(2)?,
                data_eleicao: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn proposition_from_row(row: &Row<'_>) -> rusqlite::Result<Proposition> {
    let text = |i: usize| row.get::<_, Option<String>>(i);
    Ok(Proposition {
        codigo: row.get(0)?,
        tipo_proposicao: text(1)?,
        sigla_tipo_proposicao: text(2)?,
        numero: text(3)?,
        ano: text(4)?,
        ementa: text(5)?,
        indexacao: text(6)?,
        situacao: text(7)?,
        data_publicacao: text(8)?,
        data_atualizacao: text(9)?,
        data_ultima_acao: text(10)?,
        regime: text(11)?,
        resumo: text(12)?,
        origem: text(13)?,
        local: text(14)?,
        nome_fase_atual: text(15)?,
        legislatura: text(16)?,
        autores: text(17)?,
        link_textos: text(18)?,
        ano_arquivo: row.get::<_, Option<i32>>(19)?.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(codigo: &str, year: i32, date: &str) -> Proposition {
        Proposition {
            codigo: codigo.to_string(),
            tipo_proposicao: Some("Requerimento".to_string()),
            data_publicacao: Some(date.to_string()),
            ano_arquivo: year,
            ..Default::default()
        }
    }

    #[test]
    fn upsert_replaces_rows_with_same_code() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .upsert_propositions(&[prop("A", 2020, "01/01/2020"), prop("B", 2020, "02/01/2020")])
            .unwrap();

        let mut updated = prop("A", 2021, "03/01/2021");
        updated.situacao = Some("Arquivada".to_string());
        store.upsert_propositions(&[updated.clone()]).unwrap();

        assert_eq!(store.count_propositions().unwrap(), 2);
        let all = store.load_propositions(None).unwrap();
        assert_eq!(all[0], updated);
        assert_eq!(all[1].codigo, "B");
    }

    #[test]
    fn load_filters_by_source_year() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .upsert_propositions(&[
                prop("A", 2019, "01/01/2019"),
                prop("B", 2020, "01/01/2020"),
                prop("C", 2021, "01/01/2021"),
            ])
            .unwrap();

        let some = store.load_propositions(Some(2020..=2021)).unwrap();
        let codes: Vec<&str> = some.iter().map(|p| p.codigo.as_str()).collect();
        assert_eq!(codes, vec!["B", "C"]);
        assert_eq!(store.source_years().unwrap(), vec![2019, 2020, 2021]);
    }

    #[test]
    fn legislatures_round_trip_through_table() {
        let mut store = Store::open_in_memory().unwrap();
        let list = vec![
            Legislature {
                id: 20,
                data_inicio: Some("2023-02-01".to_string()),
                data_termino: Some("2027-01-31".to_string()),
                data_eleicao: Some("2022-10-02".to_string()),
            },
            Legislature {
                id: 2,
                data_inicio: Some("1838-01-01".to_string()),
                data_termino: None,
                data_eleicao: None,
            },
        ];
        store.upsert_legislatures(&list).unwrap();
        store.upsert_legislatures(&list[..1]).unwrap();

        let got = store.list_legislatures().unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0], list[1]);
        assert_eq!(got[1], list[0]);
    }
}
