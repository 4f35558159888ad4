//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - decoded from the yearly CSV exports
//! - persisted into SQLite and loaded back
//! - aggregated and exported to JSON/CSV

use std::collections::HashMap;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Column holding the publication date in the proposition exports.
pub const DEFAULT_DATE_FIELD: &str = "DataPublicacao";

/// Column holding the proposition type in the proposition exports.
pub const DEFAULT_CATEGORY_FIELD: &str = "TipoProposicao";

/// Default trailing moving-average width (days present in the series).
pub const DEFAULT_WINDOW: usize = 5;

/// Categories below this share are folded into the "other" bucket.
pub const DEFAULT_OTHER_THRESHOLD: f64 = 0.01;

pub const DEFAULT_OTHER_LABEL: &str = "Outras";

/// Textual date format used by the portal (`DD/MM/YYYY`).
pub const RECORD_DATE_FORMAT: &str = "%d/%m/%Y";

/// Column names of the yearly proposition export, in table order.
pub const PROPOSITION_COLUMNS: [&str; 19] = [
    "Codigo",
    "TipoProposicao",
    "SiglaTipoProposicao",
    "Numero",
    "Ano",
    "Ementa",
    "Indexacao",
    "Situacao",
    "DataPublicacao",
    "DataAtualizacao",
    "DataUltimaAcao",
    "Regime",
    "Resumo",
    "Origem",
    "Local",
    "NomeFaseAtual",
    "Legislatura",
    "Autores",
    "LinkTextos",
];

/// Anything that exposes named textual attributes.
///
/// Aggregations only ever look records up by attribute name, so any row-like
/// value (a decoded proposition, a raw CSV row) can be fed to them.
pub trait Record {
    fn field(&self, name: &str) -> Option<&str>;
}

impl Record for HashMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> Option<&str> {
        (**self).field(name)
    }
}

/// One legislative proposition, as published in the yearly export.
///
/// All descriptive columns are kept verbatim (dates stay textual); only
/// `codigo` is required because it keys the row in storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Proposition {
    #[serde(rename = "Codigo")]
    pub codigo: String,
    #[serde(rename = "TipoProposicao")]
    pub tipo_proposicao: Option<String>,
    #[serde(rename = "SiglaTipoProposicao")]
    pub sigla_tipo_proposicao: Option<String>,
    #[serde(rename = "Numero")]
    pub numero: Option<String>,
    #[serde(rename = "Ano")]
    pub ano: Option<String>,
    #[serde(rename = "Ementa")]
    pub ementa: Option<String>,
    #[serde(rename = "Indexacao")]
    pub indexacao: Option<String>,
    #[serde(rename = "Situacao")]
    pub situacao: Option<String>,
    #[serde(rename = "DataPublicacao")]
    pub data_publicacao: Option<String>,
    #[serde(rename = "DataAtualizacao")]
    pub data_atualizacao: Option<String>,
    #[serde(rename = "DataUltimaAcao")]
    pub data_ultima_acao: Option<String>,
    #[serde(rename = "Regime")]
    pub regime: Option<String>,
    #[serde(rename = "Resumo")]
    pub resumo: Option<String>,
    #[serde(rename = "Origem")]
    pub origem: Option<String>,
    #[serde(rename = "Local")]
    pub local: Option<String>,
    #[serde(rename = "NomeFaseAtual")]
    pub nome_fase_atual: Option<String>,
    #[serde(rename = "Legislatura")]
    pub legislatura: Option<String>,
    #[serde(rename = "Autores")]
    pub autores: Option<String>,
    #[serde(rename = "LinkTextos")]
    pub link_textos: Option<String>,
    /// Year of the export file the row came from.
    pub ano_arquivo: i32,
}

impl Proposition {
    /// Column values in `PROPOSITION_COLUMNS` order (`Codigo` first).
    pub fn column_values(&self) -> [Option<&str>; 19] {
        [
            Some(self.codigo.as_str()),
            self.tipo_proposicao.as_deref(),
            self.sigla_tipo_proposicao.as_deref(),
            self.numero.as_deref(),
            self.ano.as_deref(),
            self.ementa.as_deref(),
            self.indexacao.as_deref(),
            self.situacao.as_deref(),
            self.data_publicacao.as_deref(),
            self.data_atualizacao.as_deref(),
            self.data_ultima_acao.as_deref(),
            self.regime.as_deref(),
            self.resumo.as_deref(),
            self.origem.as_deref(),
            self.local.as_deref(),
            self.nome_fase_atual.as_deref(),
            self.legislatura.as_deref(),
            self.autores.as_deref(),
            self.link_textos.as_deref(),
        ]
    }
}

impl Record for Proposition {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "Codigo" => Some(self.codigo.as_str()),
            "TipoProposicao" => self.tipo_proposicao.as_deref(),
            "SiglaTipoProposicao" => self.sigla_tipo_proposicao.as_deref(),
            "Numero" => self.numero.as_deref(),
            "Ano" => self.ano.as_deref(),
            "Ementa" => self.ementa.as_deref(),
            "Indexacao" => self.indexacao.as_deref(),
            "Situacao" => self.situacao.as_deref(),
            "DataPublicacao" => self.data_publicacao.as_deref(),
            "DataAtualizacao" => self.data_atualizacao.as_deref(),
            "DataUltimaAcao" => self.data_ultima_acao.as_deref(),
            "Regime" => self.regime.as_deref(),
            "Resumo" => self.resumo.as_deref(),
            "Origem" => self.origem.as_deref(),
            "Local" => self.local.as_deref(),
            "NomeFaseAtual" => self.nome_fase_atual.as_deref(),
            "Legislatura" => self.legislatura.as_deref(),
            "Autores" => self.autores.as_deref(),
            "LinkTextos" => self.link_textos.as_deref(),
            _ => None,
        }
    }
}

/// A legislature period, as listed by the portal API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legislature {
    pub id: i64,
    #[serde(rename = "dataInicio")]
    pub data_inicio: Option<String>,
    #[serde(rename = "dataTermino")]
    pub data_termino: Option<String>,
    /// Not every legislature carries an election date.
    #[serde(rename = "dataEleicao", default)]
    pub data_eleicao: Option<String>,
}

/// Options for the daily series aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Trailing moving-average width; must be at least 1.
    pub window: usize,
    /// Record attribute holding the `DD/MM/YYYY` date.
    pub date_field: String,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            date_field: DEFAULT_DATE_FIELD.to_string(),
        }
    }
}

/// One day of the aggregated series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    #[serde(rename = "total_propositions")]
    pub count: usize,
    #[serde(rename = "moving_avg")]
    pub moving_average: f64,
}

/// Options for the category distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionConfig {
    /// Record attribute to count values of.
    pub field: String,
    /// Categories whose share is strictly below this are folded together.
    pub other_threshold: f64,
    pub other_label: String,
    /// Trim and title-case labels before counting.
    pub normalize_labels: bool,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            field: DEFAULT_CATEGORY_FIELD.to_string(),
            other_threshold: DEFAULT_OTHER_THRESHOLD,
            other_label: DEFAULT_OTHER_LABEL.to_string(),
            normalize_labels: true,
        }
    }
}

/// One bar of a category distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub label: String,
    pub count: usize,
    /// Share of all counted records, in `[0, 1]`.
    pub proportion: f64,
}

/// How `average_movement` measures change between observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MovementMethod {
    /// Mean of absolute differences.
    Absolute,
    /// Mean of signed differences.
    Net,
    /// Mean of percentage changes.
    Percent,
    /// Mean of absolute percentage changes.
    #[value(name = "percent-abs")]
    PercentAbs,
    /// Mean absolute change per unit of elapsed time.
    #[value(name = "per-day")]
    PerDay,
}

impl MovementMethod {
    /// Name as accepted on the command line.
    pub fn label(self) -> &'static str {
        match self {
            MovementMethod::Absolute => "absolute",
            MovementMethod::Net => "net",
            MovementMethod::Percent => "percent",
            MovementMethod::PercentAbs => "percent-abs",
            MovementMethod::PerDay => "per-day",
        }
    }
}

/// Time unit for `MovementMethod::PerDay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Days,
    Hours,
    Minutes,
}

impl TimeUnit {
    pub fn seconds(self) -> f64 {
        match self {
            TimeUnit::Days => 86_400.0,
            TimeUnit::Hours => 3_600.0,
            TimeUnit::Minutes => 60.0,
        }
    }
}
