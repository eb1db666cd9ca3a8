use crate::error::{Error, ErrorKind};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// File formats a template can produce.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[display("html")]
    Html,
    #[display("json")]
    Json,
    #[display("yaml")]
    Yaml,
}
impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}
impl FromStr for OutputFormat {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "html" | "htm" => Self::Html,
            "json" => Self::Json,
            "yaml" | "yml" => Self::Yaml,
            other => exn::bail!(ErrorKind::Invalid(format!("unknown output format: {other}"))),
        })
    }
}

/// Which template types and output formats are generated.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Generate {
    /// Enabled template types, e.g. `collection.movie` or `report.any`.
    pub types: Vec<String>,
    /// Enabled output formats.
    pub formats: Vec<String>,
}
impl Default for Generate {
    fn default() -> Self {
        Self {
            types: ["library.any", "collection.any", "metadata.any", "report.any"].map(String::from).to_vec(),
            formats: ["yaml", "json", "html"].map(String::from).to_vec(),
        }
    }
}
impl Generate {
    pub fn is_format_enabled(&self, format: OutputFormat) -> bool {
        self.formats.iter().any(|f| f.parse::<OutputFormat>().is_ok_and(|f| f == format))
    }

    /// A dotted type is enabled when listed verbatim, or when its group's
    /// `.any` wildcard is listed.
    pub fn is_type_enabled(&self, kind: &str) -> bool {
        let kind = kind.trim().to_lowercase();
        tracing::trace!(kind = %kind, types = ?self.types, "Checking whether template type is enabled");
        if let Some((group, _)) = kind.split_once('.') {
            let any = format!("{group}.any");
            if self.types.iter().any(|t| t.trim().eq_ignore_ascii_case(&any)) {
                return true;
            }
        }
        self.types.iter().any(|t| t.trim().eq_ignore_ascii_case(&kind))
    }

    /// Reports for a group are enabled by `report.any` or `<group>.report`.
    pub fn is_report_enabled(&self, group: &str) -> bool {
        self.is_type_enabled("report.any") || self.is_type_enabled(&format!("{group}.report"))
    }
}
