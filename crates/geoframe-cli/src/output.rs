use console::style;
use geoframe_core::{FeatureCollection, Table, Tabular};
use serde::Serialize;
use std::fmt::Display;
use tabled::{builder::Builder, settings::Style, Tabled};

/// Output format mode
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Human,
    Json,
}

pub struct OutputWriter {
    format: OutputFormat,
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn eprint_json(value: &serde_json::Value) {
    eprintln!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self {
            format: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Human
            },
        }
    }

    pub fn success(&self, message: impl Display) {
        match self.format {
            OutputFormat::Human => {
                println!("{} {}", style("✓").green().bold(), message);
            }
            OutputFormat::Json => {
                print_json(&serde_json::json!({
                    "status": "success",
                    "message": message.to_string(),
                }));
            }
        }
    }

    pub fn warning(&self, message: impl Display) {
        match self.format {
            OutputFormat::Human => {
                eprintln!("{} {}", style("⚠").yellow().bold(), message);
            }
            OutputFormat::Json => {
                eprint_json(&serde_json::json!({
                    "status": "warning",
                    "message": message.to_string(),
                }));
            }
        }
    }

    pub fn table<T: Tabled + Serialize>(&self, data: Vec<T>) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Human => {
                if data.is_empty() {
                    println!("{}", style("(no data)").dim());
                } else {
                    let mut table = tabled::Table::new(data);
                    table.with(Style::rounded());
                    println!("{}", table);
                }
            }
            OutputFormat::Json => {
                print_json(&serde_json::json!({ "data": serde_json::to_value(&data)? }));
            }
        }
        Ok(())
    }

    /// Print the first `limit` rows of a plain table
    pub fn preview_table(&self, table: &Table, limit: usize) {
        self.preview(table, limit, None);
    }

    /// Print the first `limit` features with their geometry type
    pub fn preview_collection(&self, collection: &FeatureCollection, limit: usize) {
        let geometry = collection
            .features()
            .iter()
            .take(limit)
            .map(|f| match &f.geometry {
                Some(g) => format!("{:?}", g.geometry_type()),
                None => "null".to_string(),
            })
            .collect();
        self.preview(collection, limit, Some(geometry));
    }

    fn preview<T: Tabular>(&self, data: &T, limit: usize, geometry: Option<Vec<String>>) {
        let names = data.schema().names();
        let shown = data.len().min(limit);

        match self.format {
            OutputFormat::Human => {
                if shown == 0 {
                    println!("{}", style("(no rows)").dim());
                    return;
                }

                let mut builder = Builder::default();
                let mut header: Vec<String> = names.iter().map(|n| n.to_string()).collect();
                if geometry.is_some() {
                    header.push("geometry".to_string());
                }
                builder.push_record(header);

                for idx in 0..shown {
                    let mut record: Vec<String> = data.row(idx).iter().map(|v| v.to_string()).collect();
                    if let Some(kind) = geometry.as_ref().and_then(|g| g.get(idx)) {
                        record.push(kind.clone());
                    }
                    builder.push_record(record);
                }

                let mut table = builder.build();
                table.with(Style::rounded());
                println!("{}", table);
                if data.len() > shown {
                    println!("{}", style(format!("... {} more rows", data.len() - shown)).dim());
                }
            }
            OutputFormat::Json => {
                let rows: Vec<serde_json::Value> = (0..shown)
                    .map(|idx| {
                        let mut object: serde_json::Map<String, serde_json::Value> = names
                            .iter()
                            .zip(data.row(idx))
                            .map(|(name, value)| (name.to_string(), value.to_json()))
                            .collect();
                        if let Some(kind) = geometry.as_ref().and_then(|g| g.get(idx)) {
                            object.insert("geometry".to_string(), serde_json::Value::String(kind.clone()));
                        }
                        serde_json::Value::Object(object)
                    })
                    .collect();
                print_json(&serde_json::json!({ "rows": rows, "total": data.len() }));
            }
        }
    }

    pub fn data<T: Serialize>(&self, data: &T) -> anyhow::Result<()> {
        let json_str = serde_json::to_string_pretty(data)?;
        println!("{}", json_str);
        Ok(())
    }

    pub fn result<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Human => {
                self.data(&data)?;
            }
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "status": "success",
                    "data": data,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }
        Ok(())
    }

    pub fn kv(&self, key: impl Display, value: impl Display) {
        match self.format {
            OutputFormat::Human => {
                println!("{}: {}", style(key).bold(), value);
            }
            OutputFormat::Json => {
                print_json(&serde_json::json!({
                    key.to_string(): value.to_string(),
                }));
            }
        }
    }

    pub fn section(&self, title: impl Display) {
        match self.format {
            OutputFormat::Human => {
                println!("\n{}", style(title).bold().underlined());
            }
            OutputFormat::Json => {}
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }
}
