// src/schema/mod.rs
// Discovered schema model. Built once by a SchemaProvider before the session
// starts and never mutated afterward; a table subset is a derived view over
// the shared model, not a filtered copy.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    pub is_identity: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    #[serde(rename = "type")]
    pub table_type: String,
    pub columns: Vec<ColumnInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub inferred: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaModel {
    pub tables: BTreeMap<String, TableInfo>,
    pub relationships: Vec<Relationship>,
}

impl SchemaModel {
    /// Every relationship endpoint must exist in the table map. Providers
    /// check this before handing the model to a session.
    pub fn validate(&self) -> bool {
        self.relationships.iter().all(|r| {
            self.tables.contains_key(&r.source_table) && self.tables.contains_key(&r.target_table)
        })
    }

    /// Drop relationships whose endpoints are unknown. Inference over noisy
    /// column naming can produce these.
    pub fn prune_dangling_relationships(&mut self) {
        let tables = &self.tables;
        self.relationships
            .retain(|r| tables.contains_key(&r.source_table) && tables.contains_key(&r.target_table));
    }
}

/// Non-owning subset view over a shared schema model. `selected: None` means
/// the full schema.
#[derive(Debug, Clone)]
pub struct SchemaView {
    model: Arc<SchemaModel>,
    selected: Option<BTreeSet<String>>,
}

impl SchemaView {
    pub fn full(model: Arc<SchemaModel>) -> Self {
        Self {
            model,
            selected: None,
        }
    }

    pub fn subset<I, S>(model: Arc<SchemaModel>, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let selected: BTreeSet<String> = tables.into_iter().map(Into::into).collect();
        Self {
            model,
            selected: Some(selected),
        }
    }

    pub fn model(&self) -> &SchemaModel {
        &self.model
    }

    fn includes(&self, table: &str) -> bool {
        match &self.selected {
            Some(set) => set.contains(table),
            None => true,
        }
    }

    pub fn tables(&self) -> impl Iterator<Item = (&String, &TableInfo)> {
        self.model
            .tables
            .iter()
            .filter(|(name, _)| self.includes(name))
    }

    /// Relationships with both endpoints inside the view.
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.model
            .relationships
            .iter()
            .filter(|r| self.includes(&r.source_table) && self.includes(&r.target_table))
    }

    pub fn table_count(&self) -> usize {
        self.tables().count()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships().count()
    }

    /// Materialize the visible subset for artifact export.
    pub fn to_model(&self) -> SchemaModel {
        SchemaModel {
            tables: self
                .tables()
                .map(|(name, info)| (name.clone(), info.clone()))
                .collect(),
            relationships: self.relationships().cloned().collect(),
        }
    }

    /// Render the visible schema as structured text for prompts.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, table) in self.tables() {
            out.push_str(&format!("TABLE {} ({})\n", name, table.table_type));
            for col in &table.columns {
                let nullable = if col.nullable { "NULL" } else { "NOT NULL" };
                out.push_str(&format!("  {} {} {}", col.name, col.data_type, nullable));
                if col.is_identity {
                    out.push_str(" IDENTITY");
                }
                out.push('\n');
            }
        }
        let rels: Vec<&Relationship> = self.relationships().collect();
        if !rels.is_empty() {
            out.push_str("RELATIONSHIPS:\n");
            for r in rels {
                let tag = if r.inferred { " (inferred)" } else { "" };
                out.push_str(&format!(
                    "  {}.{} -> {}{}\n",
                    r.source_table, r.source_column, r.target_table, tag
                ));
            }
        }
        out
    }
}
