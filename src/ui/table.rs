use crate::graph::GraphStats;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Element")]
    pub element: String,
    #[tabled(rename = "Label")]
    pub label: String,
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, element: &str, label: &str, count: usize) {
        self.rows.push(TableRow {
            element: element.to_string(),
            label: label.to_string(),
            count,
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

/// Element counts per vertex and edge label
pub fn graph_stats_table(stats: &GraphStats) -> String {
    let mut builder = TableBuilder::new();
    for (label, count) in &stats.vertices {
        builder.add_row("vertex", label, *count);
    }
    for (label, count) in &stats.edges {
        builder.add_row("edge", label, *count);
    }
    builder.build()
}
