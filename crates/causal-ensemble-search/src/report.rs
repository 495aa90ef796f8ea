//! Plain-text rendering of stability records and ensemble statistics.

use causal_ensemble_core::{CoreResult, Edge, Graph, Node};

use crate::ensemble::EdgeProbabilities;
use crate::stability::Record;

/// Right-aligned text table.
#[derive(Debug, Clone, Default)]
struct TextTable {
    rows: Vec<Vec<String>>,
}

impl TextTable {
    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn render(&self) -> String {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let widths: Vec<usize> = (0..columns)
            .map(|c| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(c))
                    .map(|t| t.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        for row in &self.rows {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(token, width)| format!("{:>width$}", token, width = width))
                .collect();
            out.push_str(line.join("  ").trim_end());
            out.push('\n');
        }
        out
    }
}

fn decimal(v: f64) -> String {
    format!("{:.4}", v)
}

pub struct ReportFormatter;

impl ReportFormatter {
    /// Index, variable (`* ` marks a true ancestor), PI, average effect,
    /// PCER and ER per record, then the count of unmarked records as
    /// `# FP = n`.
    pub fn table(records: &[Record]) -> String {
        let mut table = TextTable::default();
        table.push(
            ["Index", "Variable", "PI", "Average Effect", "PCER", "ER"]
                .map(String::from)
                .to_vec(),
        );

        let mut starred = 0;
        for (i, record) in records.iter().enumerate() {
            if record.true_ancestor {
                starred += 1;
            }
            let marker = if record.true_ancestor { "* " } else { "" };
            table.push(vec![
                (i + 1).to_string(),
                format!("{}{}", marker, record.variable.name()),
                decimal(record.pi),
                decimal(record.effect),
                decimal(record.pcer),
                decimal(record.er),
            ]);
        }

        format!("\n{}\n# FP = {}\n", table.render(), records.len() - starred)
    }

    /// Graph with a directed edge from every recorded variable into `target`.
    pub fn selection_graph(target: &Node, records: &[Record]) -> CoreResult<Graph> {
        let mut graph = Graph::with_nodes(records.iter().map(|r| r.variable.clone()));
        graph.add_node(target.clone());
        for record in records.iter().filter(|r| &r.variable != target) {
            graph.add_edge(Edge::directed(record.variable.clone(), target.clone()))?;
        }
        Ok(graph)
    }

    /// One line per node pair: the pair, then each observed variant with its
    /// share, then the share of graphs without an edge.
    pub fn edge_probabilities(probabilities: &EdgeProbabilities) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Edge probabilities over {} graphs:\n",
            probabilities.num_graphs()
        ));
        for ((a, b), pair) in probabilities.iter() {
            let variants: Vec<String> = pair
                .variants
                .iter()
                .map(|(v, p)| format!("[{} {} {}]: {}", a, v, b, decimal(*p)))
                .collect();
            out.push_str(&format!(
                "{} -- {}  {}  [no edge]: {}\n",
                a,
                b,
                variants.join("  "),
                decimal(pair.no_edge)
            ));
        }
        out
    }
}
